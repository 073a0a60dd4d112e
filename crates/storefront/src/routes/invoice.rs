//! Invoice page.
//!
//! Rendering the invoice commits the checkout: the cart is emptied and the
//! pending invoice number consumed. Reloading the page afterwards shows the
//! "no pending invoice" state rather than a second, empty invoice.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use campus_supply_core::{Invoice, InvoiceError, InvoiceLine, invoice};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::routes::cart::TotalsView;
use crate::routes::layout::Chrome;
use crate::storage;

/// Invoice row display data.
#[derive(Clone)]
pub struct InvoiceLineView {
    pub name: String,
    pub quantity: u32,
    pub unit_price: String,
    pub line_total: String,
}

impl From<&InvoiceLine> for InvoiceLineView {
    fn from(line: &InvoiceLine) -> Self {
        Self {
            name: line.name.clone(),
            quantity: line.quantity,
            unit_price: line.unit_price.to_string(),
            line_total: line.line_total.to_string(),
        }
    }
}

/// Invoice display data.
#[derive(Clone)]
pub struct InvoiceView {
    pub number: String,
    pub date: String,
    pub lines: Vec<InvoiceLineView>,
    pub totals: TotalsView,
}

impl From<&Invoice> for InvoiceView {
    fn from(invoice: &Invoice) -> Self {
        Self {
            number: invoice.invoice_number.to_string(),
            date: invoice.iso_date(),
            lines: invoice.lines.iter().map(InvoiceLineView::from).collect(),
            totals: TotalsView::from(&invoice.totals),
        }
    }
}

/// Invoice page template.
#[derive(Template, WebTemplate)]
#[template(path = "invoice/show.html")]
pub struct InvoiceShowTemplate {
    pub chrome: Chrome,
    pub invoice: InvoiceView,
}

/// Shown when no checkout is waiting for its invoice.
#[derive(Template, WebTemplate)]
#[template(path = "invoice/missing.html")]
pub struct InvoiceMissingTemplate {
    pub chrome: Chrome,
}

/// Generate and display the invoice for the pending checkout.
#[instrument(skip(session))]
pub async fn show(session: Session) -> Result<Response> {
    let mut store = storage::load_cart(&session).await?;
    let today = chrono::Utc::now().date_naive();

    match invoice::generate_invoice(&mut store, today) {
        Ok(invoice) => {
            storage::save_cart(&session, &store).await?;
            Ok(InvoiceShowTemplate {
                chrome: Chrome::for_page(&session, store.item_count()).await,
                invoice: InvoiceView::from(&invoice),
            }
            .into_response())
        }
        Err(InvoiceError::NoPendingInvoice) => {
            tracing::debug!("Invoice page visited without a pending checkout");
            let template = InvoiceMissingTemplate {
                chrome: Chrome::for_page(&session, store.item_count()).await,
            };
            Ok((StatusCode::NOT_FOUND, template).into_response())
        }
        Err(InvoiceError::Storage(e)) => Err(AppError::Storage(e)),
    }
}
