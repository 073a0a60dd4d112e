//! Checkout and invoice generation.
//!
//! Checkout and the invoice page share nothing but storage: [`checkout`]
//! leaves a pending invoice number under [`keys::LAST_INVOICE`], and
//! [`generate_invoice`] later picks it up together with the still-persisted
//! cart, snapshots both, then empties the cart.

use core::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::cart::CartStore;
use crate::pricing::Totals;
use crate::storage::{Storage, StorageError, keys};
use crate::types::Price;

/// Invoice identifier, `INV-` followed by the checkout time in Unix millis.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvoiceNumber(String);

impl InvoiceNumber {
    const PREFIX: &'static str = "INV-";

    /// Number for a checkout happening at `at`.
    #[must_use]
    pub fn at(at: DateTime<Utc>) -> Self {
        Self(format!("{}{}", Self::PREFIX, at.timestamp_millis()))
    }

    /// Wrap a stored number. Blank values are rejected.
    #[must_use]
    pub fn from_stored(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        (!raw.is_empty()).then(|| Self(raw.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvoiceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Why checkout did not start.
#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error("Your cart is empty. Please add items before checking out.")]
    EmptyCart,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Why no invoice could be produced.
#[derive(Debug, thiserror::Error)]
pub enum InvoiceError {
    /// No checkout is waiting for its invoice.
    #[error("no pending invoice")]
    NoPendingInvoice,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// One row of an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvoiceLine {
    pub name: String,
    pub quantity: u32,
    pub unit_price: Price,
    pub line_total: Price,
}

/// Snapshot of a cart at the moment its invoice was generated. Not persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invoice {
    pub invoice_number: InvoiceNumber,
    pub date: NaiveDate,
    pub lines: Vec<InvoiceLine>,
    pub totals: Totals,
}

impl Invoice {
    /// ISO 8601 date (`YYYY-MM-DD`).
    #[must_use]
    pub fn iso_date(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

/// Start checkout: store a fresh invoice number for the invoice page.
///
/// Any previously pending number is overwritten.
///
/// # Errors
///
/// [`CheckoutError::EmptyCart`] when there is nothing to buy; nothing is
/// written in that case.
pub fn checkout<S: Storage>(
    store: &mut CartStore<S>,
    now: DateTime<Utc>,
) -> Result<InvoiceNumber, CheckoutError> {
    if store.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let number = InvoiceNumber::at(now);
    store
        .storage_mut()
        .set_item(keys::LAST_INVOICE, number.as_str().to_owned())?;

    tracing::info!(
        invoice_number = %number,
        lines = store.lines().len(),
        "Checkout started"
    );
    Ok(number)
}

/// The invoice number waiting for its invoice page, if any.
pub fn pending_invoice_number<S: Storage>(storage: &S) -> Option<InvoiceNumber> {
    storage
        .get_item(keys::LAST_INVOICE)
        .and_then(|raw| InvoiceNumber::from_stored(&raw))
}

/// Produce the invoice for the pending checkout, then empty the cart.
///
/// The invoice prices whatever the cart holds now, so a cart emptied after
/// [`checkout`] yields an invoice with no lines. The pending number is
/// consumed either way and a second call reports
/// [`InvoiceError::NoPendingInvoice`].
///
/// # Errors
///
/// [`InvoiceError::NoPendingInvoice`] without a prior [`checkout`]; storage
/// errors if the cleared cart cannot be written.
pub fn generate_invoice<S: Storage>(
    store: &mut CartStore<S>,
    today: NaiveDate,
) -> Result<Invoice, InvoiceError> {
    let invoice_number =
        pending_invoice_number(store.storage()).ok_or(InvoiceError::NoPendingInvoice)?;

    let lines = store
        .lines()
        .iter()
        .map(|line| InvoiceLine {
            name: line.name.clone(),
            quantity: line.quantity.get(),
            unit_price: line.price,
            line_total: line.line_total(),
        })
        .collect();

    let invoice = Invoice {
        invoice_number,
        date: today,
        lines,
        totals: store.totals(),
    };

    store.clear()?;
    store.storage_mut().remove_item(keys::LAST_INVOICE);

    tracing::info!(
        invoice_number = %invoice.invoice_number,
        total = invoice.totals.total.minor_units(),
        "Invoice generated, cart cleared"
    );
    Ok(invoice)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::catalog::Catalog;
    use crate::storage::MemoryStorage;
    use crate::types::ProductId;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 1, 10, 30, 0).unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, 1).unwrap()
    }

    #[test]
    fn test_invoice_number_format() {
        let number = InvoiceNumber::at(now());
        assert_eq!(number.as_str(), "INV-1756722600000");
    }

    #[test]
    fn test_checkout_empty_cart_is_blocked() {
        let mut store = CartStore::load(MemoryStorage::new());

        assert!(matches!(
            checkout(&mut store, now()),
            Err(CheckoutError::EmptyCart)
        ));
        assert!(store.is_empty());
        assert!(pending_invoice_number(store.storage()).is_none());
        assert_eq!(store.storage().changes().count(), 0);
    }

    #[test]
    fn test_checkout_overwrites_pending_number() {
        let catalog = Catalog::builtin();
        let mut storage = MemoryStorage::new();
        storage.preload(keys::LAST_INVOICE, "INV-1");
        let mut store = CartStore::load(storage);
        store.add_item(&catalog, ProductId::new(1)).unwrap();

        let number = checkout(&mut store, now()).unwrap();
        assert_eq!(pending_invoice_number(store.storage()), Some(number));
    }

    #[test]
    fn test_invoice_for_two_pen_packs_clears_cart() {
        let catalog = Catalog::builtin();
        let mut store = CartStore::load(MemoryStorage::new());
        store.add_item(&catalog, ProductId::new(2)).unwrap();
        store.set_quantity(ProductId::new(2), 2).unwrap();
        let number = checkout(&mut store, now()).unwrap();

        // The invoice page starts from storage alone
        let mut page = CartStore::load(store.into_storage());
        let invoice = generate_invoice(&mut page, today()).unwrap();

        assert_eq!(invoice.invoice_number, number);
        assert_eq!(invoice.iso_date(), "2025-09-01");
        assert_eq!(
            invoice.lines,
            vec![InvoiceLine {
                name: "Ballpoint Pen Pack (12)".to_owned(),
                quantity: 2,
                unit_price: Price::new(600),
                line_total: Price::new(1200),
            }]
        );
        assert_eq!(invoice.totals.subtotal, Price::new(1200));
        assert_eq!(invoice.totals.discount, Price::ZERO);
        assert_eq!(invoice.totals.tax, Price::new(180));
        assert_eq!(invoice.totals.total, Price::new(1380));

        assert!(page.is_empty());
        assert!(CartStore::load(page.storage().clone()).is_empty());
    }

    #[test]
    fn test_invoice_without_checkout_is_an_error() {
        let catalog = Catalog::builtin();
        let mut store = CartStore::load(MemoryStorage::new());
        store.add_item(&catalog, ProductId::new(5)).unwrap();

        assert!(matches!(
            generate_invoice(&mut store, today()),
            Err(InvoiceError::NoPendingInvoice)
        ));
        // Cart is kept when no invoice was produced
        assert_eq!(store.lines().len(), 1);
    }

    #[test]
    fn test_pending_number_is_consumed() {
        let catalog = Catalog::builtin();
        let mut store = CartStore::load(MemoryStorage::new());
        store.add_item(&catalog, ProductId::new(5)).unwrap();
        checkout(&mut store, now()).unwrap();

        generate_invoice(&mut store, today()).unwrap();
        assert!(matches!(
            generate_invoice(&mut store, today()),
            Err(InvoiceError::NoPendingInvoice)
        ));
    }

    #[test]
    fn test_cart_emptied_after_checkout_gives_empty_invoice() {
        let catalog = Catalog::builtin();
        let mut store = CartStore::load(MemoryStorage::new());
        store.add_item(&catalog, ProductId::new(4)).unwrap();
        let number = checkout(&mut store, now()).unwrap();
        store.clear().unwrap();

        let invoice = generate_invoice(&mut store, today()).unwrap();
        assert_eq!(invoice.invoice_number, number);
        assert!(invoice.lines.is_empty());
        assert_eq!(invoice.totals.total, Price::ZERO);
        assert!(pending_invoice_number(store.storage()).is_none());
    }

    #[test]
    fn test_blank_stored_number_is_not_pending() {
        let mut storage = MemoryStorage::new();
        storage.preload(keys::LAST_INVOICE, "  ");
        assert!(pending_invoice_number(&storage).is_none());
    }
}
