//! Cart route handlers.
//!
//! Mutations are plain form posts that redirect back to a page (post/redirect/
//! get). Each handler loads the cart from the session, applies one core
//! operation and writes the changed keys back before redirecting.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use campus_supply_core::{CartLine, CheckoutError, ProductId, Totals, invoice};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::models::Notification;
use crate::routes::layout::{Chrome, image_url};
use crate::state::AppState;
use crate::storage;

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartLineView {
    pub id: i32,
    pub name: String,
    pub image_url: String,
    pub price: String,
    pub quantity: u32,
    /// Quantity submitted by the "-" button; zero removes the line.
    pub decrement: i64,
    /// Quantity submitted by the "+" button.
    pub increment: i64,
    pub line_total: String,
}

impl From<&CartLine> for CartLineView {
    fn from(line: &CartLine) -> Self {
        let quantity = line.quantity.get();
        Self {
            id: line.id.as_i32(),
            name: line.name.clone(),
            image_url: image_url(&line.image),
            price: line.price.to_string(),
            quantity,
            decrement: i64::from(quantity) - 1,
            increment: i64::from(quantity) + 1,
            line_total: line.line_total().to_string(),
        }
    }
}

/// Formatted totals for templates.
#[derive(Clone)]
pub struct TotalsView {
    pub subtotal: String,
    pub discount: String,
    pub tax: String,
    pub total: String,
}

impl From<&Totals> for TotalsView {
    fn from(totals: &Totals) -> Self {
        Self {
            subtotal: totals.subtotal.to_string(),
            discount: format!("-{}", totals.discount),
            tax: totals.tax.to_string(),
            total: totals.total.to_string(),
        }
    }
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub totals: TotalsView,
}

impl CartView {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: i32,
    /// Page to return to; only local cart/catalog pages are honored.
    pub return_to: Option<String>,
}

/// Update quantity form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: i32,
    pub quantity: i64,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: i32,
}

/// Clear cart confirmation form data.
#[derive(Debug, Deserialize)]
pub struct ClearCartForm {
    #[serde(default)]
    pub confirm: Option<String>,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub chrome: Chrome,
    pub cart: CartView,
}

/// Clear-cart confirmation page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/confirm_clear.html")]
pub struct ConfirmClearTemplate {
    pub chrome: Chrome,
}

/// Cart count badge fragment template.
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u64,
}

/// Display cart page.
#[instrument(skip(session))]
pub async fn show(session: Session) -> Result<CartShowTemplate> {
    let store = storage::load_cart(&session).await?;
    let cart = CartView {
        lines: store.lines().iter().map(CartLineView::from).collect(),
        totals: TotalsView::from(&store.totals()),
    };

    Ok(CartShowTemplate {
        chrome: Chrome::for_page(&session, store.item_count()).await,
        cart,
    })
}

/// Add one unit of a product to the cart.
///
/// Unknown product ids are ignored without telling the visitor.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddToCartForm>,
) -> Result<Redirect> {
    let mut store = storage::load_cart(&session).await?;
    let product_id = ProductId::new(form.product_id);

    if let Some(product) = store.add_item(state.catalog(), product_id)? {
        storage::save_cart(&session, &store).await?;
        storage::notify(
            &session,
            Notification::success(format!("{} added to cart!", product.name)),
        )
        .await?;
        let id = product_id.to_string();
        add_breadcrumb("cart", "Added item", Some(&[("product_id", id.as_str())]));
        tracing::info!(%product_id, items = store.item_count(), "Item added to cart");
    }

    Ok(Redirect::to(return_path(form.return_to.as_deref())))
}

/// Set the quantity of a cart line. Quantities below one remove the line.
#[instrument(skip(session))]
pub async fn update(session: Session, Form(form): Form<UpdateCartForm>) -> Result<Redirect> {
    let mut store = storage::load_cart(&session).await?;
    store.set_quantity(ProductId::new(form.product_id), form.quantity)?;
    storage::save_cart(&session, &store).await?;

    Ok(Redirect::to("/cart"))
}

/// Remove a line from the cart.
#[instrument(skip(session))]
pub async fn remove(session: Session, Form(form): Form<RemoveFromCartForm>) -> Result<Redirect> {
    let mut store = storage::load_cart(&session).await?;
    if store.remove_item(ProductId::new(form.product_id))? {
        storage::save_cart(&session, &store).await?;
    }

    Ok(Redirect::to("/cart"))
}

/// Ask the visitor to confirm emptying the cart.
#[instrument(skip(session))]
pub async fn confirm_clear(session: Session) -> Result<Response> {
    let store = storage::load_cart(&session).await?;
    if store.is_empty() {
        return Ok(Redirect::to("/cart").into_response());
    }

    Ok(ConfirmClearTemplate {
        chrome: Chrome::for_page(&session, store.item_count()).await,
    }
    .into_response())
}

/// Empty the cart once the visitor confirmed.
#[instrument(skip(session))]
pub async fn clear(session: Session, Form(form): Form<ClearCartForm>) -> Result<Redirect> {
    if form.confirm.as_deref() != Some("yes") {
        storage::notify(&session, Notification::info("Your cart was not cleared.")).await?;
        return Ok(Redirect::to("/cart"));
    }

    let mut store = storage::load_cart(&session).await?;
    store.clear()?;
    storage::save_cart(&session, &store).await?;
    storage::notify(&session, Notification::success("Cart cleared!")).await?;
    add_breadcrumb("cart", "Cleared cart", None);

    Ok(Redirect::to("/cart"))
}

/// Get cart count badge fragment.
#[instrument(skip(session))]
pub async fn count(session: Session) -> Result<CartCountTemplate> {
    let store = storage::load_cart(&session).await?;
    Ok(CartCountTemplate {
        count: store.item_count(),
    })
}

/// Start checkout and hand off to the invoice page.
///
/// An empty cart is refused with a notification on the cart page.
#[instrument(skip(session))]
pub async fn checkout(session: Session) -> Result<Redirect> {
    let mut store = storage::load_cart(&session).await?;

    match invoice::checkout(&mut store, chrono::Utc::now()) {
        Ok(number) => {
            storage::save_cart(&session, &store).await?;
            add_breadcrumb(
                "checkout",
                "Checkout started",
                Some(&[("invoice_number", number.as_str())]),
            );
            Ok(Redirect::to("/invoice"))
        }
        Err(CheckoutError::EmptyCart) => {
            storage::notify(
                &session,
                Notification::error(CheckoutError::EmptyCart.to_string()),
            )
            .await?;
            Ok(Redirect::to("/cart"))
        }
        Err(CheckoutError::Storage(e)) => Err(AppError::Storage(e)),
    }
}

/// Where to send the visitor after adding an item.
fn return_path(requested: Option<&str>) -> &'static str {
    match requested {
        Some("/cart") => "/cart",
        _ => "/",
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU32;

    use campus_supply_core::Price;
    use campus_supply_core::pricing::price_subtotal;

    use super::*;

    #[test]
    fn test_return_path_only_allows_local_pages() {
        assert_eq!(return_path(None), "/");
        assert_eq!(return_path(Some("/cart")), "/cart");
        assert_eq!(return_path(Some("https://evil.example")), "/");
        assert_eq!(return_path(Some("//evil.example")), "/");
    }

    #[test]
    fn test_cart_line_view() {
        let line = CartLine {
            id: ProductId::new(7),
            name: "Durable Student Backpack".to_string(),
            price: Price::new(5800),
            quantity: NonZeroU32::MIN,
            image: "images/student backpack.jpg".to_string(),
        };
        let view = CartLineView::from(&line);

        assert_eq!(view.price, "JMD 5,800");
        assert_eq!(view.line_total, "JMD 5,800");
        assert_eq!(view.decrement, 0);
        assert_eq!(view.increment, 2);
        assert_eq!(view.image_url, "/static/images/student%20backpack.jpg");
    }

    #[test]
    fn test_totals_view_shows_discount_as_deduction() {
        let view = TotalsView::from(&price_subtotal(Price::new(5800)));
        assert_eq!(view.subtotal, "JMD 5,800");
        assert_eq!(view.discount, "-JMD 200");
        assert_eq!(view.tax, "JMD 840");
        assert_eq!(view.total, "JMD 6,440");

        let small = TotalsView::from(&price_subtotal(Price::new(250)));
        assert_eq!(small.discount, "-JMD 0");
    }
}
