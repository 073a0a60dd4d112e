//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Catalog page
//! GET  /health                 - Health check
//!
//! # Cart
//! GET  /cart                   - Cart page
//! POST /cart/add               - Add one unit, redirect back
//! POST /cart/update            - Set quantity (< 1 removes), redirect to /cart
//! POST /cart/remove            - Remove line, redirect to /cart
//! GET  /cart/clear             - Clear confirmation page
//! POST /cart/clear             - Clear when confirmed
//! GET  /cart/count             - Cart count badge (fragment)
//!
//! # Checkout
//! POST /checkout               - Start checkout, redirect to /invoice
//! GET  /invoice                - Invoice page (empties the cart)
//!
//! # Contact
//! GET  /contact                - Contact form
//! POST /contact                - Validate and accept
//! ```

pub mod cart;
pub mod catalog;
pub mod contact;
pub mod invoice;
pub mod layout;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", get(cart::confirm_clear).post(cart::clear))
        .route("/count", get(cart::count))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Catalog
        .route("/", get(catalog::index))
        // Cart routes
        .nest("/cart", cart_routes())
        // Checkout and invoice
        .route("/checkout", post(cart::checkout))
        .route("/invoice", get(invoice::show))
        // Contact form
        .route("/contact", get(contact::show).post(contact::submit))
}
