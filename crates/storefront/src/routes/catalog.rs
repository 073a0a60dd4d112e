//! Catalog (home) page.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use campus_supply_core::Product;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::routes::layout::{Chrome, image_url};
use crate::state::AppState;
use crate::storage;

/// Product card display data.
#[derive(Clone)]
pub struct ProductView {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub price: String,
    pub image_url: String,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.as_i32(),
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price.to_string(),
            image_url: image_url(&product.image),
        }
    }
}

/// Catalog page template.
#[derive(Template, WebTemplate)]
#[template(path = "catalog.html")]
pub struct CatalogTemplate {
    pub chrome: Chrome,
    pub products: Vec<ProductView>,
}

/// Display every product with an add-to-cart button.
#[instrument(skip(state, session))]
pub async fn index(State(state): State<AppState>, session: Session) -> Result<CatalogTemplate> {
    let cart = storage::load_cart(&session).await?;

    Ok(CatalogTemplate {
        chrome: Chrome::for_page(&session, cart.item_count()).await,
        products: state
            .catalog()
            .products()
            .iter()
            .map(ProductView::from)
            .collect(),
    })
}
