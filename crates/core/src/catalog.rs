//! Read-only product catalog.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::types::{Price, ProductId};

/// A product offered by the store. Immutable once the catalog is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    /// Path or URL of the product image.
    pub image: String,
    pub description: String,
}

/// Errors building a catalog from external data.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("invalid catalog JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("duplicate product id {0}")]
    DuplicateId(ProductId),
    #[error("product {0} has a negative price")]
    NegativePrice(ProductId),
}

/// The ordered list of products shown on the catalog page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate ids and negative prices.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if any product id repeats or any price is
    /// below zero.
    pub fn new(products: Vec<Product>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(products.len());
        for product in &products {
            if !seen.insert(product.id) {
                return Err(CatalogError::DuplicateId(product.id));
            }
            if product.price.is_negative() {
                return Err(CatalogError::NegativePrice(product.id));
            }
        }
        Ok(Self { products })
    }

    /// Parse a catalog from a JSON array of products.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Parse`] for malformed JSON and the
    /// [`Catalog::new`] errors for invalid contents.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let products: Vec<Product> = serde_json::from_str(json)?;
        Self::new(products)
    }

    /// The store's built-in stock of school supplies.
    #[must_use]
    pub fn builtin() -> Self {
        let products = BUILTIN
            .iter()
            .map(|&(id, name, price, image, description)| Product {
                id: ProductId::new(id),
                name: name.to_owned(),
                price: Price::new(price),
                image: image.to_owned(),
                description: description.to_owned(),
            })
            .collect();
        Self { products }
    }

    /// Look up a product by id.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// All products in display order.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

const BUILTIN: &[(i32, &str, i64, &str, &str)] = &[
    (
        1,
        "Spiral Notebook (200 pages)",
        400,
        "images/spiral notebook.jpg",
        "High-quality 200-page spiral notebook for all your note-taking needs",
    ),
    (
        2,
        "Ballpoint Pen Pack (12)",
        600,
        "images/ballpoint pen.jpg",
        "Pack of 12 smooth-writing ballpoint pens in assorted colors",
    ),
    (
        3,
        "Mechanical Pencil (0.5mm)",
        250,
        "images/mechanical pencil.jpeg",
        "Precision 0.5mm mechanical pencil with comfortable grip",
    ),
    (
        4,
        "Geometry Set",
        900,
        "images/geometry set.jpg",
        "Complete geometry set with ruler, compass, protractor, and triangles",
    ),
    (
        5,
        "Scientific Calculator",
        4500,
        "images/scientific calculator.jpg",
        "Advanced scientific calculator with 300+ functions",
    ),
    (
        6,
        "Highlighter Pack (6)",
        550,
        "images/highlighter pack.jpg",
        "Set of 6 vibrant highlighters for effective studying",
    ),
    (
        7,
        "Durable Student Backpack",
        5800,
        "images/student backpack.jpg",
        "Spacious and durable backpack with laptop compartment",
    ),
    (
        8,
        "Sticky Notes Pack",
        300,
        "images/sticky notes.jpg",
        "Colorful sticky notes pack for reminders and annotations",
    ),
];
