//! Campus Supply Core - storefront domain logic.
//!
//! Everything that decides what the store does lives here; the web crate only
//! renders it:
//! - [`catalog`] - The read-only product list
//! - [`cart`] - The cart and the store that persists it
//! - [`pricing`] - Subtotal, discount, tax and total
//! - [`invoice`] - Checkout and invoice generation
//! - [`validation`] - Required-field and email checks for forms
//! - [`storage`] - The key/value storage the cart persists to
//! - [`types`] - Newtype wrappers for ids, prices and emails
//!
//! # Architecture
//!
//! The core crate performs no I/O of its own. Persistence goes through the
//! [`storage::Storage`] trait, so every operation can be exercised against
//! [`storage::MemoryStorage`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod invoice;
pub mod pricing;
pub mod storage;
pub mod types;
pub mod validation;

pub use cart::{Cart, CartLine, CartStore};
pub use catalog::{Catalog, CatalogError, Product};
pub use invoice::{CheckoutError, Invoice, InvoiceError, InvoiceLine, InvoiceNumber};
pub use pricing::Totals;
pub use storage::{MemoryStorage, Storage, StorageError};
pub use types::*;
