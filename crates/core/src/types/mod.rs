//! Core value types.
//!
//! Type-safe wrappers for product ids, money amounts and email addresses.

pub mod email;
pub mod id;
pub mod price;

pub use email::{Email, EmailError};
pub use id::ProductId;
pub use price::{CurrencyCode, Price};
