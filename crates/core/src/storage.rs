//! Key/value persistence for the cart and the pending invoice number.
//!
//! Storage is string-valued and scoped to one visitor. The web layer backs it
//! with the visitor's session; tests use [`MemoryStorage`].

use std::collections::BTreeMap;

/// Storage keys shared by every page.
pub mod keys {
    /// JSON array of cart lines.
    pub const CART: &str = "cart";

    /// Plain-string invoice number awaiting its invoice page.
    pub const LAST_INVOICE: &str = "lastInvoice";
}

/// Errors writing to storage.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The value does not fit in the remaining quota.
    #[error("storage quota exceeded writing {key} ({size} bytes)")]
    QuotaExceeded { key: String, size: usize },
    /// The value could not be serialized.
    #[error("failed to encode {key}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A string key/value store.
///
/// Reads never fail: a missing or unreadable value is `None`.
pub trait Storage {
    /// Read the value stored under `key`.
    fn get_item(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend refuses the write.
    fn set_item(&mut self, key: &str, value: String) -> Result<(), StorageError>;

    /// Delete the value under `key`, if any.
    fn remove_item(&mut self, key: &str);
}

impl<S: Storage + ?Sized> Storage for &mut S {
    fn get_item(&self, key: &str) -> Option<String> {
        (**self).get_item(key)
    }

    fn set_item(&mut self, key: &str, value: String) -> Result<(), StorageError> {
        (**self).set_item(key, value)
    }

    fn remove_item(&mut self, key: &str) {
        (**self).remove_item(key);
    }
}

/// In-memory [`Storage`] with an optional byte quota.
///
/// Tracks which keys changed so a caller can write back only what moved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStorage {
    items: BTreeMap<String, String>,
    dirty: BTreeMap<String, bool>,
    quota: Option<usize>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage that refuses writes once the stored values exceed `bytes`.
    #[must_use]
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            quota: Some(bytes),
            ..Self::default()
        }
    }

    /// Seed a value without marking it changed.
    pub fn preload(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.items.insert(key.into(), value.into());
    }

    /// Keys written or removed since construction, with `true` for writes
    /// and `false` for removals.
    pub fn changes(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.dirty.iter().map(|(key, &written)| {
            let value = if written {
                self.items.get(key).map(String::as_str)
            } else {
                None
            };
            (key.as_str(), value)
        })
    }

    fn used_bytes_without(&self, key: &str) -> usize {
        self.items
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: String) -> Result<(), StorageError> {
        if let Some(quota) = self.quota {
            let size = key.len() + value.len();
            if self.used_bytes_without(key) + size > quota {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_owned(),
                    size,
                });
            }
        }
        self.items.insert(key.to_owned(), value);
        self.dirty.insert(key.to_owned(), true);
        Ok(())
    }

    fn remove_item(&mut self, key: &str) {
        self.items.remove(key);
        self.dirty.insert(key.to_owned(), false);
    }
}
