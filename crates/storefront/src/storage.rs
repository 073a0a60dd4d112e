//! Bridge between the visitor's session and the core [`Storage`] trait.
//!
//! Core operations are synchronous, so each request copies the persisted keys
//! out of the session into a [`MemoryStorage`], runs the operation, then
//! writes back only the keys that changed. Concurrent requests from the same
//! visitor are last-write-wins.

use campus_supply_core::storage::keys;
use campus_supply_core::{CartStore, MemoryStorage};
use tower_sessions::Session;

use crate::error::Result;
use crate::models::session::keys as session_keys;
use crate::models::Notification;

/// Per-visitor storage limit, in bytes of keys plus values.
pub const STORAGE_QUOTA_BYTES: usize = 64 * 1024;

/// Keys mirrored between the session and core storage.
const PERSISTED_KEYS: [&str; 2] = [keys::CART, keys::LAST_INVOICE];

/// Copy the visitor's persisted keys into a fresh [`MemoryStorage`].
///
/// A value that is not a string is treated as absent, like any other
/// unreadable stored data.
///
/// # Errors
///
/// Returns an error if the session store cannot be loaded.
pub async fn load_storage(session: &Session) -> Result<MemoryStorage> {
    let mut storage = MemoryStorage::with_quota(STORAGE_QUOTA_BYTES);
    for key in PERSISTED_KEYS {
        match session.get::<String>(key).await {
            Ok(Some(value)) => storage.preload(key, value),
            Ok(None) => {}
            Err(tower_sessions::session::Error::SerdeJson(e)) => {
                tracing::warn!(key, error = %e, "Ignoring unreadable stored value");
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(storage)
}

/// Load the visitor's cart.
///
/// # Errors
///
/// Returns an error if the session store cannot be read.
pub async fn load_cart(session: &Session) -> Result<CartStore<MemoryStorage>> {
    Ok(CartStore::load(load_storage(session).await?))
}

/// Write back every key the request changed.
///
/// # Errors
///
/// Returns an error if the session store rejects a write.
pub async fn save_storage(session: &Session, storage: &MemoryStorage) -> Result<()> {
    for (key, value) in storage.changes() {
        match value {
            Some(value) => session.insert(key, value).await?,
            None => {
                session.remove::<String>(key).await?;
            }
        }
    }
    Ok(())
}

/// Persist the cart store's storage back to the session.
///
/// # Errors
///
/// Returns an error if the session store rejects a write.
pub async fn save_cart(session: &Session, store: &CartStore<MemoryStorage>) -> Result<()> {
    save_storage(session, store.storage()).await
}

/// Queue a notification for the next rendered page, replacing any pending one.
///
/// # Errors
///
/// Returns an error if the session store rejects the write.
pub async fn notify(session: &Session, notification: Notification) -> Result<()> {
    session
        .insert(session_keys::NOTIFICATION, notification)
        .await?;
    Ok(())
}

/// Take the pending notification, if any. A broken entry is dropped.
pub async fn take_notification(session: &Session) -> Option<Notification> {
    match session
        .remove::<Notification>(session_keys::NOTIFICATION)
        .await
    {
        Ok(notification) => notification,
        Err(e) => {
            tracing::warn!(error = %e, "Dropping unreadable notification");
            None
        }
    }
}
