//! Session middleware configuration.
//!
//! Sessions live in a bounded in-memory `moka` cache. The session is the
//! visitor's storage slot, so restarting the server empties every cart.
//! Idle sessions expire after seven days and the least recently used are
//! evicted once the cache is full.

use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use tower_sessions::cookie::time::OffsetDateTime;
use tower_sessions::session::{Id, Record};
use tower_sessions::session_store;
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "campus_supply_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Session store backed by a size-bounded `moka` cache.
#[derive(Debug, Clone)]
pub struct MokaSessionStore {
    cache: Cache<Id, Record>,
}

impl MokaSessionStore {
    /// Create a store holding at most `capacity` sessions, each dropped after
    /// `idle` without being loaded or saved.
    #[must_use]
    pub fn new(capacity: u64, idle: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(capacity)
            .time_to_idle(idle)
            .build();
        Self { cache }
    }

    /// Approximate number of live sessions.
    #[must_use]
    pub fn session_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Apply pending evictions so counts are exact.
    pub async fn sync(&self) {
        self.cache.run_pending_tasks().await;
    }
}

#[async_trait]
impl SessionStore for MokaSessionStore {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        while self.cache.contains_key(&record.id) {
            record.id = Id::default();
        }
        self.cache.insert(record.id, record.clone()).await;
        Ok(())
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        self.cache.insert(record.id, record.clone()).await;
        Ok(())
    }

    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        match self.cache.get(session_id).await {
            Some(record) if record.expiry_date > OffsetDateTime::now_utc() => Ok(Some(record)),
            Some(_) => {
                self.cache.invalidate(session_id).await;
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        self.cache.invalidate(session_id).await;
        Ok(())
    }
}

/// Create the session layer backed by a bounded in-memory store.
///
/// # Arguments
///
/// * `config` - Storefront configuration (session capacity, secure cookie flag)
#[must_use]
pub fn create_session_layer(config: &StorefrontConfig) -> SessionManagerLayer<MokaSessionStore> {
    let idle = Duration::from_secs(SESSION_EXPIRY_SECONDS.unsigned_abs());
    let store = MokaSessionStore::new(config.session_capacity, idle);

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn record(expiry_date: OffsetDateTime) -> Record {
        Record {
            id: Id::default(),
            data: HashMap::new(),
            expiry_date,
        }
    }

    fn live() -> Record {
        record(OffsetDateTime::now_utc() + tower_sessions::cookie::time::Duration::hours(1))
    }

    #[tokio::test]
    async fn test_save_load_delete() {
        let store = MokaSessionStore::new(10, Duration::from_secs(60));
        let mut session = live();
        store.create(&mut session).await.unwrap();

        let loaded = store.load(&session.id).await.unwrap().unwrap();
        assert_eq!(loaded.id, session.id);

        store.delete(&session.id).await.unwrap();
        assert!(store.load(&session.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_expired_record_is_dropped() {
        let store = MokaSessionStore::new(10, Duration::from_secs(60));
        let mut stale =
            record(OffsetDateTime::now_utc() - tower_sessions::cookie::time::Duration::minutes(1));
        store.create(&mut stale).await.unwrap();

        assert!(store.load(&stale.id).await.unwrap().is_none());
        store.sync().await;
        assert_eq!(store.session_count(), 0);
    }

    #[tokio::test]
    async fn test_capacity_bounds_session_count() {
        let store = MokaSessionStore::new(3, Duration::from_secs(60));
        for _ in 0..50 {
            store.create(&mut live()).await.unwrap();
        }
        store.sync().await;
        assert!(store.session_count() <= 3);
    }

    #[tokio::test]
    async fn test_create_avoids_id_collision() {
        let store = MokaSessionStore::new(10, Duration::from_secs(60));
        let mut first = live();
        store.create(&mut first).await.unwrap();

        let mut second = live();
        second.id = first.id;
        store.create(&mut second).await.unwrap();

        assert_ne!(first.id, second.id);
        store.sync().await;
        assert_eq!(store.session_count(), 2);
    }
}
