//! Application state shared across handlers.

use std::sync::Arc;

use campus_supply_core::{Catalog, CatalogError};

use crate::config::StorefrontConfig;

/// Error building the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("failed to read catalog {path}: {source}")]
    ReadCatalog {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid catalog {path}: {source}")]
    Catalog {
        path: String,
        #[source]
        source: CatalogError,
    },
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. It holds only read-only data:
/// every visitor's cart lives in their session.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: Catalog,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: StorefrontConfig, catalog: Catalog) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, catalog }),
        }
    }

    /// Create state from configuration, loading the catalog override if set.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured catalog file cannot be read or
    /// contains an invalid catalog.
    pub fn from_config(config: StorefrontConfig) -> Result<Self, StateError> {
        let catalog = match &config.catalog_path {
            Some(path) => {
                let path_display = path.display().to_string();
                let json =
                    std::fs::read_to_string(path).map_err(|source| StateError::ReadCatalog {
                        path: path_display.clone(),
                        source,
                    })?;
                let catalog = Catalog::from_json(&json).map_err(|source| StateError::Catalog {
                    path: path_display.clone(),
                    source,
                })?;
                tracing::info!(path = %path_display, products = catalog.len(), "Catalog loaded");
                catalog
            }
            None => Catalog::builtin(),
        };

        Ok(Self::new(config, catalog))
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the product catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }
}
