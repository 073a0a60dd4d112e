//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. Route handlers return `Result<T, AppError>`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use campus_supply_core::StorageError;
use thiserror::Error;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Writing the visitor's storage failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Reading or writing the session failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

impl AppError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::Storage(StorageError::QuotaExceeded { .. }) => StatusCode::INSUFFICIENT_STORAGE,
            Self::Storage(_) | Self::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let event_id = sentry::capture_error(&self);
        tracing::error!(
            error = %self,
            sentry_event_id = %event_id,
            "Request error"
        );

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Storage(StorageError::QuotaExceeded { .. }) => "Your cart is too large to save",
            Self::Storage(_) | Self::Session(_) => "Internal server error",
        };

        (status, message).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added item", Some(&[("product_id", "3")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quota_error() -> AppError {
        AppError::Storage(StorageError::QuotaExceeded {
            key: "cart".to_string(),
            size: 70_000,
        })
    }

    #[test]
    fn test_app_error_display() {
        assert_eq!(
            quota_error().to_string(),
            "Storage error: storage quota exceeded writing cart (70000 bytes)"
        );
    }

    #[test]
    fn test_quota_exceeded_is_insufficient_storage() {
        assert_eq!(
            quota_error().into_response().status(),
            StatusCode::INSUFFICIENT_STORAGE
        );
    }
}
