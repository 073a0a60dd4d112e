//! Session-related types.
//!
//! The session is the visitor's storage slot: it carries the persisted cart,
//! the pending invoice number and a one-shot notification.

use serde::{Deserialize, Serialize};

/// Visual style of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Success,
    Info,
    Error,
}

impl NotificationKind {
    /// CSS class for the notification banner.
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Success => "message success-message",
            Self::Info => "message",
            Self::Error => "message error-message",
        }
    }
}

/// A transient message shown once on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            message: message.into(),
        }
    }
}

/// Session keys owned by the web layer.
///
/// Cart and invoice keys come from `campus_supply_core::storage::keys`.
pub mod keys {
    /// Key for the pending notification.
    pub const NOTIFICATION: &str = "notification";
}
