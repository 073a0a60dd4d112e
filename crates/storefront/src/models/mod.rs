//! Web-layer models.

pub mod session;

pub use session::{Notification, NotificationKind};
