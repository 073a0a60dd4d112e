//! Data every full page renders: navigation badge and pending notification.

use tower_sessions::Session;

use crate::models::Notification;
use crate::storage;

/// Shared page chrome passed to `base.html`.
#[derive(Debug, Clone)]
pub struct Chrome {
    /// Units in the cart; the badge is hidden at zero.
    pub cart_count: u64,
    /// One-shot notification, consumed by this render.
    pub notification: Option<Notification>,
    /// Stylesheet hash for cache busting.
    pub css_hash: &'static str,
}

impl Chrome {
    /// Build chrome for a page, consuming any pending notification.
    pub async fn for_page(session: &Session, cart_count: u64) -> Self {
        Self {
            cart_count,
            notification: storage::take_notification(session).await,
            css_hash: env!("CSS_HASH"),
        }
    }

    /// Whether the navigation badge is shown.
    #[must_use]
    pub const fn show_badge(&self) -> bool {
        self.cart_count > 0
    }
}

/// URL for a catalog image path such as `images/geometry set.jpg`.
#[must_use]
pub fn image_url(image: &str) -> String {
    if image.starts_with("http://") || image.starts_with("https://") {
        return image.to_string();
    }
    let path = image
        .trim_start_matches('/')
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/");
    format!("/static/{path}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_url() {
        assert_eq!(
            image_url("images/spiral notebook.jpg"),
            "/static/images/spiral%20notebook.jpg"
        );
        assert_eq!(
            image_url("https://cdn.example.com/a.jpg"),
            "https://cdn.example.com/a.jpg"
        );
    }
}
