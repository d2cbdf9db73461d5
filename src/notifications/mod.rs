//! Notification helpers.
//!
//! This crate never renders anything. Callers plug in a
//! [`NotificationSink`] and the [`Notifier`] turns client events and
//! errors into [`Notification`] values for it.

mod models;

pub use models::{Notification, NotificationLevel};

use std::sync::Arc;
use tracing::debug;

use crate::persistence::FetchError;
use crate::transport::TransportError;

/// Receives notifications for presentation. Implemented by the caller.
pub trait NotificationSink: Send + Sync {
    fn publish(&self, notification: Notification);
}

/// Builds notifications from client events and hands them to a sink.
pub struct Notifier {
    sink: Arc<dyn NotificationSink>,
}

impl Notifier {
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        Self { sink }
    }

    pub fn info(&self, title: impl Into<String>) -> Notification {
        self.publish(Notification::new(NotificationLevel::Info, title))
    }

    pub fn success(&self, title: impl Into<String>) -> Notification {
        self.publish(Notification::new(NotificationLevel::Success, title))
    }

    pub fn warning(&self, title: impl Into<String>) -> Notification {
        self.publish(Notification::new(NotificationLevel::Warning, title))
    }

    pub fn error(&self, title: impl Into<String>) -> Notification {
        self.publish(Notification::new(NotificationLevel::Error, title))
    }

    /// Surfaces a failed document fetch.
    ///
    /// Local cancellation is reported as a warning rather than an error;
    /// the user asked for it.
    pub fn fetch_failed(&self, collection: &str, error: &FetchError) -> Notification {
        let level = match error {
            FetchError::Transport(TransportError::Aborted) => NotificationLevel::Warning,
            _ => NotificationLevel::Error,
        };
        let notification = Notification::new(level, "Document fetch failed")
            .with_body(error.to_string())
            .with_data(serde_json::json!({
                "collection": collection,
                "kind": error_kind(error),
            }));
        self.publish(notification)
    }

    fn publish(&self, notification: Notification) -> Notification {
        debug!(
            level = ?notification.level,
            title = %notification.title,
            "publishing notification"
        );
        self.sink.publish(notification.clone());
        notification
    }
}

fn error_kind(error: &FetchError) -> &'static str {
    match error {
        FetchError::InvalidRequest(_) => "invalid_request",
        FetchError::Transport(TransportError::Aborted) => "aborted",
        FetchError::Transport(_) => "transport",
        FetchError::Decode(_) => "decode",
    }
}
