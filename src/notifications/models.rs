//! Notification data models

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Severity of a notification, mapped by the caller onto its own
/// presentation (toast style, icon, etc.).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A notification ready to hand to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub level: NotificationLevel,
    pub title: String,
    pub body: Option<String>,
    /// Structured payload for the caller's own handling (ids, counts).
    pub data: serde_json::Value,
    /// Unix timestamp (seconds).
    pub created_at: i64,
}

impl Notification {
    /// Creates a notification with a fresh id and the current timestamp.
    pub fn new(level: NotificationLevel, title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            level,
            title: title.into(),
            body: None,
            data: serde_json::Value::Null,
            created_at: unix_now(),
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = data;
        self
    }
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
