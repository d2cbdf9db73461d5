//! Pergola Platform Client Library
//!
//! Typed client wrappers around the Pergola gateway: document persistence
//! (including the streaming query reader), peer directory calls,
//! permission management, and notification helpers. The generated stub
//! layer and all UI rendering stay with the caller; this crate only
//! depends on the transport contract in [`transport`].

pub mod client;
pub mod config;
pub mod notifications;
pub mod peers;
pub mod permissions;
pub mod persistence;
pub mod transport;

// Re-export commonly used types for convenience
pub use client::PlatformClient;
pub use config::ClientConfig;
pub use notifications::{Notification, NotificationLevel, NotificationSink, Notifier};
pub use persistence::{DecodeError, Document, FetchError, PersistenceClient};
pub use transport::{PlatformTransport, TransportError};
