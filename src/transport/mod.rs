//! Transport boundary for the Pergola gateway.
//!
//! Every call this crate makes goes through the traits below, so tests can
//! substitute scripted transports and the generated stub layer stays out of
//! the picture. The gateway exposes unary request/response calls plus one
//! server-streaming call: document queries. A streaming call emits any
//! number of binary chunk events followed by exactly one terminal status.

pub mod http;

use async_trait::async_trait;
use futures::stream::Stream;
use std::pin::Pin;
use thiserror::Error;

use crate::peers::{PeerHealth, PeerInfo};
use crate::permissions::{Permission, PermissionGrant};
use crate::persistence::{
    DocumentDeleteRequest, DocumentInsertRequest, DocumentQueryRequest,
};

pub use http::HttpGatewayTransport;

/// Terminal status of a server-streaming call.
///
/// Code 0 is success; any other code is a failure with an optional
/// server-supplied detail message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamStatus {
    pub code: i32,
    pub detail: Option<String>,
}

impl StreamStatus {
    /// Successful termination.
    pub fn ok() -> Self {
        Self {
            code: 0,
            detail: None,
        }
    }

    /// Failed termination with a detail message.
    pub fn error(code: i32, detail: impl Into<String>) -> Self {
        Self {
            code,
            detail: Some(detail.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.code == 0
    }
}

/// One event on a server-streaming call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// A binary fragment of the response payload. Arrival order is
    /// significant; empty chunks are legal and carry no data.
    Chunk(Vec<u8>),
    /// The terminal status. Nothing meaningful follows this event.
    Completed(StreamStatus),
}

/// Ordered event stream for one document query call.
///
/// Dropping the stream aborts the underlying call.
pub type DocumentStream = Pin<Box<dyn Stream<Item = StreamEvent> + Send>>;

/// Errors raised at the transport boundary.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The call terminated with a non-zero status. `detail` is the
    /// server-supplied message, verbatim.
    #[error("call failed with status {code}: {detail}")]
    Status { code: i32, detail: String },

    /// The call could not be carried out at all (connect failure, broken
    /// stream, malformed unary response).
    #[error("connection error: {0}")]
    Connection(String),

    /// The call was cancelled locally before it completed.
    #[error("call aborted")]
    Aborted,
}

impl TransportError {
    /// Builds the error for a failed terminal status, keeping the server
    /// detail text verbatim.
    pub(crate) fn from_status(status: StreamStatus) -> Self {
        TransportError::Status {
            code: status.code,
            detail: status.detail.unwrap_or_default(),
        }
    }
}

/// Transport for the persistence service.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait PersistenceTransport: Send + Sync {
    /// Opens the server-streaming document query call.
    ///
    /// A successful return means the call is open; failures of the call
    /// itself are reported through the stream's terminal status.
    async fn open_document_stream(
        &self,
        request: DocumentQueryRequest,
    ) -> Result<DocumentStream, TransportError>;

    /// Inserts documents into a collection. Returns the number inserted.
    async fn insert_documents(
        &self,
        request: DocumentInsertRequest,
    ) -> Result<u64, TransportError>;

    /// Deletes documents matching a filter. Returns the number deleted.
    async fn delete_documents(
        &self,
        request: DocumentDeleteRequest,
    ) -> Result<u64, TransportError>;

    /// Lists the collections of a database.
    async fn list_collections(
        &self,
        connection_id: &str,
        database: &str,
    ) -> Result<Vec<String>, TransportError>;
}

/// Transport for the peer directory service.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait PeersTransport: Send + Sync {
    /// Returns all peers known to the platform.
    async fn list_peers(&self) -> Result<Vec<PeerInfo>, TransportError>;

    /// Returns a single peer, or Ok(None) if the peer is unknown.
    async fn get_peer(&self, peer_id: &str) -> Result<Option<PeerInfo>, TransportError>;

    /// Pings a peer and reports its reachability.
    async fn ping_peer(&self, peer_id: &str) -> Result<PeerHealth, TransportError>;
}

/// Transport for the permission-management service.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait AdminTransport: Send + Sync {
    /// Returns all grants held by a subject.
    async fn list_permission_grants(
        &self,
        subject: &str,
    ) -> Result<Vec<PermissionGrant>, TransportError>;

    /// Records a new grant.
    async fn grant_permission(&self, grant: PermissionGrant) -> Result<(), TransportError>;

    /// Removes a grant.
    async fn revoke_permission(
        &self,
        subject: &str,
        permission: Permission,
    ) -> Result<(), TransportError>;
}

/// Full transport surface required by [`crate::client::PlatformClient`].
pub trait PlatformTransport: PersistenceTransport + PeersTransport + AdminTransport {}

impl<T: PersistenceTransport + PeersTransport + AdminTransport> PlatformTransport for T {}
