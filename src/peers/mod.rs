//! Client wrappers for the peer directory service.
//!
//! Everything here is a single request/response call; there is no caching
//! or retry at this layer.

mod models;

pub use models::{PeerHealth, PeerInfo, PeerStatus};

use std::sync::Arc;
use tracing::debug;

use crate::transport::{PeersTransport, TransportError};

/// Typed client for the peer directory.
pub struct PeersClient {
    transport: Arc<dyn PeersTransport>,
}

impl PeersClient {
    pub fn new(transport: Arc<dyn PeersTransport>) -> Self {
        Self { transport }
    }

    /// Returns all peers known to the platform.
    pub async fn list_peers(&self) -> Result<Vec<PeerInfo>, TransportError> {
        let peers = self.transport.list_peers().await?;
        debug!(count = peers.len(), "listed platform peers");
        Ok(peers)
    }

    /// Returns only the peers currently reported online.
    pub async fn online_peers(&self) -> Result<Vec<PeerInfo>, TransportError> {
        let peers = self.list_peers().await?;
        Ok(peers
            .into_iter()
            .filter(|p| p.status == PeerStatus::Online)
            .collect())
    }

    /// Returns a single peer, or Ok(None) if the peer is unknown.
    pub async fn get_peer(&self, peer_id: &str) -> Result<Option<PeerInfo>, TransportError> {
        self.transport.get_peer(peer_id).await
    }

    /// Pings a peer and reports its reachability.
    pub async fn ping_peer(&self, peer_id: &str) -> Result<PeerHealth, TransportError> {
        self.transport.ping_peer(peer_id).await
    }
}
