//! Scripted in-memory transport for integration tests.
//!
//! Each document query call replays the next scripted event sequence, so
//! tests control chunk boundaries and terminal statuses exactly.

use async_trait::async_trait;
use futures::stream;
use std::collections::VecDeque;
use std::sync::Mutex;

use pergola_client::peers::{PeerHealth, PeerInfo, PeerStatus};
use pergola_client::permissions::{Permission, PermissionGrant};
use pergola_client::persistence::{
    DocumentDeleteRequest, DocumentInsertRequest, DocumentQueryRequest,
};
use pergola_client::transport::{
    AdminTransport, DocumentStream, PeersTransport, PersistenceTransport, StreamEvent,
    TransportError,
};

#[derive(Default)]
pub struct ScriptedTransport {
    /// Event scripts, one per expected document query call, in order.
    streams: Mutex<VecDeque<Vec<StreamEvent>>>,
    /// Every document query request the transport has seen.
    pub seen_queries: Mutex<Vec<DocumentQueryRequest>>,
    pub peers: Vec<PeerInfo>,
    pub grants: Mutex<Vec<PermissionGrant>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the event script for the next document query call.
    pub fn push_stream(&self, events: Vec<StreamEvent>) {
        self.streams.lock().unwrap().push_back(events);
    }

    pub fn with_peers(mut self, peers: Vec<PeerInfo>) -> Self {
        self.peers = peers;
        self
    }

    pub fn last_query(&self) -> DocumentQueryRequest {
        self.seen_queries
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no document query was made")
    }
}

#[allow(dead_code)]
pub fn online_peer(id: &str) -> PeerInfo {
    PeerInfo {
        id: id.to_string(),
        address: format!("{id}.internal:7411"),
        status: PeerStatus::Online,
        version: Some("1.0.0".to_string()),
        last_seen_at: Some(1700000000),
    }
}

#[async_trait]
impl PersistenceTransport for ScriptedTransport {
    async fn open_document_stream(
        &self,
        request: DocumentQueryRequest,
    ) -> Result<DocumentStream, TransportError> {
        self.seen_queries.lock().unwrap().push(request);
        let events = self
            .streams
            .lock()
            .unwrap()
            .pop_front()
            .expect("no scripted stream left");
        Ok(Box::pin(stream::iter(events)))
    }

    async fn insert_documents(
        &self,
        request: DocumentInsertRequest,
    ) -> Result<u64, TransportError> {
        Ok(request.documents.len() as u64)
    }

    async fn delete_documents(
        &self,
        _request: DocumentDeleteRequest,
    ) -> Result<u64, TransportError> {
        Ok(0)
    }

    async fn list_collections(
        &self,
        _connection_id: &str,
        _database: &str,
    ) -> Result<Vec<String>, TransportError> {
        Ok(vec!["orders".to_string(), "events".to_string()])
    }
}

#[async_trait]
impl PeersTransport for ScriptedTransport {
    async fn list_peers(&self) -> Result<Vec<PeerInfo>, TransportError> {
        Ok(self.peers.clone())
    }

    async fn get_peer(&self, peer_id: &str) -> Result<Option<PeerInfo>, TransportError> {
        Ok(self.peers.iter().find(|p| p.id == peer_id).cloned())
    }

    async fn ping_peer(&self, peer_id: &str) -> Result<PeerHealth, TransportError> {
        Ok(PeerHealth {
            peer_id: peer_id.to_string(),
            reachable: self.peers.iter().any(|p| p.id == peer_id),
            round_trip_ms: Some(5),
        })
    }
}

#[async_trait]
impl AdminTransport for ScriptedTransport {
    async fn list_permission_grants(
        &self,
        subject: &str,
    ) -> Result<Vec<PermissionGrant>, TransportError> {
        Ok(self
            .grants
            .lock()
            .unwrap()
            .iter()
            .filter(|g| g.subject == subject)
            .cloned()
            .collect())
    }

    async fn grant_permission(&self, grant: PermissionGrant) -> Result<(), TransportError> {
        self.grants.lock().unwrap().push(grant);
        Ok(())
    }

    async fn revoke_permission(
        &self,
        subject: &str,
        permission: Permission,
    ) -> Result<(), TransportError> {
        self.grants
            .lock()
            .unwrap()
            .retain(|g| !(g.subject == subject && g.permission == permission));
        Ok(())
    }
}
