//! HTTP implementation of the gateway transport.
//!
//! Talks to the platform's HTTP gateway. Unary calls are plain JSON
//! request/response; the document query call streams the chunked response
//! body as [`StreamEvent`]s, with end-of-body mapped to a success status
//! and a broken read mapped to a failure status.

use futures::StreamExt;
use serde::Deserialize;
use std::time::Duration;

use async_trait::async_trait;

use super::{
    AdminTransport, DocumentStream, PeersTransport, PersistenceTransport, StreamEvent,
    StreamStatus, TransportError,
};
use crate::config::ClientConfig;
use crate::peers::{PeerHealth, PeerInfo};
use crate::permissions::{Permission, PermissionGrant};
use crate::persistence::{
    DocumentDeleteRequest, DocumentInsertRequest, DocumentQueryRequest,
};

/// Status code reported when the response body breaks mid-stream.
const STREAM_READ_FAILURE: i32 = -1;

/// HTTP client for the platform gateway.
pub struct HttpGatewayTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpGatewayTransport {
    /// Create a new gateway transport.
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the gateway (e.g., "https://gateway.example.com")
    /// * `request_timeout_sec` - Per-request timeout in seconds
    /// * `connect_timeout_sec` - Connection timeout in seconds
    pub fn new(base_url: String, request_timeout_sec: u64, connect_timeout_sec: u64) -> Self {
        let user_agent = format!(
            "pergola-client/{} ({})",
            env!("CARGO_PKG_VERSION"),
            env!("GIT_HASH")
        );
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(request_timeout_sec))
            .connect_timeout(Duration::from_secs(connect_timeout_sec))
            .user_agent(user_agent)
            .build()
            .expect("Failed to create HTTP client");

        // Ensure base_url doesn't have trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();

        Self { client, base_url }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(
            config.gateway_url.clone(),
            config.request_timeout_sec,
            config.connect_timeout_sec,
        )
    }

    /// Get the base URL of the gateway.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Converts a non-2xx response into a status error carrying the body
    /// text as detail.
    async fn require_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, TransportError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let detail = response.text().await.unwrap_or_default();
        Err(TransportError::Status {
            code: status.as_u16() as i32,
            detail,
        })
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: String,
    ) -> Result<T, TransportError> {
        let response = self.client.get(&url).send().await.map_err(connection)?;
        let response = Self::require_success(response).await?;
        response.json().await.map_err(connection)
    }
}

fn connection(err: reqwest::Error) -> TransportError {
    TransportError::Connection(err.to_string())
}

/// Maps a chunked response body onto the stream event contract: bytes
/// become chunk events, a clean end of body becomes a success status and
/// a broken read becomes a failure status.
fn body_events<B, E>(
    body: impl futures::Stream<Item = Result<B, E>> + Send + 'static,
) -> DocumentStream
where
    B: AsRef<[u8]>,
    E: std::fmt::Display,
{
    let events = body
        .map(|item| match item {
            Ok(bytes) => StreamEvent::Chunk(bytes.as_ref().to_vec()),
            Err(err) => StreamEvent::Completed(StreamStatus::error(
                STREAM_READ_FAILURE,
                err.to_string(),
            )),
        })
        // The reader stops at the first Completed event, so this trailing
        // success status is ignored after a read failure.
        .chain(futures::stream::once(async {
            StreamEvent::Completed(StreamStatus::ok())
        }));
    Box::pin(events)
}

#[derive(Deserialize)]
struct InsertResponse {
    inserted: u64,
}

#[derive(Deserialize)]
struct DeleteResponse {
    deleted: u64,
}

#[derive(Deserialize)]
struct CollectionsResponse {
    collections: Vec<String>,
}

#[derive(Deserialize)]
struct PeersResponse {
    peers: Vec<PeerInfo>,
}

#[derive(Deserialize)]
struct GrantsResponse {
    grants: Vec<PermissionGrant>,
}

#[async_trait]
impl PersistenceTransport for HttpGatewayTransport {
    async fn open_document_stream(
        &self,
        request: DocumentQueryRequest,
    ) -> Result<DocumentStream, TransportError> {
        let url = format!(
            "{}/v1/persistence/{}/{}/{}/documents/query",
            self.base_url, request.connection_id, request.database, request.collection
        );
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({
                "query": request.query,
                "options": request.options,
            }))
            .send()
            .await
            .map_err(connection)?;
        let response = Self::require_success(response).await?;

        Ok(body_events(response.bytes_stream()))
    }

    async fn insert_documents(
        &self,
        request: DocumentInsertRequest,
    ) -> Result<u64, TransportError> {
        let url = format!(
            "{}/v1/persistence/{}/{}/{}/documents",
            self.base_url, request.connection_id, request.database, request.collection
        );
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "documents": request.documents }))
            .send()
            .await
            .map_err(connection)?;
        let response = Self::require_success(response).await?;
        let body: InsertResponse = response.json().await.map_err(connection)?;
        Ok(body.inserted)
    }

    async fn delete_documents(
        &self,
        request: DocumentDeleteRequest,
    ) -> Result<u64, TransportError> {
        let url = format!(
            "{}/v1/persistence/{}/{}/{}/documents/delete",
            self.base_url, request.connection_id, request.database, request.collection
        );
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "query": request.query }))
            .send()
            .await
            .map_err(connection)?;
        let response = Self::require_success(response).await?;
        let body: DeleteResponse = response.json().await.map_err(connection)?;
        Ok(body.deleted)
    }

    async fn list_collections(
        &self,
        connection_id: &str,
        database: &str,
    ) -> Result<Vec<String>, TransportError> {
        let url = format!(
            "{}/v1/persistence/{}/{}/collections",
            self.base_url, connection_id, database
        );
        let body: CollectionsResponse = self.get_json(url).await?;
        Ok(body.collections)
    }
}

#[async_trait]
impl PeersTransport for HttpGatewayTransport {
    async fn list_peers(&self) -> Result<Vec<PeerInfo>, TransportError> {
        let url = format!("{}/v1/peers", self.base_url);
        let body: PeersResponse = self.get_json(url).await?;
        Ok(body.peers)
    }

    async fn get_peer(&self, peer_id: &str) -> Result<Option<PeerInfo>, TransportError> {
        let url = format!("{}/v1/peers/{}", self.base_url, peer_id);
        let response = self.client.get(&url).send().await.map_err(connection)?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = Self::require_success(response).await?;
        let peer: PeerInfo = response.json().await.map_err(connection)?;
        Ok(Some(peer))
    }

    async fn ping_peer(&self, peer_id: &str) -> Result<PeerHealth, TransportError> {
        let url = format!("{}/v1/peers/{}/ping", self.base_url, peer_id);
        let response = self.client.post(&url).send().await.map_err(connection)?;
        let response = Self::require_success(response).await?;
        response.json().await.map_err(connection)
    }
}

#[async_trait]
impl AdminTransport for HttpGatewayTransport {
    async fn list_permission_grants(
        &self,
        subject: &str,
    ) -> Result<Vec<PermissionGrant>, TransportError> {
        let url = format!("{}/v1/permissions/{}", self.base_url, subject);
        let body: GrantsResponse = self.get_json(url).await?;
        Ok(body.grants)
    }

    async fn grant_permission(&self, grant: PermissionGrant) -> Result<(), TransportError> {
        let url = format!("{}/v1/permissions", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&grant)
            .send()
            .await
            .map_err(connection)?;
        Self::require_success(response).await?;
        Ok(())
    }

    async fn revoke_permission(
        &self,
        subject: &str,
        permission: Permission,
    ) -> Result<(), TransportError> {
        let url = format!(
            "{}/v1/permissions/{}/{}",
            self.base_url,
            subject,
            permission.as_int()
        );
        let response = self.client.delete(&url).send().await.map_err(connection)?;
        Self::require_success(response).await?;
        Ok(())
    }
}
