//! Top-level client handle.

use std::sync::Arc;
use tracing::info;

use crate::config::ClientConfig;
use crate::peers::PeersClient;
use crate::permissions::PermissionsClient;
use crate::persistence::PersistenceClient;
use crate::transport::{HttpGatewayTransport, PlatformTransport};

/// Bundle of the platform's typed clients over one shared transport.
pub struct PlatformClient {
    persistence: PersistenceClient,
    peers: PeersClient,
    permissions: PermissionsClient,
}

impl PlatformClient {
    /// Builds a client over the HTTP gateway transport.
    pub fn connect(config: &ClientConfig) -> Self {
        info!(gateway_url = %config.gateway_url, "creating platform client");
        Self::with_transport(Arc::new(HttpGatewayTransport::from_config(config)))
    }

    /// Builds a client over any transport (scripted ones in tests).
    pub fn with_transport<T>(transport: Arc<T>) -> Self
    where
        T: PlatformTransport + 'static,
    {
        Self {
            persistence: PersistenceClient::new(transport.clone()),
            peers: PeersClient::new(transport.clone()),
            permissions: PermissionsClient::new(transport),
        }
    }

    pub fn persistence(&self) -> &PersistenceClient {
        &self.persistence
    }

    pub fn peers(&self) -> &PeersClient {
        &self.peers
    }

    pub fn permissions(&self) -> &PermissionsClient {
        &self.permissions
    }
}
