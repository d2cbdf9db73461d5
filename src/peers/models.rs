//! Data models for the peer directory.

use serde::{Deserialize, Serialize};

/// Reported availability of a peer node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeerStatus {
    Online,
    Offline,
    Draining,
    Unknown,
}

/// One peer node in the platform directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeerInfo {
    pub id: String,
    pub address: String,
    pub status: PeerStatus,
    pub version: Option<String>,
    /// Unix timestamp (seconds) of the last directory heartbeat.
    pub last_seen_at: Option<i64>,
}

/// Result of pinging a peer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeerHealth {
    pub peer_id: String,
    pub reachable: bool,
    pub round_trip_ms: Option<u64>,
}
