//! Request models for the persistence service.

use serde::{Deserialize, Serialize};

/// Match-all filter expression, used when the caller supplies no query.
pub const MATCH_ALL_QUERY: &str = "{}";

/// One schema-less record returned by the backing store.
///
/// The store has no schema from this layer's perspective, so documents are
/// opaque JSON values rather than a fixed shape.
pub type Document = serde_json::Value;

/// Parameters for the server-streaming document query call.
///
/// Identifier validity is not checked locally; the remote service owns
/// that decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentQueryRequest {
    pub connection_id: String,
    pub database: String,
    pub collection: String,
    /// Filter expression; [`MATCH_ALL_QUERY`] when the caller gave none.
    pub query: String,
    /// Optional projection/sort modifiers. None means no modifiers.
    pub options: Option<String>,
}

/// Parameters for a unary document insert call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentInsertRequest {
    pub connection_id: String,
    pub database: String,
    pub collection: String,
    pub documents: Vec<Document>,
}

/// Parameters for a unary document delete call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentDeleteRequest {
    pub connection_id: String,
    pub database: String,
    pub collection: String,
    pub query: String,
}
