//! Chunked document stream decoding.
//!
//! The gateway delivers query results as an ordered sequence of binary
//! chunks followed by one terminal status. The reader concatenates chunks
//! strictly in arrival order and decodes the whole buffer only after a
//! successful terminal status: UTF-8 first, then JSON. Fragmentation is a
//! transport artifact, so the decoded result must equal what a single
//! unfragmented payload would produce.

use futures::StreamExt;
use thiserror::Error;
use tracing::debug;

use super::models::Document;
use crate::transport::{DocumentStream, StreamEvent, StreamStatus, TransportError};

/// Buffer-to-text or text-to-JSON conversion failed.
///
/// Wraps the original conversion error message; partial buffer content is
/// never exposed.
#[derive(Debug, Error)]
#[error("failed to decode document stream: {0}")]
pub struct DecodeError(String);

impl DecodeError {
    fn new(source: impl std::fmt::Display) -> Self {
        Self(source.to_string())
    }

    /// The original conversion error message.
    pub fn message(&self) -> &str {
        &self.0
    }
}

/// Errors surfaced by document fetches.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request was rejected locally, before any call was made.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Accumulates chunks from one document query call and decodes the result.
///
/// Each call owns its own reader; the buffer is call-local and nothing is
/// retained once the call resolves or fails.
pub(crate) struct StreamingDocumentReader {
    buffer: Vec<u8>,
}

impl StreamingDocumentReader {
    pub(crate) fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Consumes the stream to completion and decodes the accumulated bytes.
    pub(crate) async fn read(
        mut self,
        mut stream: DocumentStream,
    ) -> Result<Vec<Document>, FetchError> {
        let status = loop {
            match stream.next().await {
                Some(StreamEvent::Chunk(chunk)) => self.push_chunk(&chunk),
                Some(StreamEvent::Completed(status)) => break status,
                // The transport contract promises exactly one terminal
                // status; a stream that just ends is a broken call.
                None => {
                    return Err(TransportError::Connection(
                        "stream ended without a terminal status".to_string(),
                    )
                    .into())
                }
            }
        };
        self.finish(status)
    }

    /// Appends a chunk in arrival order. Empty chunks are a no-op and are
    /// never treated as stream termination.
    fn push_chunk(&mut self, chunk: &[u8]) {
        if chunk.is_empty() {
            return;
        }
        self.buffer.extend_from_slice(chunk);
    }

    fn finish(self, status: StreamStatus) -> Result<Vec<Document>, FetchError> {
        if !status.is_ok() {
            // Partial buffer is discarded, never exposed.
            return Err(TransportError::from_status(status).into());
        }

        if self.buffer.is_empty() {
            // No payload at all; no decode attempt is made.
            return Ok(Vec::new());
        }

        let text = std::str::from_utf8(&self.buffer).map_err(DecodeError::new)?;
        let value: serde_json::Value = serde_json::from_str(text).map_err(DecodeError::new)?;

        match value {
            serde_json::Value::Array(documents) => Ok(documents),
            other => {
                // Lenient on shape: a successful decode that is not an
                // array counts as "no results", not an error.
                debug!(
                    "document query decoded to non-array JSON ({}), returning no documents",
                    json_kind(&other)
                );
                Ok(Vec::new())
            }
        }
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
