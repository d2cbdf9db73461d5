//! Client wrappers for the persistence service.
//!
//! Document queries are served over a streaming call (see
//! [`stream_reader`]); everything else is a plain request/response call
//! delegated to the transport.

mod models;
mod stream_reader;

pub use models::{
    Document, DocumentDeleteRequest, DocumentInsertRequest, DocumentQueryRequest,
    MATCH_ALL_QUERY,
};
pub use stream_reader::{DecodeError, FetchError};

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::transport::{PersistenceTransport, TransportError};
use stream_reader::StreamingDocumentReader;

/// Typed client for the persistence service.
///
/// Holds no per-call state; concurrent calls do not share or contend over
/// anything beyond the transport itself.
pub struct PersistenceClient {
    transport: Arc<dyn PersistenceTransport>,
}

impl PersistenceClient {
    pub fn new(transport: Arc<dyn PersistenceTransport>) -> Self {
        Self { transport }
    }

    /// Fetches the documents matching `query` from a collection.
    ///
    /// `query` defaults to the match-all expression when absent; absent
    /// `options` means no projection/sort modifiers. Empty identifiers are
    /// rejected locally; anything else is validated by the remote service.
    ///
    /// The result is exactly what the server sent: chunk fragmentation on
    /// the wire never changes the decoded documents. A successful response
    /// that is not a JSON array is normalized to an empty result.
    pub async fn fetch_documents(
        &self,
        connection_id: &str,
        database: &str,
        collection: &str,
        query: Option<&str>,
        options: Option<&str>,
    ) -> Result<Vec<Document>, FetchError> {
        if connection_id.is_empty() || database.is_empty() || collection.is_empty() {
            return Err(FetchError::InvalidRequest(
                "connection id, database and collection must be non-empty".to_string(),
            ));
        }

        let request = DocumentQueryRequest {
            connection_id: connection_id.to_string(),
            database: database.to_string(),
            collection: collection.to_string(),
            query: query.unwrap_or(MATCH_ALL_QUERY).to_string(),
            options: options.map(str::to_string),
        };

        debug!(
            connection_id,
            database, collection, "opening document query stream"
        );

        let stream = self.transport.open_document_stream(request).await?;
        StreamingDocumentReader::new().read(stream).await
    }

    /// Like [`fetch_documents`](Self::fetch_documents), but abortable.
    ///
    /// Cancelling the token drops the in-flight call: the chunk buffer is
    /// discarded, no partial decode happens, and the caller gets
    /// [`TransportError::Aborted`].
    pub async fn fetch_documents_with_cancel(
        &self,
        connection_id: &str,
        database: &str,
        collection: &str,
        query: Option<&str>,
        options: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<Vec<Document>, FetchError> {
        tokio::select! {
            _ = cancel.cancelled() => Err(TransportError::Aborted.into()),
            result = self.fetch_documents(connection_id, database, collection, query, options) => result,
        }
    }

    /// Inserts documents into a collection. Returns the number inserted.
    pub async fn insert_documents(
        &self,
        connection_id: &str,
        database: &str,
        collection: &str,
        documents: Vec<Document>,
    ) -> Result<u64, TransportError> {
        let request = DocumentInsertRequest {
            connection_id: connection_id.to_string(),
            database: database.to_string(),
            collection: collection.to_string(),
            documents,
        };
        self.transport.insert_documents(request).await
    }

    /// Deletes documents matching `query`. Returns the number deleted.
    pub async fn delete_documents(
        &self,
        connection_id: &str,
        database: &str,
        collection: &str,
        query: &str,
    ) -> Result<u64, TransportError> {
        let request = DocumentDeleteRequest {
            connection_id: connection_id.to_string(),
            database: database.to_string(),
            collection: collection.to_string(),
            query: query.to_string(),
        };
        self.transport.delete_documents(request).await
    }

    /// Lists the collections of a database.
    pub async fn list_collections(
        &self,
        connection_id: &str,
        database: &str,
    ) -> Result<Vec<String>, TransportError> {
        self.transport.list_collections(connection_id, database).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use futures::stream;
    use futures::StreamExt;
    use serde_json::json;
    use std::sync::Mutex;

    use crate::transport::{DocumentStream, StreamEvent, StreamStatus};

    /// Transport fake that replays a scripted stream and records the
    /// request it was given.
    struct ScriptedPersistence {
        events: Mutex<Option<Vec<StreamEvent>>>,
        seen_request: Mutex<Option<DocumentQueryRequest>>,
    }

    impl ScriptedPersistence {
        fn new(events: Vec<StreamEvent>) -> Self {
            Self {
                events: Mutex::new(Some(events)),
                seen_request: Mutex::new(None),
            }
        }

        fn seen_request(&self) -> DocumentQueryRequest {
            self.seen_request
                .lock()
                .unwrap()
                .clone()
                .expect("no stream was opened")
        }
    }

    #[async_trait]
    impl PersistenceTransport for ScriptedPersistence {
        async fn open_document_stream(
            &self,
            request: DocumentQueryRequest,
        ) -> Result<DocumentStream, TransportError> {
            *self.seen_request.lock().unwrap() = Some(request);
            let events = self
                .events
                .lock()
                .unwrap()
                .take()
                .expect("stream already consumed");
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
            Ok(3)
        }

        async fn list_collections(
            &self,
            _connection_id: &str,
            _database: &str,
        ) -> Result<Vec<String>, TransportError> {
            Ok(vec!["orders".to_string(), "users".to_string()])
        }
    }

    #[tokio::test]
    async fn fetch_documents_decodes_streamed_payload() {
        let transport = Arc::new(ScriptedPersistence::new(vec![
            StreamEvent::Chunk(b"[{\"id\":1}".to_vec()),
            StreamEvent::Chunk(b",{\"id\":2}]".to_vec()),
            StreamEvent::Completed(StreamStatus::ok()),
        ]));
        let client = PersistenceClient::new(transport);

        let documents = client
            .fetch_documents("conn-1", "app", "orders", Some("{\"open\":true}"), None)
            .await
            .unwrap();

        assert_eq!(documents, vec![json!({"id": 1}), json!({"id": 2})]);
    }

    #[tokio::test]
    async fn missing_query_defaults_to_match_all() {
        let transport = Arc::new(ScriptedPersistence::new(vec![StreamEvent::Completed(
            StreamStatus::ok(),
        )]));
        let client = PersistenceClient::new(transport.clone());

        client
            .fetch_documents("conn-1", "app", "orders", None, None)
            .await
            .unwrap();

        let request = transport.seen_request();
        assert_eq!(request.query, MATCH_ALL_QUERY);
        assert!(request.options.is_none());
    }

    #[tokio::test]
    async fn explicit_query_and_options_are_passed_through() {
        let transport = Arc::new(ScriptedPersistence::new(vec![StreamEvent::Completed(
            StreamStatus::ok(),
        )]));
        let client = PersistenceClient::new(transport.clone());

        client
            .fetch_documents(
                "conn-1",
                "app",
                "orders",
                Some("{\"status\":\"open\"}"),
                Some("{\"limit\":10}"),
            )
            .await
            .unwrap();

        let request = transport.seen_request();
        assert_eq!(request.query, "{\"status\":\"open\"}");
        assert_eq!(request.options.as_deref(), Some("{\"limit\":10}"));
    }

    #[tokio::test]
    async fn empty_identifiers_are_rejected_before_any_call() {
        let transport = Arc::new(ScriptedPersistence::new(vec![]));
        let client = PersistenceClient::new(transport.clone());

        for (connection_id, database, collection) in [
            ("", "app", "orders"),
            ("conn-1", "", "orders"),
            ("conn-1", "app", ""),
        ] {
            let result = client
                .fetch_documents(connection_id, database, collection, None, None)
                .await;
            assert!(matches!(result, Err(FetchError::InvalidRequest(_))));
        }

        // The transport never saw a request.
        assert!(transport.seen_request.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn unary_calls_delegate_to_the_transport() {
        let transport = Arc::new(ScriptedPersistence::new(vec![]));
        let client = PersistenceClient::new(transport);

        let inserted = client
            .insert_documents("conn-1", "app", "orders", vec![json!({"id": 1})])
            .await
            .unwrap();
        assert_eq!(inserted, 1);

        let deleted = client
            .delete_documents("conn-1", "app", "orders", "{\"id\":1}")
            .await
            .unwrap();
        assert_eq!(deleted, 3);

        let collections = client.list_collections("conn-1", "app").await.unwrap();
        assert_eq!(collections, vec!["orders", "users"]);
    }

    #[tokio::test]
    async fn cancelled_fetch_reports_aborted() {
        /// Transport whose stream yields one chunk and then hangs forever.
        struct HangingPersistence;

        #[async_trait]
        impl PersistenceTransport for HangingPersistence {
            async fn open_document_stream(
                &self,
                _request: DocumentQueryRequest,
            ) -> Result<DocumentStream, TransportError> {
                let events = stream::iter(vec![StreamEvent::Chunk(b"[".to_vec())])
                    .chain(stream::pending());
                Ok(Box::pin(events))
            }

            async fn insert_documents(
                &self,
                _request: DocumentInsertRequest,
            ) -> Result<u64, TransportError> {
                unimplemented!()
            }

            async fn delete_documents(
                &self,
                _request: DocumentDeleteRequest,
            ) -> Result<u64, TransportError> {
                unimplemented!()
            }

            async fn list_collections(
                &self,
                _connection_id: &str,
                _database: &str,
            ) -> Result<Vec<String>, TransportError> {
                unimplemented!()
            }
        }

        let client = PersistenceClient::new(Arc::new(HangingPersistence));
        let cancel = CancellationToken::new();

        let fetch = client.fetch_documents_with_cancel(
            "conn-1", "app", "orders", None, None, &cancel,
        );
        tokio::pin!(fetch);

        // Let the fetch make progress, then cancel it.
        tokio::select! {
            _ = &mut fetch => panic!("fetch should still be pending"),
            _ = tokio::time::sleep(std::time::Duration::from_millis(10)) => {}
        }
        cancel.cancel();

        match fetch.await {
            Err(FetchError::Transport(TransportError::Aborted)) => {}
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
