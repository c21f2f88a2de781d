use std::future::Future;

use futures_util::lock::Mutex;
use runtime::store::{
    Document, DocumentStore, Filter, PageRequest, QueryItems, ReadFeed, ReadItem, ResponseMetadata, StoreResponse,
    StoreResult, UpsertItem,
};

/// What the store reported over the calls of one operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperationMetadata {
    /// Sum of the request charges of every store call.
    pub request_charge: f64,
    /// Latest session token returned by the store, or the one the client sent.
    pub session_token: Option<String>,
    /// Continuation of the latest paged call.
    pub continuation: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CallKind {
    Read,
    Page,
    Write,
}

impl CallKind {
    fn as_str(self) -> &'static str {
        match self {
            CallKind::Read => "read",
            CallKind::Page => "page",
            CallKind::Write => "write",
        }
    }
}

/// The store as seen by a single GraphQL operation.
///
/// Every call goes through [OperationSession::track], which records the response metadata
/// once the call completes. Calls forward the most recent session token so that a read
/// following a write in the same operation observes it.
pub struct OperationSession {
    store: DocumentStore,
    metadata: Mutex<OperationMetadata>,
}

impl OperationSession {
    pub fn new(store: DocumentStore, session_token: Option<String>) -> Self {
        Self {
            store,
            metadata: Mutex::new(OperationMetadata {
                session_token: session_token.filter(|token| !token.is_empty()),
                ..Default::default()
            }),
        }
    }

    pub async fn metadata(&self) -> OperationMetadata {
        self.metadata.lock().await.clone()
    }

    pub async fn read_item(&self, id: &str, partition_key: &str) -> StoreResult<Option<Document>> {
        let session_token = self.session_token().await;

        let call = self.store.read_item(ReadItem {
            id,
            partition_key,
            session_token: session_token.as_deref(),
        });

        self.track(CallKind::Read, call).await
    }

    pub async fn query_items(
        &self,
        filter: &Filter,
        partition_key: Option<&str>,
        page: PageRequest<'_>,
    ) -> StoreResult<Vec<Document>> {
        let session_token = self.session_token().await;

        let call = self.store.query_items(QueryItems {
            filter,
            partition_key,
            enable_cross_partition: partition_key.is_none(),
            page,
            session_token: session_token.as_deref(),
        });

        self.track(CallKind::Page, call).await
    }

    pub async fn read_all_items(&self, page: PageRequest<'_>) -> StoreResult<Vec<Document>> {
        let session_token = self.session_token().await;

        let call = self.store.read_all_items(ReadFeed {
            page,
            session_token: session_token.as_deref(),
        });

        self.track(CallKind::Page, call).await
    }

    pub async fn upsert_item(&self, document: &Document, partition_key: &str) -> StoreResult<Document> {
        let session_token = self.session_token().await;

        let call = self.store.upsert_item(UpsertItem {
            document,
            partition_key,
            session_token: session_token.as_deref(),
        });

        self.track(CallKind::Write, call).await
    }

    async fn session_token(&self) -> Option<String> {
        self.metadata.lock().await.session_token.clone()
    }

    async fn track<T>(
        &self,
        kind: CallKind,
        call: impl Future<Output = StoreResult<StoreResponse<T>>>,
    ) -> StoreResult<T> {
        let response = call.await.inspect_err(|err| {
            tracing::debug!(kind = kind.as_str(), "document store call failed: {err}");
        })?;

        tracing::debug!(
            kind = kind.as_str(),
            request_charge = response.metadata.request_charge,
            "document store call"
        );

        self.metadata.lock().await.record(kind, &response.metadata);

        Ok(response.value)
    }
}

impl OperationMetadata {
    fn record(&mut self, kind: CallKind, response: &ResponseMetadata) {
        self.request_charge += response.request_charge;

        if let Some(token) = &response.session_token {
            self.session_token = Some(token.clone());
        }

        if kind == CallKind::Page {
            self.continuation = response.continuation.clone();
        }
    }
}
