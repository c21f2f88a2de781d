mod error;
mod filter;
mod metadata;

use std::sync::Arc;

pub use error::{StoreError, StoreResult};
pub use filter::{Filter, SqlParameter, SqlQuery};
pub use metadata::ResponseMetadata;

/// A stored record. Documents are flat JSON objects keyed by `id` and the
/// configured partition key field.
pub type Document = serde_json::Map<String, serde_json::Value>;

pub const ID_FIELD: &str = "id";

/// System properties assigned by the store on every write.
pub const RID_FIELD: &str = "_rid";
pub const SELF_FIELD: &str = "_self";
pub const ETAG_FIELD: &str = "_etag";
pub const TS_FIELD: &str = "_ts";
pub const ATTACHMENTS_FIELD: &str = "_attachments";

pub const SYSTEM_FIELDS: [&str; 5] = [RID_FIELD, SELF_FIELD, ETAG_FIELD, TS_FIELD, ATTACHMENTS_FIELD];

/// The value of a store call together with the metadata the store reported for it.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreResponse<T> {
    pub value: T,
    pub metadata: ResponseMetadata,
}

impl<T> StoreResponse<T> {
    pub fn new(value: T, metadata: ResponseMetadata) -> Self {
        Self { value, metadata }
    }
}

/// Paging parameters of a feed or query call. Only one page is ever fetched per call.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageRequest<'a> {
    /// Upper bound of documents in the page. The store default applies when unset.
    pub max_item_count: Option<u32>,
    /// Opaque cursor returned by a previous call.
    pub continuation: Option<&'a str>,
}

#[derive(Debug, Clone, Copy)]
pub struct ReadItem<'a> {
    pub id: &'a str,
    pub partition_key: &'a str,
    pub session_token: Option<&'a str>,
}

#[derive(Debug, Clone, Copy)]
pub struct QueryItems<'a> {
    pub filter: &'a Filter,
    pub partition_key: Option<&'a str>,
    pub enable_cross_partition: bool,
    pub page: PageRequest<'a>,
    pub session_token: Option<&'a str>,
}

#[derive(Debug, Clone, Copy)]
pub struct ReadFeed<'a> {
    pub page: PageRequest<'a>,
    pub session_token: Option<&'a str>,
}

#[derive(Debug, Clone, Copy)]
pub struct UpsertItem<'a> {
    pub document: &'a Document,
    pub partition_key: &'a str,
    pub session_token: Option<&'a str>,
}

/// The operations a document store backend has to provide.
#[async_trait::async_trait]
pub trait DocumentStoreInner: Send + Sync {
    /// Point read by id and partition key. A missing document is `Ok(None)`.
    async fn read_item(&self, request: ReadItem<'_>) -> StoreResult<StoreResponse<Option<Document>>>;

    /// First page of the documents matching the filter.
    async fn query_items(&self, request: QueryItems<'_>) -> StoreResult<StoreResponse<Vec<Document>>>;

    /// First page of an unfiltered scan of the container.
    async fn read_all_items(&self, request: ReadFeed<'_>) -> StoreResult<StoreResponse<Vec<Document>>>;

    /// Creates or fully replaces the document with the same id and partition key.
    async fn upsert_item(&self, request: UpsertItem<'_>) -> StoreResult<StoreResponse<Document>>;
}

#[derive(Clone)]
pub struct DocumentStore(Arc<dyn DocumentStoreInner>);

impl DocumentStore {
    pub fn new(inner: impl DocumentStoreInner + 'static) -> Self {
        Self(Arc::new(inner))
    }
}

impl<T: DocumentStoreInner + 'static> From<Arc<T>> for DocumentStore {
    fn from(inner: Arc<T>) -> Self {
        Self(inner)
    }
}

impl std::ops::Deref for DocumentStore {
    type Target = dyn DocumentStoreInner;

    fn deref(&self) -> &Self::Target {
        self.0.deref()
    }
}
