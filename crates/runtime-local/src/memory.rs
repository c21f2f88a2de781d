use std::collections::BTreeMap;

use futures_util::lock::Mutex;
use runtime::store::{
    Document, DocumentStoreInner, Filter, PageRequest, QueryItems, ReadFeed, ReadItem, ResponseMetadata, StoreError,
    StoreResponse, StoreResult, UpsertItem, ATTACHMENTS_FIELD, ETAG_FIELD, ID_FIELD, RID_FIELD, SELF_FIELD, TS_FIELD,
};
use serde_json::Value;

/// Page size used when a paged call does not ask for one, same as Cosmos DB.
const DEFAULT_PAGE_SIZE: usize = 100;

const DEFAULT_REQUEST_CHARGE: f64 = 1.0;

/// A store call as received by [InMemoryStore], recorded when the call log is enabled.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    ReadItem {
        id: String,
        partition_key: String,
        session_token: Option<String>,
    },
    QueryItems {
        filter: Filter,
        partition_key: Option<String>,
        max_item_count: Option<u32>,
        session_token: Option<String>,
    },
    ReadAllItems {
        max_item_count: Option<u32>,
        session_token: Option<String>,
    },
    UpsertItem {
        id: String,
        partition_key: String,
        session_token: Option<String>,
    },
}

/// A single container kept in memory. Documents are ordered by partition key, then id,
/// which keeps paging stable between calls.
pub struct InMemoryStore {
    request_charge: f64,
    inner: Mutex<StoreInner>,
}

#[derive(Default)]
struct StoreInner {
    documents: BTreeMap<(String, String), Document>,
    calls: Option<Vec<StoreCall>>,
    // logical sequence number, bumped on every write
    lsn: u64,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self {
            request_charge: DEFAULT_REQUEST_CHARGE,
            inner: Mutex::new(StoreInner::default()),
        }
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Charge reported for every call.
    #[must_use]
    pub fn with_request_charge(mut self, request_charge: f64) -> Self {
        self.request_charge = request_charge;
        self
    }

    /// Records every call received from now on, see [InMemoryStore::drain_calls].
    #[must_use]
    pub fn with_call_log(mut self) -> Self {
        self.inner.get_mut().calls = Some(Vec::new());
        self
    }

    /// Seeds the store without recording a call. The document must contain an `id`.
    pub async fn insert(&self, partition_key: impl Into<String>, document: Document) -> StoreResult<()> {
        let mut inner = self.inner.lock().await;
        inner.write(partition_key.into(), document)?;

        Ok(())
    }

    /// Returns the calls received since the last drain. Always empty without
    /// [InMemoryStore::with_call_log].
    pub async fn drain_calls(&self) -> Vec<StoreCall> {
        self.inner.lock().await.calls.as_mut().map(std::mem::take).unwrap_or_default()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.documents.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn metadata(&self, inner: &StoreInner) -> ResponseMetadata {
        ResponseMetadata::default()
            .with_request_charge(self.request_charge)
            .with_session_token(format!("0:{}", inner.lsn))
    }
}

impl StoreInner {
    fn record(&mut self, call: impl FnOnce() -> StoreCall) {
        if let Some(calls) = &mut self.calls {
            calls.push(call());
        }
    }

    fn write(&mut self, partition_key: String, mut document: Document) -> StoreResult<Document> {
        let id = match document.get(ID_FIELD) {
            Some(Value::String(id)) if !id.is_empty() => id.clone(),
            _ => return Err(StoreError::InvalidDocument("the document must have a string `id`".into())),
        };

        self.lsn += 1;

        let rid = ulid::Ulid::new().to_string();
        document.insert(SELF_FIELD.into(), Value::String(format!("docs/{rid}/")));
        document.insert(RID_FIELD.into(), Value::String(rid));
        document.insert(ETAG_FIELD.into(), Value::String(format!("\"{}\"", ulid::Ulid::new())));
        document.insert(TS_FIELD.into(), Value::from(chrono::Utc::now().timestamp()));
        document.insert(ATTACHMENTS_FIELD.into(), Value::String("attachments/".into()));

        self.documents.insert((partition_key, id), document.clone());

        Ok(document)
    }

    fn partition_count(&self) -> usize {
        let mut partitions = self.documents.keys().map(|(partition_key, _)| partition_key).collect::<Vec<_>>();
        partitions.dedup();
        partitions.len()
    }
}

/// Cuts one page out of the documents. The continuation is the offset of the next page.
fn page(documents: Vec<Document>, page: PageRequest<'_>) -> StoreResult<(Vec<Document>, Option<String>)> {
    let offset = match page.continuation {
        Some(token) => token.parse::<usize>().map_err(|_| StoreError::Service {
            status: 400,
            message: format!("invalid continuation token `{token}`"),
        })?,
        None => 0,
    };

    let size = page.max_item_count.map(|count| count as usize).unwrap_or(DEFAULT_PAGE_SIZE);
    let total = documents.len();

    let items = documents.into_iter().skip(offset).take(size).collect::<Vec<_>>();
    let next = offset + items.len();
    let continuation = (next < total).then(|| next.to_string());

    Ok((items, continuation))
}

#[async_trait::async_trait]
impl DocumentStoreInner for InMemoryStore {
    async fn read_item(&self, request: ReadItem<'_>) -> StoreResult<StoreResponse<Option<Document>>> {
        let mut inner = self.inner.lock().await;

        inner.record(|| StoreCall::ReadItem {
            id: request.id.to_string(),
            partition_key: request.partition_key.to_string(),
            session_token: request.session_token.map(ToString::to_string),
        });

        let document = inner
            .documents
            .get(&(request.partition_key.to_string(), request.id.to_string()))
            .cloned();

        Ok(StoreResponse::new(document, self.metadata(&inner)))
    }

    async fn query_items(&self, request: QueryItems<'_>) -> StoreResult<StoreResponse<Vec<Document>>> {
        let mut inner = self.inner.lock().await;

        inner.record(|| StoreCall::QueryItems {
            filter: request.filter.clone(),
            partition_key: request.partition_key.map(ToString::to_string),
            max_item_count: request.page.max_item_count,
            session_token: request.session_token.map(ToString::to_string),
        });

        if request.partition_key.is_none() && !request.enable_cross_partition && inner.partition_count() > 1 {
            return Err(StoreError::Service {
                status: 400,
                message: "cross partition query is required but disabled".into(),
            });
        }

        let documents = inner
            .documents
            .iter()
            .filter(|((partition_key, _), _)| request.partition_key.is_none_or(|key| key == partition_key.as_str()))
            .filter(|(_, document)| request.filter.matches(document))
            .map(|(_, document)| document.clone())
            .collect();

        let (documents, continuation) = page(documents, request.page)?;
        let metadata = self.metadata(&inner).with_continuation(continuation);

        Ok(StoreResponse::new(documents, metadata))
    }

    async fn read_all_items(&self, request: ReadFeed<'_>) -> StoreResult<StoreResponse<Vec<Document>>> {
        let mut inner = self.inner.lock().await;

        inner.record(|| StoreCall::ReadAllItems {
            max_item_count: request.page.max_item_count,
            session_token: request.session_token.map(ToString::to_string),
        });

        let documents = inner.documents.values().cloned().collect();

        let (documents, continuation) = page(documents, request.page)?;
        let metadata = self.metadata(&inner).with_continuation(continuation);

        Ok(StoreResponse::new(documents, metadata))
    }

    async fn upsert_item(&self, request: UpsertItem<'_>) -> StoreResult<StoreResponse<Document>> {
        let mut inner = self.inner.lock().await;

        inner.record(|| StoreCall::UpsertItem {
            id: request
                .document
                .get(ID_FIELD)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            partition_key: request.partition_key.to_string(),
            session_token: request.session_token.map(ToString::to_string),
        });

        let document = inner.write(request.partition_key.to_string(), request.document.clone())?;

        Ok(StoreResponse::new(document, self.metadata(&inner)))
    }
}
