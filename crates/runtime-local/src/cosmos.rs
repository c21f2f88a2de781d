//! A Cosmos DB (SQL API) client speaking the REST protocol directly.
//!
//! Only the handful of calls the gateway needs are implemented: point reads, queries,
//! read feeds and upserts on a single container, authorized with the account master key.

mod auth;

use base64::Engine as _;
use reqwest::{header::HeaderMap, Method, StatusCode};
use runtime::store::{
    Document, DocumentStoreInner, PageRequest, QueryItems, ReadFeed, ReadItem, ResponseMetadata, StoreError,
    StoreResponse, StoreResult, UpsertItem,
};
use url::Url;

use self::auth::MasterKey;

const API_VERSION: &str = "2018-12-31";

const HEADER_API_VERSION: &str = "x-ms-version";
const HEADER_DATE: &str = "x-ms-date";
const HEADER_SESSION_TOKEN: &str = "x-ms-session-token";
const HEADER_REQUEST_CHARGE: &str = "x-ms-request-charge";
const HEADER_CONTINUATION: &str = "x-ms-continuation";
const HEADER_MAX_ITEM_COUNT: &str = "x-ms-max-item-count";
const HEADER_PARTITION_KEY: &str = "x-ms-documentdb-partitionkey";
const HEADER_IS_QUERY: &str = "x-ms-documentdb-isquery";
const HEADER_IS_UPSERT: &str = "x-ms-documentdb-is-upsert";
const HEADER_CROSS_PARTITION: &str = "x-ms-documentdb-query-enablecrosspartition";

const CONTENT_TYPE_QUERY: &str = "application/query+json";

/// Connection settings of [CosmosStore].
#[derive(Debug, Clone)]
pub struct CosmosStoreConfig {
    /// Account endpoint, e.g. `https://my-account.documents.azure.com:443/`
    pub endpoint: Url,
    /// Base64 encoded primary or secondary master key
    pub key: String,
    pub database: String,
    pub container: String,
}

pub struct CosmosStore {
    client: reqwest::Client,
    endpoint: Url,
    key: MasterKey,
    database: String,
    container: String,
}

#[derive(serde::Deserialize)]
struct FeedResponse {
    #[serde(rename = "Documents", default)]
    documents: Vec<Document>,
}

#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: String,
}

impl CosmosStore {
    pub fn new(config: CosmosStoreConfig) -> StoreResult<Self> {
        let key = base64::engine::general_purpose::STANDARD
            .decode(config.key.trim())
            .map_err(|err| StoreError::transport(format!("the Cosmos DB key is not valid base64: {err}")))?;

        let client = reqwest::Client::builder().build().map_err(StoreError::transport)?;

        Ok(Self {
            client,
            endpoint: config.endpoint,
            key: MasterKey::new(key),
            database: config.database,
            container: config.container,
        })
    }

    /// `dbs/{db}/colls/{coll}`, the resource link of the container.
    fn container_link(&self) -> String {
        format!("dbs/{}/colls/{}", self.database, self.container)
    }

    fn url(&self, document_id: Option<&str>) -> StoreResult<Url> {
        let mut url = self.endpoint.clone();

        url.path_segments_mut()
            .map_err(|_| StoreError::transport("the Cosmos DB endpoint cannot be a base URL"))?
            .pop_if_empty()
            .extend(["dbs", self.database.as_str(), "colls", self.container.as_str(), "docs"])
            .extend(document_id);

        Ok(url)
    }

    fn request(
        &self,
        method: Method,
        document_id: Option<&str>,
        session_token: Option<&str>,
    ) -> StoreResult<reqwest::RequestBuilder> {
        let resource_link = match document_id {
            Some(id) => format!("{}/docs/{id}", self.container_link()),
            None => self.container_link(),
        };

        let date = auth::http_date(chrono::Utc::now());
        let authorization = self.key.authorization(&method, "docs", &resource_link, &date);

        let mut builder = self
            .client
            .request(method, self.url(document_id)?)
            .header(reqwest::header::AUTHORIZATION, authorization)
            .header(reqwest::header::ACCEPT, "application/json")
            .header(HEADER_DATE, date)
            .header(HEADER_API_VERSION, API_VERSION);

        if let Some(token) = session_token {
            builder = builder.header(HEADER_SESSION_TOKEN, token);
        }

        Ok(builder)
    }

    async fn send(&self, builder: reqwest::RequestBuilder) -> StoreResult<(StatusCode, ResponseMetadata, Vec<u8>)> {
        let response = builder.send().await.map_err(StoreError::transport)?;

        let status = response.status();
        let metadata = metadata_from_headers(response.headers());
        let body = response.bytes().await.map_err(StoreError::transport)?.to_vec();

        tracing::debug!(
            status = status.as_u16(),
            request_charge = metadata.request_charge,
            "Cosmos DB call completed"
        );

        Ok((status, metadata, body))
    }

    async fn feed(
        &self,
        builder: reqwest::RequestBuilder,
        page: PageRequest<'_>,
    ) -> StoreResult<StoreResponse<Vec<Document>>> {
        let builder = with_page(builder, page);
        let (status, metadata, body) = self.send(builder).await?;

        if !status.is_success() {
            return Err(service_error(status, &body));
        }

        let feed: FeedResponse = serde_json::from_slice(&body)?;

        Ok(StoreResponse::new(feed.documents, metadata))
    }
}

fn partition_key_header(partition_key: &str) -> StoreResult<String> {
    Ok(serde_json::to_string(&[partition_key])?)
}

fn with_page(mut builder: reqwest::RequestBuilder, page: PageRequest<'_>) -> reqwest::RequestBuilder {
    if let Some(count) = page.max_item_count {
        builder = builder.header(HEADER_MAX_ITEM_COUNT, count.to_string());
    }

    if let Some(continuation) = page.continuation {
        builder = builder.header(HEADER_CONTINUATION, continuation);
    }

    builder
}

fn metadata_from_headers(headers: &HeaderMap) -> ResponseMetadata {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
            .map(ToString::to_string)
    };

    ResponseMetadata {
        request_charge: header(HEADER_REQUEST_CHARGE)
            .and_then(|charge| charge.parse().ok())
            .unwrap_or_default(),
        session_token: header(HEADER_SESSION_TOKEN),
        continuation: header(HEADER_CONTINUATION),
    }
}

fn service_error(status: StatusCode, body: &[u8]) -> StoreError {
    let message = serde_json::from_slice::<ErrorResponse>(body)
        .map(|error| error.message)
        .unwrap_or_else(|_| String::from_utf8_lossy(body).into_owned());

    StoreError::Service {
        status: status.as_u16(),
        message,
    }
}

#[async_trait::async_trait]
impl DocumentStoreInner for CosmosStore {
    async fn read_item(&self, request: ReadItem<'_>) -> StoreResult<StoreResponse<Option<Document>>> {
        let builder = self
            .request(Method::GET, Some(request.id), request.session_token)?
            .header(HEADER_PARTITION_KEY, partition_key_header(request.partition_key)?);

        let (status, metadata, body) = self.send(builder).await?;

        match status {
            StatusCode::NOT_FOUND => Ok(StoreResponse::new(None, metadata)),
            status if status.is_success() => Ok(StoreResponse::new(Some(serde_json::from_slice(&body)?), metadata)),
            status => Err(service_error(status, &body)),
        }
    }

    async fn query_items(&self, request: QueryItems<'_>) -> StoreResult<StoreResponse<Vec<Document>>> {
        let body = serde_json::to_vec(&request.filter.to_sql())?;

        let mut builder = self
            .request(Method::POST, None, request.session_token)?
            .header(reqwest::header::CONTENT_TYPE, CONTENT_TYPE_QUERY)
            .header(HEADER_IS_QUERY, "True")
            .body(body);

        if let Some(partition_key) = request.partition_key {
            builder = builder.header(HEADER_PARTITION_KEY, partition_key_header(partition_key)?);
        }

        if request.enable_cross_partition {
            builder = builder.header(HEADER_CROSS_PARTITION, "True");
        }

        self.feed(builder, request.page).await
    }

    async fn read_all_items(&self, request: ReadFeed<'_>) -> StoreResult<StoreResponse<Vec<Document>>> {
        let builder = self.request(Method::GET, None, request.session_token)?;

        self.feed(builder, request.page).await
    }

    async fn upsert_item(&self, request: UpsertItem<'_>) -> StoreResult<StoreResponse<Document>> {
        let builder = self
            .request(Method::POST, None, request.session_token)?
            .header(HEADER_PARTITION_KEY, partition_key_header(request.partition_key)?)
            .header(HEADER_IS_UPSERT, "True")
            .json(request.document);

        let (status, metadata, body) = self.send(builder).await?;

        if !status.is_success() {
            return Err(service_error(status, &body));
        }

        Ok(StoreResponse::new(serde_json::from_slice(&body)?, metadata))
    }
}
