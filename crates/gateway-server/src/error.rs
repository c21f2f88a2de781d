/// The gateway server error type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The document store settings are incomplete or invalid
    #[error("document store configuration: {0}")]
    StoreConfig(String),
    /// The document store client could not be created
    #[error(transparent)]
    Store(#[from] runtime::store::StoreError),
    /// The configured fields do not make a valid GraphQL schema
    #[error("invalid schema: {0}")]
    Schema(#[from] engine::SchemaError),
    /// Cannot start the HTTP server
    #[error("starting server: {0}")]
    Server(#[source] std::io::Error),
}
