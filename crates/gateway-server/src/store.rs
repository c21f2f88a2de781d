use gateway_config::{StoreConfig, StoreKind};
use runtime::store::DocumentStore;
use runtime_local::{CosmosStore, CosmosStoreConfig, InMemoryStore};

use crate::Error;

/// Creates the document store client described by the configuration. Missing Cosmos DB
/// settings are reported with the environment variable that provides them.
pub fn build_store(config: &StoreConfig) -> crate::Result<DocumentStore> {
    match config.kind {
        StoreKind::Memory => {
            tracing::warn!("Using an in-memory document store, data is lost on shutdown");
            Ok(DocumentStore::new(InMemoryStore::new()))
        }
        StoreKind::Cosmos => {
            let endpoint = config.endpoint_url().map_err(Error::StoreConfig)?;

            let key = config
                .required(&config.key, "key", "CosmosKey")
                .map_err(Error::StoreConfig)?;

            let database = config
                .required(&config.database, "database", "CosmosDatabase")
                .map_err(Error::StoreConfig)?;

            let container = config
                .required(&config.container, "container", "CosmosContainer")
                .map_err(Error::StoreConfig)?;

            tracing::info!(
                endpoint = %endpoint,
                database = %database,
                container = %container,
                "Connecting to Cosmos DB"
            );

            let store = CosmosStore::new(CosmosStoreConfig {
                endpoint,
                key,
                database,
                container,
            })?;

            Ok(DocumentStore::new(store))
        }
    }
}

#[cfg(test)]
mod tests {
    use gateway_config::DynamicString;

    use super::*;

    #[test]
    fn memory() {
        let config = StoreConfig {
            kind: StoreKind::Memory,
            ..Default::default()
        };

        assert!(build_store(&config).is_ok());
    }

    #[test]
    fn cosmos_settings_are_required() {
        let mut config = StoreConfig {
            endpoint: Some(DynamicString::from("https://acme.documents.azure.com:443/")),
            key: Some(DynamicString::from("c2VjcmV0")),
            database: Some(DynamicString::from("db")),
            ..Default::default()
        };

        let error = build_store(&config).err().unwrap();
        insta::assert_snapshot!(error, @"document store configuration: the Cosmos DB container is not configured (CosmosContainer)");

        config.container = Some(DynamicString::from("items"));
        assert!(build_store(&config).is_ok());
    }

    #[test]
    fn invalid_key() {
        let config = StoreConfig {
            endpoint: Some(DynamicString::from("https://acme.documents.azure.com:443/")),
            key: Some(DynamicString::from("not base64!")),
            database: Some(DynamicString::from("db")),
            container: Some(DynamicString::from("items")),
            ..Default::default()
        };

        assert!(build_store(&config).is_err());
    }
}
