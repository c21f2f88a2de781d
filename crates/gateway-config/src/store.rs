use url::Url;

use crate::DynamicString;

/// The partition key field when none is configured.
pub const DEFAULT_PARTITION_KEY_FIELD: &str = "partition_key";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// An Azure Cosmos DB container, reached over its REST API
    #[default]
    Cosmos,
    /// A transient container kept in process memory, for local development
    Memory,
}

#[derive(Clone, Debug, Default, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    pub kind: StoreKind,
    /// Cosmos DB account endpoint
    pub endpoint: Option<DynamicString>,
    /// Cosmos DB master key, base64 encoded
    pub key: Option<DynamicString>,
    pub database: Option<DynamicString>,
    pub container: Option<DynamicString>,
    /// Name of the document field the container is partitioned on. Partition key values are
    /// always strings: the GraphQL schema exposes the key as `String` and a number or boolean
    /// in upsert input is sent to the store in its JSON text form (`3` becomes `"3"`).
    pub partition_key_field: Option<DynamicString>,
}

impl StoreConfig {
    pub fn partition_key_field(&self) -> &str {
        self.partition_key_field
            .as_deref()
            .unwrap_or(DEFAULT_PARTITION_KEY_FIELD)
    }

    /// The Cosmos DB endpoint, parsed. Errors name the missing or invalid setting.
    pub fn endpoint_url(&self) -> Result<Url, String> {
        let endpoint = self
            .endpoint
            .as_ref()
            .ok_or_else(|| "the Cosmos DB endpoint is not configured (CosmosURL)".to_string())?;

        endpoint
            .parse()
            .map_err(|err| format!("the Cosmos DB endpoint `{endpoint}` is not a valid URL: {err}"))
    }

    pub fn required(&self, value: &Option<DynamicString>, name: &str, variable: &str) -> Result<String, String> {
        value
            .as_ref()
            .filter(|value| !value.is_empty())
            .map(|value| value.to_string())
            .ok_or_else(|| format!("the Cosmos DB {name} is not configured ({variable})"))
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;
    use crate::Config;

    #[test]
    fn cosmos_from_env_placeholders() {
        let input = indoc! {r#"
            [store]
            endpoint = "{{ env.CosmosURL }}"
            key = "{{ env.CosmosKey }}"
            database = "{{ env.CosmosDatabase }}"
            container = "{{ env.CosmosContainer }}"
            partition_key_field = "{{ env.CosmosPartitionKey }}"
        "#};

        let vars = [
            ("CosmosURL", Some("https://acme.documents.azure.com:443/")),
            ("CosmosKey", Some("c2VjcmV0")),
            ("CosmosDatabase", Some("db")),
            ("CosmosContainer", Some("items")),
            ("CosmosPartitionKey", Some("city")),
        ];

        temp_env::with_vars(vars, || {
            let config: Config = toml::from_str(input).unwrap();
            let store = config.store;

            assert_eq!(store.kind, StoreKind::Cosmos);
            assert_eq!(store.endpoint_url().unwrap().host_str(), Some("acme.documents.azure.com"));
            assert_eq!(store.required(&store.key, "key", "CosmosKey").unwrap(), "c2VjcmV0");
            assert_eq!(store.partition_key_field(), "city");
        });
    }

    #[test]
    fn memory_store() {
        let config: Config = toml::from_str("[store]\nkind = \"memory\"\n").unwrap();
        assert_eq!(config.store.kind, StoreKind::Memory);
    }

    #[test]
    fn missing_settings_name_the_variable() {
        let store = StoreConfig::default();

        insta::assert_snapshot!(store.endpoint_url().unwrap_err(), @"the Cosmos DB endpoint is not configured (CosmosURL)");
        insta::assert_snapshot!(
            store.required(&store.database, "database", "CosmosDatabase").unwrap_err(),
            @"the Cosmos DB database is not configured (CosmosDatabase)"
        );
    }
}
