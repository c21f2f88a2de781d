mod dynamic_string;
mod loader;
pub mod schema;
pub mod store;

use std::net::SocketAddr;

pub use dynamic_string::DynamicString;
pub use loader::ConfigError;
pub use schema::{FieldConfig, FieldType, SchemaConfig};
pub use store::{StoreConfig, StoreKind};

#[derive(Clone, Debug, Default, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
/// Configuration struct to define settings for the Cosmos GraphQL gateway.
pub struct Config {
    /// Graph location and features, such as introspection
    pub graph: GraphConfig,
    /// Server bind settings
    pub network: NetworkConfig,
    /// Health check endpoint configuration
    pub health: HealthConfig,
    /// The document store backing the graph
    pub store: StoreConfig,
    /// Shape of the documents exposed in the graph
    pub schema: SchemaConfig,
}

#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GraphConfig {
    /// The path of the GraphQL endpoint. Default: `/graphql`.
    pub path: Option<String>,
    /// Whether the schema can be introspected. The explorer page needs it.
    pub introspection: bool,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            path: None,
            introspection: true,
        }
    }
}

impl GraphConfig {
    pub fn path(&self) -> &str {
        self.path.as_deref().unwrap_or("/graphql")
    }
}

#[derive(Clone, Debug, Default, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NetworkConfig {
    pub listen_address: Option<SocketAddr>,
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HealthConfig {
    pub enabled: bool,
    pub path: String,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "/health".to_string(),
        }
    }
}
