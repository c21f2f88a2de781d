#![allow(dead_code)]

use std::sync::Arc;

use engine::{Engine, OperationResponse, SchemaSettings};
use gateway_config::{FieldConfig, FieldType, SchemaConfig};
use runtime::store::Document;
use runtime_local::InMemoryStore;
use serde_json::Value;

pub struct TestEngine {
    pub engine: Engine,
    pub store: Arc<InMemoryStore>,
}

/// Documents are partitioned on `city`, with a required filterable `address` and an
/// optional filterable `floors`.
pub fn schema_config() -> SchemaConfig {
    SchemaConfig {
        timezone: None,
        fields: vec![
            FieldConfig {
                name: "address".into(),
                r#type: FieldType::String,
                required: true,
                filter: true,
            },
            FieldConfig {
                name: "floors".into(),
                r#type: FieldType::Int,
                required: false,
                filter: true,
            },
            FieldConfig {
                name: "tags".into(),
                r#type: FieldType::JSON,
                required: false,
                filter: false,
            },
        ],
    }
}

pub fn document(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        _ => unreachable!(),
    }
}

impl TestEngine {
    pub async fn with_documents(documents: impl IntoIterator<Item = Value>) -> Self {
        let store = Arc::new(InMemoryStore::new().with_call_log());

        for document in documents {
            let city = document["city"].as_str().unwrap().to_string();
            store.insert(city, self::document(document)).await.unwrap();
        }

        let settings = SchemaSettings::new("city", &schema_config()).unwrap();
        let engine = Engine::new(store.clone().into(), settings).unwrap();

        Self { engine, store }
    }

    pub async fn execute(&self, query: &str) -> OperationResponse {
        self.engine.execute(async_graphql::Request::new(query), None).await
    }

    pub async fn execute_with_session(&self, query: &str, session_token: &str) -> OperationResponse {
        self.engine
            .execute(async_graphql::Request::new(query), Some(session_token.to_string()))
            .await
    }
}
