use std::{collections::HashSet, sync::Arc};

use async_graphql::parser::types::{DocumentOperations, ExecutableDocument, OperationDefinition, Selection, SelectionSet};
use http::StatusCode;
use runtime::store::DocumentStore;
use serde_json::{json, Value};
use tracing::Instrument;

use crate::{
    schema,
    session::{OperationMetadata, OperationSession},
    settings::{SchemaError, SchemaSettings},
};

/// The result of one GraphQL operation, ready to be sent back over HTTP.
#[derive(Debug, Clone)]
pub struct OperationResponse {
    /// The GraphQL response. `data.costs` and `data.continuation`, when selected, hold the
    /// values accumulated over the whole operation.
    pub body: Value,
    /// 200 without errors, 400 otherwise.
    pub status: StatusCode,
    pub metadata: OperationMetadata,
}

#[derive(Clone)]
pub struct Engine {
    schema: async_graphql::dynamic::Schema,
    store: DocumentStore,
}

impl Engine {
    pub fn new(store: DocumentStore, settings: SchemaSettings) -> Result<Self, SchemaError> {
        let schema = schema::build(Arc::new(settings))?;

        Ok(Self { schema, store })
    }

    /// The schema in SDL.
    pub fn sdl(&self) -> String {
        self.schema.sdl()
    }

    /// Executes one operation in its own session. `session_token` is the token the client
    /// got from a previous response, if any.
    pub async fn execute(&self, request: async_graphql::Request, session_token: Option<String>) -> OperationResponse {
        let session = Arc::new(OperationSession::new(self.store.clone(), session_token));
        let metadata_fields = MetadataFields::of(&request);

        let span = tracing::info_span!(
            "graphql",
            operation_name = request.operation_name.as_deref().unwrap_or_default()
        );

        let response = self
            .schema
            .execute(request.data(session.clone()))
            .instrument(span)
            .await;

        let metadata = session.metadata().await;

        let status = if response.is_ok() {
            StatusCode::OK
        } else {
            tracing::debug!(errors = response.errors.len(), "operation failed");
            StatusCode::BAD_REQUEST
        };

        let mut body = serde_json::to_value(&response).unwrap_or_else(|err| {
            tracing::error!("serializing the response: {err}");
            json!({ "data": null, "errors": [{ "message": "internal server error" }] })
        });

        metadata_fields.apply(&mut body, &metadata);

        OperationResponse { body, status, metadata }
    }
}

/// Response keys of the root `costs` and `continuation` fields selected by the operation
/// to execute, aliases included.
#[derive(Debug, Default, PartialEq)]
struct MetadataFields {
    costs: Vec<String>,
    continuation: Vec<String>,
}

impl MetadataFields {
    fn of(request: &async_graphql::Request) -> Self {
        let mut fields = Self::default();

        // an unparsable query fails execution, nothing to patch
        let Ok(document) = async_graphql::parser::parse_query(&request.query) else {
            return fields;
        };

        if let Some(operation) = operation(&document, request.operation_name.as_deref()) {
            let mut visited = HashSet::new();
            fields.collect(&document, &operation.selection_set.node, &mut visited);
        }

        fields
    }

    fn collect<'a>(
        &mut self,
        document: &'a ExecutableDocument,
        selection_set: &'a SelectionSet,
        visited: &mut HashSet<&'a str>,
    ) {
        for selection in &selection_set.items {
            match &selection.node {
                Selection::Field(field) => {
                    let key = field.node.response_key().node.to_string();

                    match field.node.name.node.as_str() {
                        "costs" => self.costs.push(key),
                        "continuation" => self.continuation.push(key),
                        _ => {}
                    }
                }
                Selection::InlineFragment(fragment) => {
                    self.collect(document, &fragment.node.selection_set.node, visited);
                }
                Selection::FragmentSpread(spread) => {
                    let name = spread.node.fragment_name.node.as_str();

                    if !visited.insert(name) {
                        continue;
                    }

                    if let Some(fragment) = document.fragments.get(&spread.node.fragment_name.node) {
                        self.collect(document, &fragment.node.selection_set.node, visited);
                    }
                }
            }
        }
    }

    /// Replaces the selected metadata fields with their final values. They may resolve
    /// before the store calls of sibling fields complete.
    fn apply(&self, body: &mut Value, metadata: &OperationMetadata) {
        let Some(data) = body.get_mut("data").and_then(Value::as_object_mut) else {
            return;
        };

        for key in &self.costs {
            if let Some(costs) = data.get_mut(key) {
                *costs = json!(metadata.request_charge);
            }
        }

        for key in &self.continuation {
            if let Some(continuation) = data.get_mut(key) {
                *continuation = json!(metadata.continuation);
            }
        }
    }
}

fn operation<'a>(document: &'a ExecutableDocument, name: Option<&str>) -> Option<&'a OperationDefinition> {
    match (&document.operations, name) {
        (DocumentOperations::Single(operation), _) => Some(&operation.node),
        (DocumentOperations::Multiple(operations), Some(name)) => operations
            .iter()
            .find(|(operation_name, _)| operation_name.as_str() == name)
            .map(|(_, operation)| &operation.node),
        (DocumentOperations::Multiple(operations), None) if operations.len() == 1 => {
            operations.values().next().map(|operation| &operation.node)
        }
        (DocumentOperations::Multiple(_), None) => None,
    }
}
