use runtime::store::{Document, StoreError, ID_FIELD};
use serde_json::Value;

use crate::{session::OperationSession, settings::SchemaSettings};

/// Why an upsert was refused before reaching the store. The messages are returned to the
/// client in the `error` field of the result.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationFailure {
    #[error("No input provided for upsert.")]
    NoInput,
    #[error("Partition key ({field}) is required.")]
    MissingPartitionKey { field: String },
    #[error("{} is required.", capitalize(.field))]
    MissingField { field: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum UpsertOutcome {
    /// The document as stored, system fields included.
    Upserted { document: Document, partition_key: String },
    Rejected(ValidationFailure),
}

impl UpsertOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, UpsertOutcome::Upserted { .. })
    }

    pub fn error(&self) -> Option<String> {
        match self {
            UpsertOutcome::Upserted { .. } => None,
            UpsertOutcome::Rejected(failure) => Some(failure.to_string()),
        }
    }

    pub fn document(&self) -> Option<&Document> {
        match self {
            UpsertOutcome::Upserted { document, .. } => Some(document),
            UpsertOutcome::Rejected(_) => None,
        }
    }

    pub fn partition_key(&self) -> Option<&str> {
        match self {
            UpsertOutcome::Upserted { partition_key, .. } => Some(partition_key),
            UpsertOutcome::Rejected(_) => None,
        }
    }
}

/// Validates the input and upserts it. Validation failures are an outcome, store failures
/// are errors.
pub async fn upsert(
    session: &OperationSession,
    settings: &SchemaSettings,
    input: Option<Document>,
) -> Result<UpsertOutcome, StoreError> {
    let (document, partition_key) = match validate(settings, input) {
        Ok(valid) => valid,
        Err(failure) => {
            tracing::debug!("upsert rejected: {failure}");
            return Ok(UpsertOutcome::Rejected(failure));
        }
    };

    let document = session.upsert_item(&document, &partition_key).await?;

    Ok(UpsertOutcome::Upserted {
        document,
        partition_key,
    })
}

/// Checks the input and returns the document to write with its partition key. A missing
/// or empty `id` is replaced with a random UUID.
pub(crate) fn validate(
    settings: &SchemaSettings,
    input: Option<Document>,
) -> Result<(Document, String), ValidationFailure> {
    let mut document = input.filter(|input| !input.is_empty()).ok_or(ValidationFailure::NoInput)?;

    let partition_key = match document.get(settings.partition_key_field()) {
        Some(value) if is_truthy(value) => key_string(value),
        _ => {
            return Err(ValidationFailure::MissingPartitionKey {
                field: settings.partition_key_field().to_string(),
            })
        }
    };

    for field in settings.required_fields() {
        if document.get(&field.name).is_none_or(Value::is_null) {
            return Err(ValidationFailure::MissingField {
                field: field.name.clone(),
            });
        }
    }

    let has_id = matches!(document.get(ID_FIELD), Some(Value::String(id)) if !id.is_empty());

    if !has_id {
        document.insert(ID_FIELD.into(), Value::String(uuid::Uuid::new_v4().to_string()));
    }

    Ok((document, partition_key))
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(value) => *value,
        Value::Number(value) => value.as_f64().is_some_and(|value| value != 0.0),
        Value::String(value) => !value.is_empty(),
        Value::Array(value) => !value.is_empty(),
        Value::Object(value) => !value.is_empty(),
    }
}

/// Partition keys are string typed. Other scalars are keyed by their JSON text.
fn key_string(value: &Value) -> String {
    match value {
        Value::String(value) => value.clone(),
        other => other.to_string(),
    }
}

fn capitalize(field: &str) -> String {
    let mut chars = field.chars();

    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
