use async_graphql::{Number, Value};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use gateway_config::FieldType;
use runtime::store::{Document, TS_FIELD};

/// The `_ts` of the document as an RFC 3339 string in the given timezone. `None` when the
/// document has no usable `_ts`.
pub(crate) fn timestamp(document: &Document, timezone: Tz) -> Option<String> {
    let ts = document.get(TS_FIELD)?;
    let seconds = ts.as_i64().or_else(|| ts.as_f64().map(|ts| ts as i64))?;

    let utc = DateTime::<Utc>::from_timestamp(seconds, 0)?;

    Some(utc.with_timezone(&timezone).to_rfc3339())
}

/// Converts a document value to the GraphQL type of its field. Values that cannot be
/// represented resolve to null.
pub(crate) fn coerce(value: &serde_json::Value, field_type: FieldType) -> Option<Value> {
    use serde_json::Value as Json;

    match (field_type, value) {
        (_, Json::Null) => None,
        (FieldType::JSON, value) => Value::from_json(value.clone()).ok(),
        (FieldType::String | FieldType::ID, Json::String(value)) => Some(Value::String(value.clone())),
        (FieldType::String | FieldType::ID, Json::Number(value)) => Some(Value::String(value.to_string())),
        (FieldType::String | FieldType::ID, Json::Bool(value)) => Some(Value::String(value.to_string())),
        (FieldType::Int, Json::Number(value)) => value
            .as_i64()
            .filter(|value| i32::try_from(*value).is_ok())
            .map(|value| Value::Number(value.into())),
        (FieldType::Float, Json::Number(value)) => value.as_f64().and_then(float),
        (FieldType::Boolean, Json::Bool(value)) => Some(Value::Boolean(*value)),
        _ => None,
    }
}

pub(crate) fn float(value: f64) -> Option<Value> {
    Number::from_f64(value).map(Value::Number)
}

/// The document carried by an input object argument.
pub(crate) fn document_from_input(value: &Value) -> Option<Document> {
    match value.clone().into_json().ok()? {
        serde_json::Value::Object(document) => Some(document),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn document(value: serde_json::Value) -> Document {
        match value {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn timestamp_in_utc() {
        let document = document(json!({"_ts": 1_700_000_000}));

        assert_eq!(
            timestamp(&document, chrono_tz::UTC).as_deref(),
            Some("2023-11-14T22:13:20+00:00")
        );
    }

    #[test]
    fn timestamp_in_another_timezone() {
        let document = document(json!({"_ts": 1_700_000_000}));

        assert_eq!(
            timestamp(&document, chrono_tz::Europe::Amsterdam).as_deref(),
            Some("2023-11-14T23:13:20+01:00")
        );
        assert_eq!(
            timestamp(&document, chrono_tz::America::New_York).as_deref(),
            Some("2023-11-14T17:13:20-05:00")
        );
    }

    #[test]
    fn timestamp_without_ts() {
        assert_eq!(timestamp(&document(json!({"id": "a1"})), chrono_tz::UTC), None);
        assert_eq!(timestamp(&document(json!({"_ts": "yesterday"})), chrono_tz::UTC), None);
    }

    #[test]
    fn coercion() {
        assert_eq!(coerce(&json!("Dam 1"), FieldType::String), Some(Value::from("Dam 1")));
        assert_eq!(coerce(&json!(42), FieldType::ID), Some(Value::from("42")));
        assert_eq!(coerce(&json!(3), FieldType::Int), Some(Value::from(3)));
        assert_eq!(coerce(&json!(5_000_000_000_i64), FieldType::Int), None);
        assert_eq!(coerce(&json!("3"), FieldType::Int), None);
        assert_eq!(coerce(&json!(true), FieldType::Boolean), Some(Value::Boolean(true)));
        assert_eq!(coerce(&json!(null), FieldType::JSON), None);
        assert_eq!(
            coerce(&json!({"tags": ["a"]}), FieldType::JSON),
            Some(Value::from_json(json!({"tags": ["a"]})).unwrap())
        );
    }
}
