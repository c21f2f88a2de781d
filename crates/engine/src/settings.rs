use std::collections::HashSet;

use chrono_tz::Tz;
use gateway_config::{FieldConfig, SchemaConfig};

/// Names of the `Container` fields that do not come from the configuration.
pub(crate) const CONTAINER_FIELDS: [&str; 9] = [
    "id",
    "partitionKey",
    "partitionKeyField",
    "timestamp",
    "_rid",
    "_self",
    "_etag",
    "_ts",
    "_attachments",
];

/// Arguments of the `container` query that do not come from the configuration.
pub(crate) const QUERY_ARGUMENTS: [&str; 4] = ["id", "partitionKeyValue", "maxItemCount", "continuation"];

/// Fields of the upsert result that do not come from the configuration.
pub(crate) const UPSERT_RESULT_FIELDS: [&str; 5] = ["status", "error", "id", "partitionKeyValue", "document"];

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SchemaError {
    #[error("`{0}` is not a valid GraphQL name")]
    InvalidName(String),
    #[error("`{0}` clashes with a built-in field or argument of the schema")]
    ReservedName(String),
    #[error("field `{0}` is configured more than once")]
    DuplicateField(String),
    #[error("unknown timezone `{0}`")]
    UnknownTimezone(String),
    #[error("building the schema: {0}")]
    Build(String),
}

/// Everything the schema and its resolvers need to know about the container.
#[derive(Debug, Clone)]
pub struct SchemaSettings {
    partition_key_field: String,
    fields: Vec<FieldConfig>,
    timezone: Tz,
    introspection: bool,
}

impl SchemaSettings {
    /// Validates the partition key field and the configured domain fields. A leading `/`
    /// on the partition key field is accepted, as Cosmos DB partition key paths carry one.
    pub fn new(partition_key_field: &str, schema: &SchemaConfig) -> Result<Self, SchemaError> {
        let partition_key_field = partition_key_field.trim_start_matches('/').to_string();
        validate_name(&partition_key_field)?;

        let mut seen = HashSet::new();
        let mut fields = Vec::with_capacity(schema.fields.len());

        for field in &schema.fields {
            validate_name(&field.name)?;

            // the partition key field is always exposed and filtered through `partitionKeyValue`
            let reserved = CONTAINER_FIELDS
                .iter()
                .chain(QUERY_ARGUMENTS.iter())
                .chain(UPSERT_RESULT_FIELDS.iter())
                .any(|name| *name == field.name);

            if reserved || field.name == partition_key_field {
                return Err(SchemaError::ReservedName(field.name.clone()));
            }

            if !seen.insert(field.name.as_str()) {
                return Err(SchemaError::DuplicateField(field.name.clone()));
            }

            fields.push(field.clone());
        }

        let timezone = match schema.timezone.as_deref() {
            Some(name) => parse_timezone(name)?,
            None => chrono_tz::UTC,
        };

        Ok(Self {
            partition_key_field,
            fields,
            timezone,
            introspection: true,
        })
    }

    #[must_use]
    pub fn with_introspection(mut self, introspection: bool) -> Self {
        self.introspection = introspection;
        self
    }

    pub fn partition_key_field(&self) -> &str {
        &self.partition_key_field
    }

    /// The partition key field, unless it is `id` and therefore already part of the type.
    pub(crate) fn exposed_partition_key_field(&self) -> Option<&str> {
        Some(self.partition_key_field.as_str()).filter(|field| !CONTAINER_FIELDS.contains(field))
    }

    pub fn fields(&self) -> &[FieldConfig] {
        &self.fields
    }

    pub fn filter_fields(&self) -> impl Iterator<Item = &FieldConfig> {
        self.fields.iter().filter(|field| field.filter)
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &FieldConfig> {
        self.fields.iter().filter(|field| field.required)
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn introspection(&self) -> bool {
        self.introspection
    }
}

pub(crate) fn parse_timezone(name: &str) -> Result<Tz, SchemaError> {
    name.parse().map_err(|_| SchemaError::UnknownTimezone(name.to_string()))
}

fn validate_name(name: &str) -> Result<(), SchemaError> {
    let mut chars = name.chars();

    let valid = chars
        .next()
        .is_some_and(|first| first == '_' || first.is_ascii_alphabetic())
        && chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
        && !name.starts_with("__");

    if valid {
        Ok(())
    } else {
        Err(SchemaError::InvalidName(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gateway_config::FieldType;

    fn field(name: &str) -> FieldConfig {
        FieldConfig {
            name: name.to_string(),
            r#type: FieldType::String,
            required: false,
            filter: false,
        }
    }

    fn schema(fields: Vec<FieldConfig>) -> SchemaConfig {
        SchemaConfig { timezone: None, fields }
    }

    #[test]
    fn defaults() {
        let settings = SchemaSettings::new("partition_key", &SchemaConfig::default()).unwrap();

        assert_eq!(settings.partition_key_field(), "partition_key");
        assert_eq!(settings.exposed_partition_key_field(), Some("partition_key"));
        assert_eq!(settings.timezone(), chrono_tz::UTC);
        assert_eq!(settings.filter_fields().count(), 1);
        assert_eq!(settings.required_fields().next().map(|f| f.name.as_str()), Some("address"));
        assert!(settings.introspection());
    }

    #[test]
    fn partition_key_path() {
        let settings = SchemaSettings::new("/city", &SchemaConfig::default()).unwrap();
        assert_eq!(settings.partition_key_field(), "city");

        let settings = SchemaSettings::new("/id", &SchemaConfig::default()).unwrap();
        assert_eq!(settings.exposed_partition_key_field(), None);
    }

    #[test]
    fn invalid_names() {
        let error = SchemaSettings::new("/address/city", &SchemaConfig::default()).unwrap_err();
        insta::assert_snapshot!(error, @"`address/city` is not a valid GraphQL name");

        let error = SchemaSettings::new("city", &schema(vec![field("2floors")])).unwrap_err();
        insta::assert_snapshot!(error, @"`2floors` is not a valid GraphQL name");

        let error = SchemaSettings::new("city", &schema(vec![field("__typename")])).unwrap_err();
        assert_eq!(error, SchemaError::InvalidName("__typename".into()));
    }

    #[test]
    fn reserved_names() {
        let error = SchemaSettings::new("city", &schema(vec![field("timestamp")])).unwrap_err();
        insta::assert_snapshot!(error, @"`timestamp` clashes with a built-in field or argument of the schema");

        let error = SchemaSettings::new("city", &schema(vec![field("maxItemCount")])).unwrap_err();
        assert_eq!(error, SchemaError::ReservedName("maxItemCount".into()));

        let error = SchemaSettings::new("city", &schema(vec![field("city")])).unwrap_err();
        assert_eq!(error, SchemaError::ReservedName("city".into()));
    }

    #[test]
    fn duplicates() {
        let error = SchemaSettings::new("city", &schema(vec![field("address"), field("address")])).unwrap_err();
        insta::assert_snapshot!(error, @"field `address` is configured more than once");
    }

    #[test]
    fn timezone() {
        let config = SchemaConfig {
            timezone: Some("Europe/Amsterdam".into()),
            ..Default::default()
        };
        let settings = SchemaSettings::new("city", &config).unwrap();
        assert_eq!(settings.timezone(), chrono_tz::Europe::Amsterdam);

        let config = SchemaConfig {
            timezone: Some("Mars/Olympus_Mons".into()),
            ..Default::default()
        };
        let error = SchemaSettings::new("city", &config).unwrap_err();
        insta::assert_snapshot!(error, @"unknown timezone `Mars/Olympus_Mons`");
    }
}
