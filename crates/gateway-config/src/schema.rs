use std::fmt;

#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchemaConfig {
    /// IANA timezone the `timestamp` field is rendered in when the query does not ask
    /// for one. UTC if not set.
    pub timezone: Option<String>,
    /// Domain fields of the documents, exposed on the `Container` type and accepted by
    /// the upsert mutation.
    pub fields: Vec<FieldConfig>,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            timezone: None,
            fields: vec![FieldConfig {
                name: "address".to_string(),
                r#type: FieldType::String,
                required: true,
                filter: true,
            }],
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldConfig {
    /// Name of the document field, also used as the GraphQL field and argument name
    pub name: String,
    /// GraphQL type of the field. Default: `String`. The partition key field cannot be
    /// configured here and is always a `String`.
    #[serde(default)]
    pub r#type: FieldType,
    /// Upserts without this field fail validation
    #[serde(default)]
    pub required: bool,
    /// The field becomes an argument of the `container` query, matched by equality
    #[serde(default)]
    pub filter: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Deserialize)]
#[allow(clippy::upper_case_acronyms)]
pub enum FieldType {
    #[default]
    String,
    Int,
    Float,
    Boolean,
    ID,
    /// Any JSON value
    JSON,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "String",
            FieldType::Int => "Int",
            FieldType::Float => "Float",
            FieldType::Boolean => "Boolean",
            FieldType::ID => "ID",
            FieldType::JSON => "JSON",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
