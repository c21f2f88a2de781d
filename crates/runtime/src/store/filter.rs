use serde_json::Value;

use super::Document;

/// A disjunction of equality predicates over top-level document fields.
///
/// An empty filter matches every document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    clauses: Vec<(String, Value)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn or_equals(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.clauses.push((field.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn matches(&self, document: &Document) -> bool {
        self.clauses.is_empty()
            || self
                .clauses
                .iter()
                .any(|(field, value)| document.get(field) == Some(value))
    }

    /// Renders the filter as a parameterized Cosmos SQL query over the alias `c`.
    pub fn to_sql(&self) -> SqlQuery {
        let mut query = String::from("SELECT * FROM c");
        let mut parameters = Vec::with_capacity(self.clauses.len());

        for (i, (field, value)) in self.clauses.iter().enumerate() {
            query.push_str(if i == 0 { " WHERE " } else { " OR " });

            // field names are GraphQL names, they cannot contain quotes
            let name = format!("@{field}");
            query.push_str(&format!("c[\"{field}\"] = {name}"));

            parameters.push(SqlParameter {
                name,
                value: value.clone(),
            });
        }

        SqlQuery { query, parameters }
    }
}

/// The body of a Cosmos query request.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct SqlQuery {
    pub query: String,
    pub parameters: Vec<SqlParameter>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct SqlParameter {
    pub name: String,
    pub value: Value,
}
