use runtime::store::{Document, Filter, PageRequest, StoreError, ID_FIELD};
use serde_json::Value;

use crate::session::OperationSession;

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Item with id '{id}' and partition key '{partition_key}' not found.")]
    NotFound { id: String, partition_key: String },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Arguments of the `container` query. Empty strings are treated as absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryArguments {
    pub id: Option<String>,
    pub partition_key: Option<String>,
    /// Values of the filterable fields that were supplied, in schema order.
    pub filters: Vec<(String, Value)>,
    pub max_item_count: Option<u32>,
    pub continuation: Option<String>,
}

/// How a `container` query is served.
#[derive(Debug, PartialEq)]
pub enum Strategy<'a> {
    /// Both the id and the partition key are known.
    PointRead { id: &'a str, partition_key: &'a str },
    /// Nothing to filter on: the first page of the container.
    ReadAll,
    /// Documents matching any of the supplied values, in one partition or across all of them.
    Query {
        filter: Filter,
        partition_key: Option<&'a str>,
    },
}

impl QueryArguments {
    pub fn strategy(&self) -> Strategy<'_> {
        let id = non_empty(&self.id);
        let partition_key = non_empty(&self.partition_key);

        if let (Some(id), Some(partition_key)) = (id, partition_key) {
            return Strategy::PointRead { id, partition_key };
        }

        let filters = self.filters.iter().filter(|(_, value)| is_present(value));

        if id.is_none() && filters.clone().next().is_none() {
            return Strategy::ReadAll;
        }

        let mut filter = Filter::new();

        if let Some(id) = id {
            filter = filter.or_equals(ID_FIELD, id);
        }

        for (field, value) in filters {
            filter = filter.or_equals(field.as_str(), value.clone());
        }

        Strategy::Query { filter, partition_key }
    }

    fn page(&self) -> PageRequest<'_> {
        PageRequest {
            max_item_count: self.max_item_count,
            continuation: non_empty(&self.continuation),
        }
    }
}

/// Runs the `container` query against the store.
pub async fn dispatch(session: &OperationSession, arguments: &QueryArguments) -> Result<Vec<Document>, DispatchError> {
    match arguments.strategy() {
        Strategy::PointRead { id, partition_key } => match session.read_item(id, partition_key).await? {
            Some(document) => Ok(vec![document]),
            None => Err(DispatchError::NotFound {
                id: id.to_string(),
                partition_key: partition_key.to_string(),
            }),
        },
        Strategy::ReadAll => Ok(session.read_all_items(arguments.page()).await?),
        Strategy::Query { filter, partition_key } => {
            Ok(session.query_items(&filter, partition_key, arguments.page()).await?)
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|value| !value.is_empty())
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(value) => !value.is_empty(),
        _ => true,
    }
}
