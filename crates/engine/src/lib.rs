//! GraphQL over a single partitioned document container.
//!
//! The schema is built at startup from [SchemaSettings]: a `Container` type exposing the
//! configured document fields, a `container` query dispatched to point reads, scans or
//! filtered queries, and an upsert mutation. Every operation runs with its own
//! [OperationSession], which forwards the store session token between calls and
//! accumulates what the store reports so the envelope can expose it.

mod dispatch;
mod envelope;
mod mutation;
mod resolvers;
mod schema;
mod session;
mod settings;

pub use dispatch::{DispatchError, QueryArguments, Strategy};
pub use envelope::{Engine, OperationResponse};
pub use mutation::{UpsertOutcome, ValidationFailure};
pub use session::{OperationMetadata, OperationSession};
pub use settings::{SchemaError, SchemaSettings};
