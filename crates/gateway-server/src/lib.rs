//! The HTTP side of the gateway: a GraphQL endpoint over one document container, the
//! GraphiQL explorer and a health check.

mod error;
mod router;
mod server;
mod state;
mod store;

pub use error::Error;
pub use router::router;
pub use server::{serve, ServeConfig};
pub use store::build_store;

pub type Result<T> = std::result::Result<T, Error>;
