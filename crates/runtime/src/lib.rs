pub mod store;

pub use store::{Document, DocumentStore, DocumentStoreInner, StoreError, StoreResponse, StoreResult};
