mod cosmos;
mod memory;

pub use cosmos::{CosmosStore, CosmosStoreConfig};
pub use memory::{InMemoryStore, StoreCall};
