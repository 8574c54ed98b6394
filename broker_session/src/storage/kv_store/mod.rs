mod bridge;
mod config;
mod memory;
mod types;

pub use config::{STORAGE_BRIDGE_TIMEOUT, select_store, select_store_with_timeout};
pub use types::{BridgedStore, DeviceStorageBridge, InMemoryStore, KeyValueStore};
