mod errors;
mod keys;
mod kv_store;
mod preferences;

pub use errors::StorageError;
pub use keys::{
    ACCESS_TOKEN_KEY, BIOMETRIC_CREDENTIAL_KEY, BIOMETRIC_ENABLED_KEY, LAST_PORTFOLIO_KEY,
    PIN_ATTEMPTS_KEY, PIN_SECRET_KEY, REFRESH_TOKEN_KEY,
};
pub use kv_store::{
    BridgedStore, DeviceStorageBridge, InMemoryStore, KeyValueStore, STORAGE_BRIDGE_TIMEOUT,
    select_store, select_store_with_timeout,
};
pub use preferences::PortfolioPreference;
