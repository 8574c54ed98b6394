use std::sync::{Arc, LazyLock};
use std::{env, time::Duration};

use super::types::{BridgedStore, DeviceStorageBridge, InMemoryStore, KeyValueStore};

/// Upper bound for every call into the host device-storage bridge.
pub static STORAGE_BRIDGE_TIMEOUT: LazyLock<Duration> = LazyLock::new(|| {
    let millis = env::var("STORAGE_BRIDGE_TIMEOUT_MS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(100);
    Duration::from_millis(millis)
});

/// Picks the storage backend once at startup.
///
/// With a host bridge the bridged store is used; without one the in-memory store is the
/// sole backend.
pub fn select_store(bridge: Option<Arc<dyn DeviceStorageBridge>>) -> Arc<dyn KeyValueStore> {
    select_store_with_timeout(bridge, *STORAGE_BRIDGE_TIMEOUT)
}

pub fn select_store_with_timeout(
    bridge: Option<Arc<dyn DeviceStorageBridge>>,
    timeout: Duration,
) -> Arc<dyn KeyValueStore> {
    match bridge {
        Some(bridge) => {
            tracing::info!("Device storage bridge present, using bridged store");
            Arc::new(BridgedStore::new(bridge, timeout))
        }
        None => {
            tracing::info!("No device storage bridge, using in-memory store");
            Arc::new(InMemoryStore::new())
        }
    }
}
