use std::env;
use std::sync::LazyLock;
use std::time::Duration;

use url::Url;

use crate::config::BROKER_SSO_CALLBACK_URL;

/// Seconds the platform prompt may stay open.
pub static BIOMETRIC_TIMEOUT: LazyLock<u32> = LazyLock::new(|| {
    env::var("BIOMETRIC_TIMEOUT")
        .map(|v| v.parse::<u32>().unwrap_or(60))
        .unwrap_or(60)
});

/// Relying party id. Defaults to the host the app is served from.
pub static BIOMETRIC_RP_ID: LazyLock<String> = LazyLock::new(|| {
    env::var("BIOMETRIC_RP_ID").unwrap_or_else(|_| {
        Url::parse(&BROKER_SSO_CALLBACK_URL)
            .ok()
            .and_then(|url| url.host_str().map(str::to_string))
            .unwrap_or_else(|| "localhost".to_string())
    })
});

pub static BIOMETRIC_RP_NAME: LazyLock<String> = LazyLock::new(|| {
    env::var("BIOMETRIC_RP_NAME").unwrap_or_else(|_| "Max Mini App".to_string())
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BiometricConfig {
    pub rp_id: String,
    pub rp_name: String,
    pub timeout: Duration,
}

impl Default for BiometricConfig {
    fn default() -> Self {
        Self {
            rp_id: BIOMETRIC_RP_ID.clone(),
            rp_name: BIOMETRIC_RP_NAME.clone(),
            timeout: Duration::from_secs(u64::from(*BIOMETRIC_TIMEOUT)),
        }
    }
}
