use std::env;
use std::sync::LazyLock;

pub const PIN_LENGTH: usize = 4;

/// Wrong PIN entries allowed before the session is torn down.
pub static UNLOCK_MAX_ATTEMPTS: LazyLock<u32> = LazyLock::new(|| {
    env::var("UNLOCK_MAX_ATTEMPTS")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(10)
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnlockConfig {
    pub pin_length: usize,
    pub max_attempts: u32,
    /// Offer biometric enrollment right after a PIN is created
    pub offer_biometric_enrollment: bool,
}

impl Default for UnlockConfig {
    fn default() -> Self {
        Self {
            pin_length: PIN_LENGTH,
            max_attempts: *UNLOCK_MAX_ATTEMPTS,
            offer_biometric_enrollment: true,
        }
    }
}
