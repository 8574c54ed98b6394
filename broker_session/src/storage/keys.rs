//! Fixed keys of the persisted state layout. Every value is a flat string.

pub const ACCESS_TOKEN_KEY: &str = "max_app_access_token";
pub const REFRESH_TOKEN_KEY: &str = "max_app_refresh_token";
pub const PIN_SECRET_KEY: &str = "max_app_password";
/// Remaining PIN attempts, kept across gate instances until a PIN is created or verified
pub const PIN_ATTEMPTS_KEY: &str = "max_app_pin_attempts_left";
pub const BIOMETRIC_CREDENTIAL_KEY: &str = "max_biometric_credential_id";
pub const BIOMETRIC_ENABLED_KEY: &str = "max_biometric_enabled";
pub const LAST_PORTFOLIO_KEY: &str = "MAX_APP_SELECTED_PORTFOLIO";
