use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GateMode {
    /// No PIN stored yet; the first complete entry becomes the PIN
    Create,
    Verify,
}

/// User-visible PIN error. Biometric failures never produce one.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize)]
pub enum PinError {
    #[error("Incorrect PIN. Attempts left: {remaining_attempts}")]
    Mismatch { remaining_attempts: u32 },
}

/// Snapshot of the gate for rendering. Never carries the digits themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GateStatus {
    pub mode: GateMode,
    /// Number of digits entered so far
    pub entered: usize,
    pub pin_length: usize,
    pub error: Option<PinError>,
    pub remaining_attempts: u32,
    pub unlocked: bool,
    /// The attempt budget ran out and the session was torn down
    pub logged_out: bool,
}
