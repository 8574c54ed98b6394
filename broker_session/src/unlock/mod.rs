mod config;
mod errors;
mod gate;
mod haptics;
mod types;

pub use config::UnlockConfig;
pub use errors::UnlockError;
pub use gate::UnlockGate;
pub use haptics::{Haptics, NoHaptics};
pub use types::{GateMode, GateStatus, PinError};
