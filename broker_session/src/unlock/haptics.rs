/// Tactile feedback offered by the host while the PIN pad is used.
pub trait Haptics: Send + Sync + 'static {
    fn digit(&self);
    fn success(&self);
    fn failure(&self);
}

/// For hosts without a vibration motor.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHaptics;

impl Haptics for NoHaptics {
    fn digit(&self) {}
    fn success(&self) {}
    fn failure(&self) {}
}
