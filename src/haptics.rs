//! the haptic side of the presentation surface

/// three-phase vibration patterns, on/off/on milliseconds
pub const ALARM_PATTERN: [u64; 3] = [500, 300, 500];
pub const TIMER_PATTERN: [u64; 3] = [300, 100, 300];

pub trait Haptics {
    /// request a vibration pattern; must not fail where vibration is
    /// unsupported
    fn vibrate(&self, pattern: &[u64]);
    /// cancel any ongoing vibration
    fn cancel(&self);
}

/// desktops have no vibration motor, so requests are a logged no-op
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHaptics;

impl Haptics for NoHaptics {
    fn vibrate(&self, pattern: &[u64]) {
        log::debug!("vibration {pattern:?}ms requested, not supported on this platform");
    }

    fn cancel(&self) {
        log::debug!("vibration cancel requested, not supported on this platform");
    }
}
