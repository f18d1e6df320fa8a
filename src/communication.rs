use crate::registry::AlarmId;
use crate::sound::SoundSource;

/// channel id the countdown timer rings on; registry ids start at 1
pub const TIMER_CHANNEL: AlarmId = 0;

/// one instruction to the audio worker thread
#[derive(Debug)]
pub struct Message {
    pub kind: MessageType,
    pub alarm_id: AlarmId,
}

impl Message {
    #[must_use]
    pub const fn new(kind: MessageType, alarm_id: AlarmId) -> Self {
        Self { kind, alarm_id }
    }
}

#[derive(Debug, Clone)]
pub enum MessageType {
    /// start looping the sound at the given volume (0.0..=1.0)
    Ring { source: SoundSource, volume: f32 },
    // sent on dismiss, or when the ringing alarm is disabled/removed
    Stop,
}
