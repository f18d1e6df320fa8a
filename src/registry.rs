use std::{collections::BTreeSet, fmt};

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};

use crate::sound::SoundRef;

/// opaque alarm identifier, unique across the registry.
/// id 0 is reserved for the countdown timer's audio channel, so the registry
/// hands out ids starting at 1.
pub type AlarmId = u64;

#[inline]
#[must_use]
pub const fn always_true() -> bool {
    true
}

#[must_use]
pub const fn default_volume() -> f32 {
    1.0
}

/// when an alarm repeats. explicit day sets use 0 = Sunday .. 6 = Saturday.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Repeat {
    #[default]
    Once,
    Daily,
    Weekdays,
    Days(BTreeSet<u8>),
}

impl Repeat {
    #[must_use]
    pub fn matches(&self, weekday: Weekday) -> bool {
        match self {
            Self::Once | Self::Daily => true,
            Self::Weekdays => !matches!(weekday, Weekday::Sat | Weekday::Sun),
            Self::Days(days) => days.contains(&(weekday.num_days_from_sunday() as u8)),
        }
    }
}

impl fmt::Display for Repeat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const DAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
        match self {
            Self::Once => write!(f, "once"),
            Self::Daily => write!(f, "daily"),
            Self::Weekdays => write!(f, "weekdays"),
            Self::Days(days) => {
                let names: Vec<&str> = days
                    .iter()
                    .filter_map(|day| DAY_NAMES.get(usize::from(*day)).copied())
                    .collect();
                write!(f, "{}", names.join(", "))
            }
        }
    }
}

/// one alarm definition. the whole set is persisted as a json array after
/// every mutation, so everything but the runtime `triggered` flag defaults
/// sensibly when an older blob is missing a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alarm {
    pub id: AlarmId,
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub repeat: Repeat,
    #[serde(default)]
    pub sound: SoundRef,
    #[serde(default = "default_volume")]
    pub volume: f32,
    #[serde(default = "always_true")]
    pub enabled: bool,
    #[serde(default)]
    pub triggered: bool,
}

/// the user-supplied fields of an alarm; the registry owns id and flags
#[derive(Debug, Clone, PartialEq)]
pub struct AlarmDraft {
    pub time: NaiveTime,
    pub label: String,
    pub repeat: Repeat,
    pub sound: SoundRef,
    pub volume: f32,
}

impl From<&Alarm> for AlarmDraft {
    fn from(alarm: &Alarm) -> Self {
        Self {
            time: alarm.time,
            label: alarm.label.clone(),
            repeat: alarm.repeat.clone(),
            sound: alarm.sound.clone(),
            volume: alarm.volume,
        }
    }
}

/// what one matcher pass did: which alarm (if any) newly took the
/// presentation slot, and whether any alarm state changed (so the caller
/// knows to persist)
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickOutcome {
    pub presented: Option<AlarmId>,
    pub changed: bool,
}

/// the alarm set plus the single presentation slot.
///
/// `tick` is the matcher: called once per second with local wall-clock time.
/// clock jumps (dst, manual edits) can skip a minute or re-enter one after
/// `triggered` was cleared by another mutation; both are accepted limitations
/// of minute-equality polling.
#[derive(Debug)]
pub struct Registry {
    alarms: Vec<Alarm>,
    next_id: AlarmId,
    presenting: Option<AlarmId>,
    last_day: Option<NaiveDate>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            alarms: Vec::new(),
            next_id: 1,
            presenting: None,
            last_day: None,
        }
    }

    /// rebuild from a persisted alarm list, continuing the id sequence.
    /// a load is a new session: stale `triggered` flags on repeating alarms
    /// (possibly set days ago) are cleared so today's occurrence still fires.
    /// fired `Once` alarms stay as they were, disabled until re-toggled.
    #[must_use]
    pub fn from_alarms(mut alarms: Vec<Alarm>) -> Self {
        for alarm in &mut alarms {
            if alarm.repeat != Repeat::Once {
                alarm.triggered = false;
            }
        }
        let next_id = alarms.iter().map(|a| a.id).max().map_or(1, |max| max + 1);
        Self {
            alarms,
            next_id,
            presenting: None,
            last_day: None,
        }
    }

    #[must_use]
    pub fn alarms(&self) -> &[Alarm] {
        &self.alarms
    }

    #[must_use]
    pub fn get(&self, id: AlarmId) -> Option<&Alarm> {
        self.alarms.iter().find(|a| a.id == id)
    }

    /// the alarm currently holding the presentation surface, if any
    #[must_use]
    pub fn presenting(&self) -> Option<&Alarm> {
        self.presenting.and_then(|id| self.get(id))
    }

    fn fresh_id(&mut self) -> AlarmId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// insert a new alarm, enabled and not yet triggered. duplicate times are
    /// allowed.
    pub fn add(&mut self, draft: AlarmDraft) -> AlarmId {
        let id = self.fresh_id();
        self.alarms.push(Alarm {
            id,
            time: draft.time,
            label: draft.label,
            repeat: draft.repeat,
            sound: draft.sound,
            volume: draft.volume,
            enabled: true,
            triggered: false,
        });
        id
    }

    /// flip `enabled` and clear `triggered`, so a disabled-then-reenabled
    /// alarm can fire again the same day. no-op on an unknown id.
    pub fn toggle(&mut self, id: AlarmId) -> bool {
        match self.alarms.iter_mut().find(|a| a.id == id) {
            Some(alarm) => {
                alarm.enabled = !alarm.enabled;
                alarm.triggered = false;
                true
            }
            None => false,
        }
    }

    /// delete an alarm, freeing the presentation slot if it held it. no-op on
    /// an unknown id.
    pub fn remove(&mut self, id: AlarmId) -> bool {
        let before = self.alarms.len();
        self.alarms.retain(|a| a.id != id);
        let removed = self.alarms.len() != before;
        if removed && self.presenting == Some(id) {
            self.presenting = None;
        }
        removed
    }

    /// remove then re-add: the edited alarm gets a new id
    pub fn edit(&mut self, id: AlarmId, draft: AlarmDraft) -> Option<AlarmId> {
        if !self.remove(id) {
            return None;
        }
        Some(self.add(draft))
    }

    /// one matcher pass. every due alarm is marked `triggered` (a due `Once`
    /// alarm is also disabled, not deleted); only the first due alarm is
    /// presented, and only if the slot is free. on a day rollover the
    /// `triggered` flag is cleared on repeating alarms so they fire again on
    /// their next eligible day.
    pub fn tick(&mut self, now: NaiveDateTime) -> TickOutcome {
        let mut outcome = TickOutcome::default();
        if self.last_day != Some(now.date()) {
            if self.last_day.is_some() {
                for alarm in &mut self.alarms {
                    if alarm.repeat != Repeat::Once && alarm.triggered {
                        alarm.triggered = false;
                        outcome.changed = true;
                    }
                }
            }
            self.last_day = Some(now.date());
        }

        let weekday = now.weekday();
        for alarm in &mut self.alarms {
            let due = alarm.enabled
                && !alarm.triggered
                && alarm.time.hour() == now.hour()
                && alarm.time.minute() == now.minute()
                && alarm.repeat.matches(weekday);
            if !due {
                continue;
            }
            alarm.triggered = true;
            if alarm.repeat == Repeat::Once {
                alarm.enabled = false;
            }
            outcome.changed = true;
            if self.presenting.is_none() {
                self.presenting = Some(alarm.id);
                outcome.presented = Some(alarm.id);
            }
        }
        outcome
    }

    /// create a one-shot alarm `offset_minutes` from now (wrapping past
    /// midnight), copying label, sound, and volume from the original. the
    /// original alarm is left untouched. `None` if the original was deleted
    /// while ringing.
    pub fn snooze(
        &mut self,
        id: AlarmId,
        now: NaiveDateTime,
        offset_minutes: u32,
    ) -> Option<AlarmId> {
        let original = self.get(id)?;
        let at = (now + chrono::Duration::minutes(i64::from(offset_minutes))).time();
        let draft = AlarmDraft {
            time: NaiveTime::from_hms_opt(at.hour(), at.minute(), 0)?,
            label: original.label.clone(),
            repeat: Repeat::Once,
            sound: original.sound.clone(),
            volume: original.volume,
        };
        Some(self.add(draft))
    }

    /// free the presentation slot. alarm state stays as `tick` left it; the
    /// caller stops audio and haptics.
    pub fn dismiss(&mut self) {
        self.presenting = None;
    }
}

/// alarm times persist as "HH:MM", matching the minute resolution the matcher
/// works at
mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let text = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&text, FORMAT).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sound::{SoundRef, SoundSource, Tone};

    fn draft(time: &str) -> AlarmDraft {
        AlarmDraft {
            time: NaiveTime::parse_from_str(time, "%H:%M").unwrap(),
            label: "wake up".to_string(),
            repeat: Repeat::Once,
            sound: SoundRef::default(),
            volume: 0.8,
        }
    }

    fn at(date: (i32, u32, u32), time: &str) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(date.0, date.1, date.2)
            .unwrap()
            .and_time(NaiveTime::parse_from_str(time, "%H:%M:%S").unwrap())
    }

    // 2026-08-03 is a Monday
    const MONDAY: (i32, u32, u32) = (2026, 8, 3);
    const SATURDAY: (i32, u32, u32) = (2026, 8, 8);
    const SUNDAY: (i32, u32, u32) = (2026, 8, 9);

    #[test]
    fn once_fires_once_then_disables() {
        let mut registry = Registry::new();
        let id = registry.add(draft("08:00"));

        let outcome = registry.tick(at(MONDAY, "08:00:00"));
        assert_eq!(outcome.presented, Some(id));
        assert!(outcome.changed);
        let alarm = registry.get(id).unwrap();
        assert!(!alarm.enabled);
        assert!(alarm.triggered);

        registry.dismiss();
        // same minute, next day, even next week: never again without a toggle
        assert_eq!(registry.tick(at(MONDAY, "08:00:01")).presented, None);
        assert_eq!(registry.tick(at((2026, 8, 4), "08:00:00")).presented, None);
    }

    #[test]
    fn daily_fires_again_after_rollover() {
        let mut registry = Registry::new();
        let mut d = draft("07:30");
        d.repeat = Repeat::Daily;
        let id = registry.add(d);

        assert_eq!(registry.tick(at(MONDAY, "07:30:00")).presented, Some(id));
        registry.dismiss();
        // still triggered for the rest of the day
        assert_eq!(registry.tick(at(MONDAY, "07:30:30")).presented, None);
        assert!(registry.get(id).unwrap().enabled);
        // next day the rollover clears `triggered` and it fires again
        assert_eq!(
            registry.tick(at((2026, 8, 4), "07:30:00")).presented,
            Some(id)
        );
    }

    #[test]
    fn weekdays_never_fire_on_weekends() {
        let mut registry = Registry::new();
        let mut d = draft("09:00");
        d.repeat = Repeat::Weekdays;
        let id = registry.add(d);

        assert_eq!(registry.tick(at(SATURDAY, "09:00:00")).presented, None);
        assert_eq!(registry.tick(at(SUNDAY, "09:00:00")).presented, None);
        assert!(!registry.get(id).unwrap().triggered);
        assert_eq!(registry.tick(at(MONDAY, "09:00:00")).presented, Some(id));
    }

    #[test]
    fn explicit_day_set_fires_only_on_listed_days() {
        let mut registry = Registry::new();
        let mut d = draft("10:00");
        // 0 = Sunday, 6 = Saturday
        d.repeat = Repeat::Days([0, 6].into_iter().collect());
        let id = registry.add(d);

        assert_eq!(registry.tick(at(MONDAY, "10:00:00")).presented, None);
        assert_eq!(registry.tick(at(SATURDAY, "10:00:00")).presented, Some(id));
        registry.dismiss();
        assert_eq!(registry.tick(at(SUNDAY, "10:00:00")).presented, Some(id));
    }

    #[test]
    fn toggle_twice_restores_enabled_and_clears_triggered() {
        let mut registry = Registry::new();
        let id = registry.add(draft("08:00"));
        registry.tick(at(MONDAY, "08:00:00"));
        registry.dismiss();
        assert!(registry.get(id).unwrap().triggered);

        assert!(registry.toggle(id));
        assert!(registry.toggle(id));
        let alarm = registry.get(id).unwrap();
        // the once alarm was auto-disabled by firing; two toggles return it
        // to that state but the triggered flag is gone
        assert!(!alarm.enabled);
        assert!(!alarm.triggered);

        // re-enable: it may fire again the same day
        assert!(registry.toggle(id));
        assert_eq!(registry.tick(at(MONDAY, "08:00:05")).presented, Some(id));
    }

    #[test]
    fn toggle_and_remove_unknown_id_are_noops() {
        let mut registry = Registry::new();
        registry.add(draft("08:00"));
        assert!(!registry.toggle(999));
        assert!(!registry.remove(999));
        assert_eq!(registry.alarms().len(), 1);
    }

    #[test]
    fn edit_assigns_a_new_id() {
        let mut registry = Registry::new();
        let id = registry.add(draft("08:00"));
        let new_id = registry.edit(id, draft("08:15")).unwrap();
        assert_ne!(id, new_id);
        assert!(registry.get(id).is_none());
        assert_eq!(
            registry.get(new_id).unwrap().time,
            NaiveTime::from_hms_opt(8, 15, 0).unwrap()
        );
        assert_eq!(registry.edit(id, draft("09:00")), None);
    }

    #[test]
    fn snooze_creates_one_shot_copy_offset_from_now() {
        let mut registry = Registry::new();
        let mut d = draft("22:00");
        d.repeat = Repeat::Daily;
        d.sound = SoundRef {
            name: "Soft Chime".to_string(),
            source: SoundSource::Builtin(Tone::SoftChime),
        };
        let id = registry.add(d);
        registry.tick(at(MONDAY, "22:00:00"));

        let snoozed = registry.snooze(id, at(MONDAY, "22:00:10"), 5).unwrap();
        registry.dismiss();

        let copy = registry.get(snoozed).unwrap();
        assert_eq!(copy.time, NaiveTime::from_hms_opt(22, 5, 0).unwrap());
        assert_eq!(copy.repeat, Repeat::Once);
        assert_eq!(copy.label, "wake up");
        assert_eq!(copy.sound.name, "Soft Chime");
        assert!(copy.enabled);
        assert!(!copy.triggered);
        // the original keeps its own state
        let original = registry.get(id).unwrap();
        assert!(original.enabled);
        assert!(original.triggered);
    }

    #[test]
    fn snooze_wraps_past_midnight() {
        let mut registry = Registry::new();
        let id = registry.add(draft("23:58"));
        registry.tick(at(MONDAY, "23:58:00"));
        let snoozed = registry.snooze(id, at(MONDAY, "23:58:30"), 5).unwrap();
        assert_eq!(
            registry.get(snoozed).unwrap().time,
            NaiveTime::from_hms_opt(0, 3, 0).unwrap()
        );
    }

    #[test]
    fn snooze_of_deleted_alarm_is_none() {
        let mut registry = Registry::new();
        let id = registry.add(draft("08:00"));
        registry.tick(at(MONDAY, "08:00:00"));
        registry.remove(id);
        assert_eq!(registry.snooze(id, at(MONDAY, "08:00:10"), 5), None);
    }

    #[test]
    fn only_first_match_takes_the_slot() {
        let mut registry = Registry::new();
        let first = registry.add(draft("08:00"));
        let second = registry.add(draft("08:00"));

        let outcome = registry.tick(at(MONDAY, "08:00:00"));
        assert_eq!(outcome.presented, Some(first));
        // the second alarm still consumed its occurrence
        let second_alarm = registry.get(second).unwrap();
        assert!(second_alarm.triggered);
        assert!(!second_alarm.enabled);
        assert_eq!(registry.presenting().unwrap().id, first);
    }

    #[test]
    fn busy_slot_defers_presentation() {
        let mut registry = Registry::new();
        let first = registry.add(draft("08:00"));
        let mut later = draft("08:01");
        later.repeat = Repeat::Daily;
        let second = registry.add(later);

        assert_eq!(registry.tick(at(MONDAY, "08:00:00")).presented, Some(first));
        // first is still ringing a minute later; second matches silently
        let outcome = registry.tick(at(MONDAY, "08:01:00"));
        assert_eq!(outcome.presented, None);
        assert!(registry.get(second).unwrap().triggered);
        assert!(outcome.changed);
    }

    #[test]
    fn removing_the_ringing_alarm_frees_the_slot() {
        let mut registry = Registry::new();
        let id = registry.add(draft("08:00"));
        registry.tick(at(MONDAY, "08:00:00"));
        assert!(registry.presenting().is_some());
        registry.remove(id);
        assert!(registry.presenting().is_none());
    }

    #[test]
    fn mutations_during_presentation_leave_registry_consistent() {
        let mut registry = Registry::new();
        let ringing = registry.add(draft("08:00"));
        registry.tick(at(MONDAY, "08:00:00"));

        let added = registry.add(draft("12:00"));
        registry.toggle(added);
        registry.toggle(added);
        assert_eq!(registry.presenting().unwrap().id, ringing);
        assert_eq!(registry.alarms().len(), 2);
    }

    #[test]
    fn ids_continue_after_reload() {
        let mut registry = Registry::new();
        registry.add(draft("08:00"));
        let high = registry.add(draft("09:00"));

        let mut reloaded = Registry::from_alarms(registry.alarms().to_vec());
        let fresh = reloaded.add(draft("10:00"));
        assert!(fresh > high);
    }

    #[test]
    fn reload_clears_stale_triggered_on_repeating_alarms() {
        let mut registry = Registry::new();
        let once = registry.add(draft("08:00"));
        let mut d = draft("08:00");
        d.repeat = Repeat::Daily;
        let daily = registry.add(d);
        registry.tick(at(MONDAY, "08:00:00"));

        let reloaded = Registry::from_alarms(registry.alarms().to_vec());
        assert!(!reloaded.get(daily).unwrap().triggered);
        // the fired one-shot stays spent until an explicit toggle
        assert!(reloaded.get(once).unwrap().triggered);
        assert!(!reloaded.get(once).unwrap().enabled);
    }

    #[test]
    fn repeat_display_names_days() {
        assert_eq!(Repeat::Weekdays.to_string(), "weekdays");
        let days: Repeat = Repeat::Days([0, 5].into_iter().collect());
        assert_eq!(days.to_string(), "Sun, Fri");
    }

    #[test]
    fn alarm_round_trips_through_json() {
        let alarm = Alarm {
            id: 7,
            time: NaiveTime::from_hms_opt(6, 45, 0).unwrap(),
            label: "gym".to_string(),
            repeat: Repeat::Days([1, 3, 5].into_iter().collect()),
            sound: SoundRef::default(),
            volume: 0.5,
            enabled: true,
            triggered: true,
        };
        let json = serde_json::to_string(&alarm).unwrap();
        assert!(json.contains("\"06:45\""));
        let back: Alarm = serde_json::from_str(&json).unwrap();
        assert_eq!(back, alarm);
    }
}
