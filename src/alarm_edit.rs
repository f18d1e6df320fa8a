use std::path::Path;

use chrono::{NaiveTime, Timelike};
use eframe::egui::{self, ComboBox, Slider, TextEdit, Window};

use crate::{
    registry::{Alarm, AlarmDraft, Repeat},
    sound::{SoundRef, Tone},
};

const DAY_LABELS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RepeatChoice {
    Once,
    Daily,
    Weekdays,
    Custom,
}

impl RepeatChoice {
    const fn label(self) -> &'static str {
        match self {
            Self::Once => "Once",
            Self::Daily => "Daily",
            Self::Weekdays => "Weekdays",
            Self::Custom => "Custom days",
        }
    }
}

/// form state for adding or editing an alarm
#[derive(Debug, Clone, PartialEq)]
pub struct AlarmBuilder {
    time_text: String,
    label: String,
    choice: RepeatChoice,
    days: [bool; 7],
    sound: SoundRef,
    volume: f32,
}

impl AlarmBuilder {
    /// a fresh form, seeded with the current time
    #[must_use]
    pub fn new(default_volume: f32) -> Self {
        let now = chrono::Local::now().time();
        Self {
            time_text: format!("{:02}:{:02}", now.hour(), now.minute()),
            label: String::new(),
            choice: RepeatChoice::Once,
            days: [false; 7],
            sound: SoundRef::default(),
            volume: default_volume,
        }
    }

    /// the draft the form currently describes. `None` when the time field is
    /// empty or not "HH:MM"; the form stays open with input intact.
    #[must_use]
    pub fn build(&self) -> Option<AlarmDraft> {
        let time = NaiveTime::parse_from_str(self.time_text.trim(), "%H:%M").ok()?;
        let repeat = match self.choice {
            RepeatChoice::Once => Repeat::Once,
            RepeatChoice::Daily => Repeat::Daily,
            RepeatChoice::Weekdays => Repeat::Weekdays,
            RepeatChoice::Custom => Repeat::Days(
                self.days
                    .iter()
                    .enumerate()
                    .filter(|(_, checked)| **checked)
                    .map(|(day, _)| day as u8)
                    .collect(),
            ),
        };
        Some(AlarmDraft {
            time,
            label: self.label.trim().to_string(),
            repeat,
            sound: self.sound.clone(),
            volume: self.volume,
        })
    }

    fn edit_fields(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label("Time");
            ui.add(
                TextEdit::singleline(&mut self.time_text)
                    .desired_width(50.0)
                    .char_limit(5)
                    .hint_text("HH:MM"),
            );
        });
        ui.horizontal(|ui| {
            ui.label("Label");
            ui.text_edit_singleline(&mut self.label);
        });
        self.render_repeat_selector(ui);
        self.render_sound_selector(ui);
        self.render_volume_slider(ui);
    }

    fn render_repeat_selector(&mut self, ui: &mut egui::Ui) {
        ComboBox::from_label("repeat")
            .selected_text(self.choice.label())
            .show_ui(ui, |ui| {
                for choice in [
                    RepeatChoice::Once,
                    RepeatChoice::Daily,
                    RepeatChoice::Weekdays,
                    RepeatChoice::Custom,
                ] {
                    ui.selectable_value(&mut self.choice, choice, choice.label());
                }
            });
        if self.choice == RepeatChoice::Custom {
            ui.horizontal(|ui| {
                for (day, label) in DAY_LABELS.iter().enumerate() {
                    ui.checkbox(&mut self.days[day], *label);
                }
            });
        }
    }

    fn render_sound_selector(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label("Sound");
            ComboBox::from_id_salt("alarm_sound")
                .selected_text(self.sound.name.clone())
                .show_ui(ui, |ui| {
                    for tone in Tone::ALL {
                        ui.selectable_value(&mut self.sound, SoundRef::builtin(tone), tone.name());
                    }
                });
            if ui.button("Custom…").clicked() {
                // TODO: rfd with gnome opens Recents not audio folder https://github.com/PolyMeilex/rfd/issues/237
                let file_dialog = rfd::FileDialog::new().set_title("Pick alarm sound");
                let file_dialog = match directories::UserDirs::new()
                    .and_then(|u| u.audio_dir().map(Path::to_path_buf))
                {
                    Some(audio_path) => file_dialog.set_directory(audio_path),
                    None => file_dialog,
                };
                if let Some(path) = file_dialog.pick_file() {
                    self.sound = SoundRef::from_file(path);
                }
            }
        });
    }

    fn render_volume_slider(&mut self, ui: &mut egui::Ui) {
        ui.add(Slider::new(&mut self.volume, 0.0..=1.0).text("volume"));
    }

    pub fn render_alarm_editor(&mut self, ctx: &egui::Context, title: &str) -> EditingState {
        let mut ret = EditingState::Editing;
        Window::new(title).auto_sized().show(ctx, |ui| {
            self.edit_fields(ui);
            ui.horizontal(|ui| {
                if ui.button("done").clicked() {
                    // an unparsable time keeps the form open, input intact
                    if let Some(draft) = self.build() {
                        ret = EditingState::Done(draft);
                    }
                } else if ui.button("cancel").clicked() {
                    ret = EditingState::Cancelled;
                }
            });
        });
        ret
    }
}

impl From<&Alarm> for AlarmBuilder {
    /// prefill the form for editing, so a 17:00 alarm shows 17:00
    fn from(alarm: &Alarm) -> Self {
        let (choice, days) = match &alarm.repeat {
            Repeat::Once => (RepeatChoice::Once, [false; 7]),
            Repeat::Daily => (RepeatChoice::Daily, [false; 7]),
            Repeat::Weekdays => (RepeatChoice::Weekdays, [false; 7]),
            Repeat::Days(set) => {
                let mut days = [false; 7];
                for day in set {
                    if let Some(slot) = days.get_mut(usize::from(*day)) {
                        *slot = true;
                    }
                }
                (RepeatChoice::Custom, days)
            }
        };
        Self {
            time_text: format!("{:02}:{:02}", alarm.time.hour(), alarm.time.minute()),
            label: alarm.label.clone(),
            choice,
            days,
            sound: alarm.sound.clone(),
            volume: alarm.volume,
        }
    }
}

pub enum EditingState {
    Cancelled,
    Editing,
    Done(AlarmDraft),
}
