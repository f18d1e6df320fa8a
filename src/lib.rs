#![warn(clippy::pedantic, clippy::nursery, clippy::cargo)]
#![deny(clippy::use_self, rust_2018_idioms)]
#![allow(clippy::multiple_crate_versions, clippy::module_name_repetitions)]

use std::path::PathBuf;

use chrono::{NaiveDateTime, Timelike};
use eframe::egui::{
    self, Button, CentralPanel, Context, Grid, Layout, RichText, ScrollArea, Slider,
    TopBottomPanel, Window,
};

use alarm_edit::{AlarmBuilder, EditingState};
use communication::{Message, MessageType, TIMER_CHANNEL};
use config::{Config, Theme};
use haptics::{Haptics, NoHaptics, ALARM_PATTERN, TIMER_PATTERN};
use registry::{AlarmId, Registry};
use sound::{SoundSource, Tone};
use stopwatch::Stopwatch;
use timer::{Countdown, CountdownEvent};

/// implementation of the alarm add/edit form for egui
pub mod alarm_edit;
pub mod clock_view;
pub mod communication;
pub mod config;
pub mod haptics;
/// the alarm registry and matcher
pub mod registry;
pub mod sound;
pub mod store;
pub mod stopwatch;
pub mod timer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Clock,
    Stopwatch,
    Timer,
    Alarm,
}

enum AlarmAction {
    Toggle(AlarmId),
    Remove(AlarmId),
    Edit(AlarmId),
}

pub struct ChimeClock {
    config: Config,
    registry: Registry,
    store_path: PathBuf,
    view: View,
    sender: std::sync::mpsc::Sender<Message>,
    haptics: Box<dyn Haptics>,
    adding_alarm: Option<AlarmBuilder>,
    editing_alarm: Option<(AlarmId, AlarmBuilder)>,
    stopwatch: Stopwatch,
    countdown: Countdown,
    in_settings: bool,
    last_poll: Option<NaiveDateTime>,
}

impl ChimeClock {
    #[must_use]
    pub fn new(sender: std::sync::mpsc::Sender<Message>) -> Self {
        let store_path = store::store_path();
        Self {
            config: Config::load(&Config::config_path()),
            registry: Registry::from_alarms(store::load(&store_path)),
            store_path,
            view: View::default(),
            sender,
            haptics: Box::new(NoHaptics),
            adding_alarm: None,
            editing_alarm: None,
            stopwatch: Stopwatch::default(),
            countdown: Countdown::default(),
            in_settings: false,
            last_poll: None,
        }
    }

    fn save_alarms(&self) {
        if let Err(err) = store::save(&self.store_path, self.registry.alarms()) {
            log::error!("{err}");
        }
    }

    fn save_config(&self) {
        if let Err(err) = self.config.save(&Config::config_path()) {
            log::error!("{err}");
        }
    }

    fn send(&self, message: Message) {
        if let Err(err) = self.sender.send(message) {
            log::error!("audio worker is gone: {err}");
        }
    }

    fn start_ring(&self, id: AlarmId, source: SoundSource, volume: f32, pattern: &[u64]) {
        self.send(Message::new(MessageType::Ring { source, volume }, id));
        self.haptics.vibrate(pattern);
    }

    fn stop_ring(&self, id: AlarmId) {
        self.send(Message::new(MessageType::Stop, id));
        self.haptics.cancel();
    }

    /// one pass of the 1-second poll: run the alarm matcher and advance the
    /// countdown, starting or stopping rings as they report
    fn poll(&mut self, now: NaiveDateTime) {
        let outcome = self.registry.tick(now);
        if let Some(id) = outcome.presented {
            if let Some(alarm) = self.registry.get(id) {
                self.start_ring(id, alarm.sound.source.clone(), alarm.volume, &ALARM_PATTERN);
            }
        }
        if outcome.changed {
            self.save_alarms();
        }

        match self.countdown.tick(now) {
            Some(CountdownEvent::Finished) => self.start_ring(
                TIMER_CHANNEL,
                SoundSource::Builtin(Tone::default()),
                self.config.default_volume,
                &TIMER_PATTERN,
            ),
            Some(CountdownEvent::RingOver) => self.stop_ring(TIMER_CHANNEL),
            None => {}
        }
    }

    fn dismiss_presentation(&mut self) {
        if let Some(id) = self.registry.presenting().map(|alarm| alarm.id) {
            self.registry.dismiss();
            self.stop_ring(id);
        }
    }

    fn snooze_presentation(&mut self, now: NaiveDateTime) {
        if let Some(id) = self.registry.presenting().map(|alarm| alarm.id) {
            if self
                .registry
                .snooze(id, now, self.config.snooze_minutes)
                .is_some()
            {
                self.save_alarms();
            }
            self.registry.dismiss();
            self.stop_ring(id);
        }
    }

    fn render_header(&mut self, ctx: &egui::Context) {
        TopBottomPanel::top("views_and_ctrl").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let theme_btn = ui.add(Button::new({
                    if self.config.theme == Theme::Dark {
                        "🌞"
                    } else {
                        "🌙"
                    }
                }));
                if theme_btn.clicked() {
                    self.config.theme = !self.config.theme;
                    self.save_config();
                }
                for (view, label) in [
                    (View::Clock, "Clock"),
                    (View::Stopwatch, "Stopwatch"),
                    (View::Timer, "Timer"),
                    (View::Alarm, "Alarm"),
                ] {
                    ui.selectable_value(&mut self.view, view, label);
                }
                ui.with_layout(Layout::right_to_left(eframe::emath::Align::Min), |ui| {
                    if ui.button("⚙").on_hover_text("settings").clicked() {
                        self.in_settings = true;
                    }
                });
            });
        });
    }

    fn render_settings(&mut self, ctx: &egui::Context) {
        Window::new("settings ⚙").show(ctx, |ui| {
            let mut changed = false;
            changed |= ui
                .checkbox(&mut self.config.use_24_hour, "24-hour clock")
                .changed();
            changed |= ui
                .add(Slider::new(&mut self.config.snooze_minutes, 1..=30).text("snooze minutes"))
                .changed();
            changed |= ui
                .add(
                    Slider::new(&mut self.config.default_volume, 0.0..=1.0)
                        .text("default volume for new alarms"),
                )
                .changed();
            if changed {
                self.save_config();
            }
            if ui.button("x").clicked() {
                self.in_settings = false;
            }
        });
    }

    fn render_alarm_view(&mut self, ui: &mut egui::Ui) {
        if ui.button("+").on_hover_text("add alarm").clicked() {
            self.adding_alarm = Some(AlarmBuilder::new(self.config.default_volume));
        }

        let mut action = None;
        ScrollArea::vertical().show(ui, |ui| {
            Grid::new("alarms").striped(true).show(ui, |ui| {
                for alarm in self.registry.alarms() {
                    ui.label(
                        RichText::new(alarm.time.format("%H:%M").to_string())
                            .monospace()
                            .size(20.0),
                    );
                    ui.vertical(|ui| {
                        if !alarm.label.is_empty() {
                            ui.label(&alarm.label);
                        }
                        ui.label(format!("{} · {}", alarm.repeat, alarm.sound.name));
                    });
                    if ui
                        .button(if alarm.enabled { "On" } else { "Off" })
                        .clicked()
                    {
                        action = Some(AlarmAction::Toggle(alarm.id));
                    }
                    if ui.button("edit").clicked() {
                        action = Some(AlarmAction::Edit(alarm.id));
                    }
                    if ui.button("x").on_hover_text("delete alarm").clicked() {
                        action = Some(AlarmAction::Remove(alarm.id));
                    }
                    ui.end_row();
                }
            });
        });

        let presenting = self.registry.presenting().map(|alarm| alarm.id);
        match action {
            Some(AlarmAction::Toggle(id)) => {
                // disabling the ringing alarm silences it
                if presenting == Some(id) {
                    self.dismiss_presentation();
                }
                self.registry.toggle(id);
                self.save_alarms();
            }
            Some(AlarmAction::Remove(id)) => {
                if presenting == Some(id) {
                    self.stop_ring(id);
                }
                self.registry.remove(id);
                self.save_alarms();
            }
            Some(AlarmAction::Edit(id)) => {
                if let Some(alarm) = self.registry.get(id) {
                    self.editing_alarm = Some((id, AlarmBuilder::from(alarm)));
                }
            }
            None => {}
        }
    }

    fn render_ringing(&mut self, ctx: &Context, now: NaiveDateTime) {
        let Some(alarm) = self.registry.presenting() else {
            return;
        };
        let title = if alarm.label.is_empty() {
            "Alarm!".to_string()
        } else {
            alarm.label.clone()
        };
        let time = alarm.time;
        let snooze_minutes = self.config.snooze_minutes;

        let mut stop = false;
        let mut snooze = false;
        Window::new("⏰ Alarm").auto_sized().show(ctx, |ui| {
            ui.label(RichText::new(title).strong().size(20.0));
            ui.label(format!("It's {}", time.format("%H:%M")));
            ui.horizontal(|ui| {
                if ui.button("Stop").clicked() {
                    stop = true;
                }
                if ui.button(format!("Snooze +{snooze_minutes} min")).clicked() {
                    snooze = true;
                }
            });
        });
        if snooze {
            self.snooze_presentation(now);
        } else if stop {
            self.dismiss_presentation();
        }
    }

    fn render_editors(&mut self, ctx: &Context) {
        if let Some(editing) = &mut self.adding_alarm {
            match editing.render_alarm_editor(ctx, "add alarm") {
                EditingState::Done(draft) => {
                    self.adding_alarm = None;
                    self.registry.add(draft);
                    self.save_alarms();
                }
                EditingState::Cancelled => {
                    self.adding_alarm = None;
                }
                EditingState::Editing => {}
            }
        }
        if let Some((id, editing)) = &mut self.editing_alarm {
            let id = *id;
            match editing.render_alarm_editor(ctx, "edit alarm") {
                EditingState::Done(draft) => {
                    self.editing_alarm = None;
                    // editing the ringing alarm silences it; the replacement
                    // is a new alarm with a new id
                    if self.registry.presenting().map(|alarm| alarm.id) == Some(id) {
                        self.dismiss_presentation();
                    }
                    self.registry.edit(id, draft);
                    self.save_alarms();
                }
                EditingState::Cancelled => {
                    self.editing_alarm = None;
                }
                EditingState::Editing => {}
            }
        }
    }
}

impl eframe::App for ChimeClock {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // keep repainting so the matcher runs even when the window is idle
        ctx.request_repaint_after(std::time::Duration::from_millis(250));
        let now = chrono::Local::now().naive_local();
        let second = now.with_nanosecond(0).unwrap_or(now);
        if self.last_poll != Some(second) {
            self.last_poll = Some(second);
            self.poll(second);
        }

        ctx.set_visuals(self.config.theme.into());
        if self.in_settings {
            self.render_settings(ctx);
        }
        self.render_editors(ctx);
        self.render_header(ctx);
        self.render_ringing(ctx, second);

        CentralPanel::default().show(ctx, |ui| match self.view {
            View::Clock => {
                if clock_view::render(ui, &mut self.config) {
                    self.save_config();
                }
            }
            View::Stopwatch => self.stopwatch.render(ui),
            View::Timer => {
                if self.countdown.render(ui, ctx, second) {
                    self.stop_ring(TIMER_CHANNEL);
                }
            }
            View::Alarm => self.render_alarm_view(ui),
        });
    }
}
