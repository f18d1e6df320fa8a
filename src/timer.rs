use chrono::NaiveDateTime;
use eframe::egui::{self, RichText, TextEdit, Window};

/// how long the completion overlay (and its ring) stays up
const OVERLAY_SECONDS: i64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Running { ends_at: NaiveDateTime },
    /// finished; overlay and ring stay until `until`
    Complete { until: NaiveDateTime },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownEvent {
    /// reached zero: ring and show the overlay
    Finished,
    /// the overlay timed out: stop the ring
    RingOver,
}

/// a single countdown driven by the app's once-per-second poll
#[derive(Debug)]
pub struct Countdown {
    label: String,
    input: String,
    remaining: i64,
    phase: Phase,
}

impl Default for Countdown {
    fn default() -> Self {
        Self {
            label: String::new(),
            input: String::new(),
            remaining: 0,
            phase: Phase::Idle,
        }
    }
}

impl Countdown {
    /// parse the seconds field and start counting. a non-numeric or
    /// non-positive entry is a no-op and the form keeps its input.
    pub fn start(&mut self, now: NaiveDateTime) {
        if let Ok(seconds) = self.input.trim().parse::<i64>() {
            if seconds > 0 {
                self.remaining = seconds;
                self.phase = Phase::Running {
                    ends_at: now + chrono::Duration::seconds(seconds),
                };
            }
        }
    }

    /// back to idle. returns true when a ring was active so the caller can
    /// silence it.
    pub fn reset(&mut self) -> bool {
        let was_ringing = matches!(self.phase, Phase::Complete { .. });
        self.label.clear();
        self.input.clear();
        self.remaining = 0;
        self.phase = Phase::Idle;
        was_ringing
    }

    #[must_use]
    pub const fn is_running(&self) -> bool {
        matches!(self.phase, Phase::Running { .. })
    }

    /// advance against wall-clock time; at most one event per call
    pub fn tick(&mut self, now: NaiveDateTime) -> Option<CountdownEvent> {
        match self.phase {
            Phase::Idle => None,
            Phase::Running { ends_at } => {
                self.remaining = (ends_at - now).num_seconds().max(0);
                if self.remaining > 0 {
                    return None;
                }
                self.phase = Phase::Complete {
                    until: now + chrono::Duration::seconds(OVERLAY_SECONDS),
                };
                Some(CountdownEvent::Finished)
            }
            Phase::Complete { until } => {
                if now < until {
                    return None;
                }
                self.phase = Phase::Idle;
                Some(CountdownEvent::RingOver)
            }
        }
    }

    /// returns true when the user dismissed an active ring
    pub fn render(&mut self, ui: &mut egui::Ui, ctx: &egui::Context, now: NaiveDateTime) -> bool {
        let mut ring_dismissed = false;
        ui.vertical_centered(|ui| {
            ui.add_space(40.0);
            ui.label(RichText::new(format_remaining(self.remaining)).monospace().size(48.0));
            if !self.label.is_empty() {
                ui.label(format!("Timer: {}", self.label));
            }
            ui.add_space(10.0);
            let running = self.is_running();
            ui.add_enabled(
                !running,
                TextEdit::singleline(&mut self.label).hint_text("Timer name (optional)"),
            );
            ui.add_enabled(
                !running,
                TextEdit::singleline(&mut self.input).hint_text("Seconds"),
            );
            ui.add_space(10.0);
            ui.horizontal(|ui| {
                if ui.button("Start").clicked() {
                    self.start(now);
                }
                if ui.button("Reset").clicked() && self.reset() {
                    ring_dismissed = true;
                }
            });
        });

        if matches!(self.phase, Phase::Complete { .. }) {
            Window::new("Time's up!").auto_sized().show(ctx, |ui| {
                if self.label.is_empty() {
                    ui.label("the countdown finished");
                } else {
                    ui.label(format!("{} finished", self.label));
                }
                if ui.button("dismiss").clicked() && self.reset() {
                    ring_dismissed = true;
                }
            });
        }
        ring_dismissed
    }
}

/// `MM:SS`, matching the countdown's second resolution
#[must_use]
pub fn format_remaining(seconds: i64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
