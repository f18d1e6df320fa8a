use std::time::{Duration, Instant};

use eframe::egui::{self, RichText};

/// start/pause/reset stopwatch. pausing folds the running span into
/// `accumulated`, so elapsed time survives any number of pauses.
#[derive(Debug, Default)]
pub struct Stopwatch {
    accumulated: Duration,
    started_at: Option<Instant>,
}

impl Stopwatch {
    pub fn start(&mut self) {
        if self.started_at.is_none() {
            self.started_at = Some(Instant::now());
        }
    }

    pub fn pause(&mut self) {
        if let Some(started_at) = self.started_at.take() {
            self.accumulated += started_at.elapsed();
        }
    }

    pub fn reset(&mut self) {
        self.accumulated = Duration::ZERO;
        self.started_at = None;
    }

    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.accumulated
            + self
                .started_at
                .map_or(Duration::ZERO, |started_at| started_at.elapsed())
    }

    pub fn render(&mut self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(40.0);
            ui.label(RichText::new(format_elapsed(self.elapsed())).monospace().size(48.0));
            ui.add_space(20.0);
            ui.horizontal(|ui| {
                let toggle_label = if self.is_running() { "Pause" } else { "Start" };
                if ui.button(toggle_label).clicked() {
                    if self.is_running() {
                        self.pause();
                    } else {
                        self.start();
                    }
                }
                if ui.button("Reset").clicked() {
                    self.reset();
                }
            });
        });
        if self.is_running() {
            // centisecond display wants faster repaints than the 1s poll
            ui.ctx().request_repaint_after(Duration::from_millis(10));
        }
    }
}

/// `HH:MM:SS.cc`
#[must_use]
pub fn format_elapsed(elapsed: Duration) -> String {
    let total_ms = elapsed.as_millis();
    let centis = (total_ms / 10) % 100;
    let total_secs = total_ms / 1000;
    format!(
        "{:02}:{:02}:{:02}.{:02}",
        total_secs / 3600,
        (total_secs % 3600) / 60,
        total_secs % 60,
        centis
    )
}
