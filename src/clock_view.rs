use chrono::Local;
use eframe::egui::{self, RichText};

use crate::config::{Config, Theme};

/// the big time readout with the 12/24-hour and theme toggles. returns true
/// when a setting changed so the caller can persist the config.
pub fn render(ui: &mut egui::Ui, config: &mut Config) -> bool {
    let now = Local::now().naive_local();
    let mut changed = false;
    ui.vertical_centered(|ui| {
        ui.add_space(40.0);
        ui.label(
            RichText::new(now.format(config.time_format()).to_string())
                .monospace()
                .size(56.0),
        );
        ui.label(RichText::new(now.format("%A, %B %-d, %Y").to_string()).size(20.0));
        ui.add_space(20.0);
        ui.horizontal(|ui| {
            let format_label = if config.use_24_hour {
                "Toggle 12-Hour"
            } else {
                "Toggle 24-Hour"
            };
            if ui.button(format_label).clicked() {
                config.use_24_hour = !config.use_24_hour;
                changed = true;
            }
            let theme_label = if config.theme == Theme::Dark {
                "Light Mode"
            } else {
                "Dark Mode"
            };
            if ui.button(theme_label).clicked() {
                config.theme = !config.theme;
                changed = true;
            }
        });
    });
    changed
}
