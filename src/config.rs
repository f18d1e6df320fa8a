use std::{
    ops::Not,
    path::{Path, PathBuf},
};

use eframe::egui;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::registry::default_volume;

#[derive(Debug, Serialize, Deserialize, Default, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Not for Theme {
    type Output = Self;

    fn not(self) -> Self::Output {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }
}

impl From<Theme> for egui::Visuals {
    fn from(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self::dark(),
            Theme::Light => Self::light(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("couldn't serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("couldn't write config file: {0}")]
    Io(#[from] std::io::Error),
}

const fn default_snooze_minutes() -> u32 {
    5
}

/// user settings, kept in a toml file in the platform config directory.
/// the alarm list itself lives in the json store, not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub use_24_hour: bool,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default = "default_snooze_minutes")]
    pub snooze_minutes: u32,
    #[serde(default = "default_volume")]
    pub default_volume: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            use_24_hour: false,
            theme: Theme::Dark,
            snooze_minutes: default_snooze_minutes(),
            default_volume: default_volume(),
        }
    }
}

impl Config {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// missing or unparsable settings fall back to defaults, never an error
    #[must_use]
    pub fn load(path: &Path) -> Self {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Self::default(),
            Err(err) => {
                log::warn!("couldn't read {}: {err}; using defaults", path.display());
                return Self::default();
            }
        };
        toml::from_str(&text).unwrap_or_else(|err| {
            log::warn!("couldn't parse {}: {err}; using defaults", path.display());
            Self::default()
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let config = toml::to_string(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, config)?;
        Ok(())
    }

    #[must_use]
    pub fn config_path() -> PathBuf {
        let mut path = directories::ProjectDirs::from("", "", "chime_clock")
            .expect("couldn't get config path")
            .config_dir()
            .to_path_buf();
        path.push("config.toml");
        path
    }

    #[must_use]
    pub fn is_config_present() -> bool {
        Self::config_path().exists()
    }

    /// chrono format string for the clock readout
    #[must_use]
    pub const fn time_format(&self) -> &'static str {
        if self.use_24_hour {
            "%H:%M:%S"
        } else {
            "%I:%M:%S %p"
        }
    }
}
