use std::{
    fs, io,
    path::{Path, PathBuf},
};

use thiserror::Error;

use crate::registry::Alarm;

/// well-known name of the alarm blob in the data directory
pub const STORE_FILE: &str = "alarms.json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("couldn't write alarm store: {0}")]
    Io(#[from] io::Error),
    #[error("couldn't serialize alarms: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[must_use]
pub fn store_path() -> PathBuf {
    let mut path = directories::ProjectDirs::from("", "", "chime_clock")
        .expect("couldn't get data directory path")
        .data_dir()
        .to_path_buf();
    path.push(STORE_FILE);
    path
}

/// read the persisted alarm list. a missing or unparsable file is not an
/// error: the registry just starts empty.
#[must_use]
pub fn load(path: &Path) -> Vec<Alarm> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Vec::new(),
        Err(err) => {
            log::warn!("couldn't read {}: {err}; starting empty", path.display());
            return Vec::new();
        }
    };
    match serde_json::from_str(&text) {
        Ok(alarms) => alarms,
        Err(err) => {
            log::warn!("corrupt alarm store {}: {err}; starting empty", path.display());
            Vec::new()
        }
    }
}

/// write the whole alarm list; called after every registry mutation
pub fn save(path: &Path, alarms: &[Alarm]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(alarms)?;
    fs::write(path, json)?;
    Ok(())
}
