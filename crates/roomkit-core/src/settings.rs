use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::RoomKitError;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Settings {
    /// Seconds the engine waits for an answer to a seat invitation.
    /// Zero means the engine reports a timeout right away.
    #[serde(default)]
    pub seat_invite_timeout_secs: f64,
    #[serde(default)]
    pub language: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seat_invite_timeout_secs: 0.0,
            language: None,
        }
    }
}

impl Settings {
    /// Negative and NaN values mean zero; values too large for a
    /// `Duration` saturate.
    pub fn seat_invite_timeout(&self) -> Duration {
        let secs = self.seat_invite_timeout_secs;
        if secs.is_nan() || secs <= 0.0 {
            return Duration::ZERO;
        }
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    }
}

pub struct SettingsStore {
    settings: Mutex<Settings>,
    file_path: PathBuf,
}

impl SettingsStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        let file_path = data_dir.as_ref().join("settings.json");
        let settings = Self::load(&file_path);
        Self {
            settings: Mutex::new(settings),
            file_path,
        }
    }

    pub fn get(&self) -> Settings {
        self.settings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_seat_invite_timeout_secs(&self, secs: f64) {
        self.update(|s| s.seat_invite_timeout_secs = secs);
    }

    pub fn set_language(&self, lang: Option<String>) {
        self.update(|s| s.language = lang);
    }

    fn update(&self, apply: impl FnOnce(&mut Settings)) {
        let snapshot = {
            let mut settings = self.settings.lock().unwrap_or_else(PoisonError::into_inner);
            apply(&mut settings);
            settings.clone()
        };
        if let Err(e) = self.save(&snapshot) {
            tracing::warn!("failed to persist settings: {e}");
        }
    }

    fn save(&self, settings: &Settings) -> Result<(), RoomKitError> {
        if let Some(parent) = self.file_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| RoomKitError::Settings(e.to_string()))?;
        }
        let json = serde_json::to_string_pretty(settings)
            .map_err(|e| RoomKitError::Settings(e.to_string()))?;
        std::fs::write(&self.file_path, json).map_err(|e| RoomKitError::Settings(e.to_string()))
    }

    fn load(path: &Path) -> Settings {
        match std::fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!("ignoring unreadable settings file {}: {e}", path.display());
                Settings::default()
            }),
            Err(_) => Settings::default(),
        }
    }
}
