use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use transcribe_core::shared::constants::{
    DEFAULT_API_URL, DEFAULT_LANGUAGE, POLL_INTERVAL, REQUEST_TIMEOUT,
};

pub const API_URL_ENV: &str = "TRANSCRIBE_API_URL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api_url: String,
    pub language: String,
    pub detect_speakers: bool,
    pub poll_interval_ms: u64,
    pub request_timeout_secs: u64,
    pub color: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            detect_speakers: false,
            poll_interval_ms: POLL_INTERVAL.as_millis() as u64,
            request_timeout_secs: REQUEST_TIMEOUT.as_secs(),
            color: true,
        }
    }
}

impl Settings {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("Transcribe").join("settings.json"))
    }

    pub fn load() -> Self {
        Self::config_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    /// Missing or malformed files fall back to defaults.
    pub fn load_from(path: &Path) -> Self {
        fs::read_to_string(path)
            .ok()
            .and_then(|json| serde_json::from_str(&json).ok())
            .unwrap_or_default()
    }

    pub fn save(&self) {
        if let Some(path) = Self::config_path() {
            if let Err(e) = self.save_to(&path) {
                log::warn!("could not write settings to {}: {e}", path.display());
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(io::Error::other)?;
        fs::write(path, json)
    }

    /// Flag wins over the environment, which wins over the stored value.
    pub fn resolve_api_url(&self, flag: Option<&str>, env: Option<&str>) -> String {
        [flag, env]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|url| !url.is_empty())
            .unwrap_or(&self.api_url)
            .to_string()
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}
