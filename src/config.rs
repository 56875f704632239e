//! Settings loading (optional `lapwatch.toml`).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::notices::NoticeConfig;

pub const DEFAULT_REFRESH_MS: u64 = 100;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Display refresh interval while running.
    pub refresh_ms: u64,
    pub export_path: PathBuf,
    /// Ask before clearing a non-empty lap list.
    pub confirm_clear: bool,
    pub pause_on_focus_loss: bool,
    pub notices: NoticeConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            refresh_ms: DEFAULT_REFRESH_MS,
            export_path: PathBuf::from("laps.csv"),
            confirm_clear: true,
            pause_on_focus_loss: true,
            notices: NoticeConfig::default(),
        }
    }
}

impl Settings {
    pub fn from_toml(text: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(text).context("Invalid settings")?;
        Ok(settings.normalized())
    }

    fn normalized(mut self) -> Self {
        if self.refresh_ms == 0 {
            log::warn!("refresh_ms = 0 is not usable, falling back to {}", DEFAULT_REFRESH_MS);
            self.refresh_ms = DEFAULT_REFRESH_MS;
        }
        self
    }

    /// Command line values win over the file.
    pub fn with_overrides(mut self, export_path: Option<PathBuf>, refresh_ms: Option<u64>) -> Self {
        if let Some(path) = export_path {
            self.export_path = path;
        }
        if let Some(ms) = refresh_ms {
            self.refresh_ms = ms;
        }
        self.normalized()
    }
}

pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    match path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            Settings::from_toml(&text)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))
        }
        None => Ok(Settings::default()),
    }
}
