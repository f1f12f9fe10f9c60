//! Runtime settings (`settings.toml`).

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::errors::{PetError, Result};
use crate::types::Position;

/// Settings for the query collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuerySettings {
    /// API key; falls back to `OPENAI_API_KEY`
    pub api_key: Option<String>,
    /// Endpoint; falls back to `OPENAI_BASE_URL`
    pub base_url: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
    pub system_prompt: Option<String>,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            model: "gpt-4o-mini".to_string(),
            temperature: 0.9,
            max_tokens: 40,
            timeout_secs: 30,
            system_prompt: None,
        }
    }
}

impl QuerySettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Settings for the speech collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechSettings {
    pub enabled: bool,
    /// TTS program; the text is passed as the last argument
    pub command: String,
    pub args: Vec<String>,
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            command: "espeak".to_string(),
            args: vec!["-p".to_string(), "70".to_string()],
        }
    }
}

/// Top-level runtime settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Nominal tick period in milliseconds
    pub tick_ms: u64,
    pub start_x: i32,
    pub start_y: i32,
    pub query: QuerySettings,
    pub speech: SpeechSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tick_ms: 100,
            start_x: 4,
            start_y: 2,
            query: QuerySettings::default(),
            speech: SpeechSettings::default(),
        }
    }
}

impl Settings {
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }

    pub fn start_position(&self) -> Position {
        Position::new(self.start_x, self.start_y)
    }

    pub fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("com", "desktop-pet", "desktop-pet")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Default location of `settings.toml`
    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("settings.toml"))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| PetError::config(format!("Invalid TOML settings: {e}")))
    }
}

/// Load settings.
///
/// An explicit path must exist. Without one the default location is tried
/// and a missing file yields the defaults.
pub fn load_settings(explicit: Option<&Path>) -> Result<Settings> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match Settings::config_path() {
            Some(path) if path.exists() => path,
            _ => return Ok(Settings::default()),
        },
    };

    let content = fs::read_to_string(&path).map_err(|e| {
        PetError::config(format!("Failed to read settings {}: {e}", path.display()))
    })?;
    tracing::debug!("Loaded settings from {}", path.display());
    Settings::from_toml(&content)
}
