//! Bridge settings and configuration management

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Bridge settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Settings {
    /// Decoder plugin name used in diagnostics
    #[serde(default = "default_plugin_name")]
    pub plugin_name: String,
    /// Extension of synthetic cue-sheet track names, without the dot
    #[serde(default = "default_track_extension")]
    pub track_extension: String,
    /// Bytes reserved in the PCM buffer when a session starts
    #[serde(default)]
    pub buffer_capacity_hint: usize,
    /// Ask the decoder to verify frame checksums
    #[serde(default)]
    pub verify_decoding: bool,
    /// Fallback `tracing` filter when `RUST_LOG` is unset
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_plugin_name() -> String {
    "flac".to_string()
}

fn default_track_extension() -> String {
    "flac".to_string()
}

fn default_log_filter() -> String {
    "info".to_string()
}

/// Error types for configuration operations
#[derive(Debug)]
pub enum ConfigError {
    IoError(io::Error),
    ParseError(String),
    ValidationError(String),
}

impl From<io::Error> for ConfigError {
    fn from(err: io::Error) -> Self {
        ConfigError::IoError(err)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "I/O error: {}", e),
            ConfigError::ParseError(s) => write!(f, "Parse error: {}", s),
            ConfigError::ValidationError(s) => write!(f, "Validation error: {}", s),
        }
    }
}

impl Error for ConfigError {}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            plugin_name: default_plugin_name(),
            track_extension: default_track_extension(),
            buffer_capacity_hint: 0,
            verify_decoding: false,
            log_filter: default_log_filter(),
        }
    }
}

impl Settings {
    /// Load settings from a file, falling back to defaults if it is missing
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&content)?;
        Ok(settings)
    }

    /// Save settings to a file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(&self)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, content)?;
        Ok(())
    }

    /// Get the default config file path
    pub fn default_path() -> PathBuf {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".config").join("flac-bridge").join("config.json")
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.plugin_name.trim().is_empty() {
            return Err(ConfigError::ValidationError("Plugin name cannot be empty".to_string()));
        }

        if self.track_extension.is_empty() {
            return Err(ConfigError::ValidationError("Track extension cannot be empty".to_string()));
        }

        if self.track_extension.starts_with('.') {
            return Err(ConfigError::ValidationError(
                "Track extension must not start with a dot".to_string(),
            ));
        }

        Ok(())
    }
}
