//! Configuration management for Scribe.
//!
//! Configuration is loaded from a TOML file at the platform config
//! directory with sensible defaults. API keys are referenced as
//! `${ENV_VAR}` strings and resolved from the environment at provider
//! construction time, so the config file never holds secrets.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for Scribe.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings
    pub server: ServerConfig,

    /// Logging settings
    pub logging: LoggingConfig,

    /// Resource limits
    pub limits: LimitsConfig,

    /// OCR engine settings
    pub ocr: OcrConfig,

    /// LLM provider settings
    pub llm: LlmConfig,

    /// Workflow settings
    pub workflow: WorkflowConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.scribe.scribe/config.toml
    /// - Linux: ~/.config/scribe/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\scribe\config\config.toml
    ///
    /// Falls back to ~/.scribe/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "scribe", "scribe")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".scribe").join("config.toml")
            })
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}
