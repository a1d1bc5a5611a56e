//! JSON settings for port selection and event delivery.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Settings for device selection and event delivery.
///
/// Stored as JSON. Missing fields take their default, so a config file only
/// needs the values it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchpadConfig {
    /// Client name registered with the MIDI driver.
    pub client_name: String,
    /// Port-name substring identifying a Launchpad S.
    pub narrow_port_keyword: String,
    /// Port-name substring identifying a Launchpad MK2.
    pub wide_port_keyword: String,
    /// Buffer size of hit channels. 0 makes each delivery wait for the consumer.
    pub hit_channel_capacity: usize,
    /// Buffer size of scroll-text end-marker channels.
    pub marker_channel_capacity: usize,
    /// Put an MK2 into session layout when it is selected.
    pub enter_session_mode: bool,
}

impl Default for LaunchpadConfig {
    fn default() -> Self {
        Self {
            client_name: "launchpad-rs".to_string(),
            narrow_port_keyword: "Launchpad S".to_string(),
            wide_port_keyword: "Launchpad MK2".to_string(),
            hit_channel_capacity: 0,
            marker_channel_capacity: 0,
            enter_session_mode: true,
        }
    }
}

impl LaunchpadConfig {
    /// Read and validate a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Read(e.to_string()))?;
        let config: Self =
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Write the config as pretty-printed JSON, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if parent != Path::new("") && parent != Path::new(".") {
                fs::create_dir_all(parent).map_err(|e| ConfigError::Write(e.to_string()))?;
            }
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;
        fs::write(path, content).map_err(|e| ConfigError::Write(e.to_string()))?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.client_name.trim().is_empty() {
            errors.push("client_name must not be empty".to_string());
        }
        if self.narrow_port_keyword.is_empty() {
            errors.push("narrow_port_keyword must not be empty".to_string());
        }
        if self.wide_port_keyword.is_empty() {
            errors.push("wide_port_keyword must not be empty".to_string());
        }
        if !self.narrow_port_keyword.is_empty()
            && self.narrow_port_keyword == self.wide_port_keyword
        {
            errors.push(format!(
                "narrow and wide port keywords are both {:?}",
                self.wide_port_keyword
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Read(String),

    #[error("failed to write config file: {0}")]
    Write(String),

    #[error("failed to parse config file: {0}")]
    Parse(String),

    #[error("failed to serialize config: {0}")]
    Serialize(String),

    #[error("config validation errors: {}", .0.join(", "))]
    Validation(Vec<String>),
}
