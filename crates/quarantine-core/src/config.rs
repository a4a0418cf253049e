//! Configuration handling

use crate::error::{Error, Result};
use crate::storage::EventsDatabase;
use crate::types::QUARANTINE_ATTRIBUTE;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Agent name written when none is given
pub const DEFAULT_AGENT_NAME: &str = "quarantineCLI";

/// Directory under the user config dir holding `config.json`
pub const CONFIG_DIR_NAME: &str = "quarantine-cli";

/// Tool configuration, read from `config.json`. Every field is optional.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Agent name recorded by `set` when the caller gives none
    pub default_agent_name: String,
    /// Bundle identifier recorded by `set` when the caller gives none
    pub default_bundle_id: Option<String>,
    /// Fill the data URL from the target path when not given
    pub populate_data_url: bool,
    /// Record bundle id, URLs and type in the events database
    pub record_events: bool,
    /// Events database location; the per-user LaunchServices one if unset
    pub events_db: Option<PathBuf>,
    /// Extended attribute holding the quarantine value
    pub attribute_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_agent_name: DEFAULT_AGENT_NAME.to_string(),
            default_bundle_id: None,
            populate_data_url: true,
            record_events: true,
            events_db: None,
            attribute_name: QUARANTINE_ATTRIBUTE.to_string(),
        }
    }
}

impl Config {
    /// `<config_dir>/quarantine-cli/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join("config.json"))
    }

    /// Load from `path`, or the default location when `None`.
    ///
    /// A missing file yields defaults; an unreadable or invalid one is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) => path,
                None => return Ok(Self::default()),
            },
        };

        if !path.exists() {
            debug!("No config file at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        let config = Self::from_json(&content)
            .map_err(|e| Error::Config(format!("Invalid config {}: {}", path.display(), e)))?;
        debug!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.default_agent_name.contains(';') {
            return Err(Error::Config(format!(
                "defaultAgentName may not contain ';': {}",
                self.default_agent_name
            )));
        }
        if self.attribute_name.is_empty() {
            return Err(Error::Config("attributeName may not be empty".to_string()));
        }
        Ok(())
    }

    /// Events database to use, if recording is enabled
    pub fn resolved_events_db(&self) -> Option<PathBuf> {
        if !self.record_events {
            return None;
        }
        match &self.events_db {
            Some(path) => Some(path.clone()),
            None if cfg!(target_os = "macos") => EventsDatabase::default_path(),
            None => None,
        }
    }
}
