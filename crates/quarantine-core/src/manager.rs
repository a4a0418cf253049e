//! Quarantine attribute manager
//!
//! Validates the target path, builds records and drives a
//! [`QuarantineStore`]. Every operation checks that the path is reachable
//! first, queries included.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::store::QuarantineStore;
use crate::types::{QuarantineRecord, QuarantineType};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use url::Url;

/// Caller supplied fields for [`QuarantineManager::set`]
#[derive(Debug, Clone, Default)]
pub struct SetOptions {
    pub agent_name: Option<String>,
    pub bundle_id: Option<String>,
    pub origin_url: Option<String>,
    pub item_url: Option<String>,
    pub quarantine_type: Option<QuarantineType>,
    pub timestamp: Option<DateTime<Utc>>,
    /// Overrides `Config::populate_data_url` for this call
    pub populate_data_url: Option<bool>,
}

impl SetOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn agent_name(mut self, name: impl Into<String>) -> Self {
        self.agent_name = Some(name.into());
        self
    }

    pub fn bundle_id(mut self, bundle_id: impl Into<String>) -> Self {
        self.bundle_id = Some(bundle_id.into());
        self
    }

    pub fn origin_url(mut self, url: impl Into<String>) -> Self {
        self.origin_url = Some(url.into());
        self
    }

    pub fn item_url(mut self, url: impl Into<String>) -> Self {
        self.item_url = Some(url.into());
        self
    }

    pub fn quarantine_type(mut self, quarantine_type: QuarantineType) -> Self {
        self.quarantine_type = Some(quarantine_type);
        self
    }

    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn populate_data_url(mut self, populate: bool) -> Self {
        self.populate_data_url = Some(populate);
        self
    }
}

/// Result of [`QuarantineManager::query`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    NotQuarantined,
    Quarantined(QuarantineRecord),
    /// A single requested value, keyed by the name the caller asked for
    Value { key: String, value: String },
}

impl QueryOutcome {
    pub fn is_quarantined(&self) -> bool {
        !matches!(self, Self::NotQuarantined)
    }
}

/// Set, clear and query quarantine records through a store
pub struct QuarantineManager<S> {
    store: S,
    config: Config,
}

impl<S: QuarantineStore> QuarantineManager<S> {
    pub fn new(store: S, config: Config) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Quarantine `path`, replacing any existing record. Returns what was written.
    pub fn set(&self, path: impl AsRef<Path>, options: SetOptions) -> Result<QuarantineRecord> {
        let path = Self::resolve(path.as_ref())?;

        let agent_name = options
            .agent_name
            .unwrap_or_else(|| self.config.default_agent_name.clone());
        let mut record = QuarantineRecord::new()
            .with_agent_name(agent_name)
            .with_timestamp(options.timestamp.unwrap_or_else(Utc::now));

        let bundle_id = options
            .bundle_id
            .or_else(|| self.config.default_bundle_id.clone());
        if let Some(bundle_id) = bundle_id {
            record = record.with_bundle_id(bundle_id);
        }
        if let Some(origin_url) = options.origin_url {
            record = record.with_origin_url(origin_url);
        }

        let populate = options
            .populate_data_url
            .unwrap_or(self.config.populate_data_url);
        match options.item_url {
            Some(item_url) => record = record.with_data_url(item_url),
            None if populate => record = record.with_data_url(file_url(&path)?),
            None => {}
        }

        if let Some(quarantine_type) = options.quarantine_type {
            record = record.with_type(quarantine_type);
        }

        self.store.set(&path, &record)?;
        info!("Quarantined {:?}", path);
        Ok(record)
    }

    /// Remove the record from `path`; a path that is not quarantined is fine
    pub fn clear(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = Self::resolve(path.as_ref())?;
        self.store.clear(&path)?;
        info!("De-quarantined {:?}", path);
        Ok(())
    }

    /// Report the record of `path`, or the single value named by `info_key`
    pub fn query(&self, path: impl AsRef<Path>, info_key: Option<&str>) -> Result<QueryOutcome> {
        let path = Self::resolve(path.as_ref())?;
        debug!("Querying quarantine status of {:?}", path);

        let Some(record) = self.store.get(&path)? else {
            return Ok(QueryOutcome::NotQuarantined);
        };

        match info_key {
            None => Ok(QueryOutcome::Quarantined(record)),
            Some(key) => {
                let value = record
                    .lookup(key)
                    .ok_or_else(|| Error::InfoKeyNotFound(key.to_string()))?;
                Ok(QueryOutcome::Value {
                    key: key.to_string(),
                    value: value.to_string(),
                })
            }
        }
    }

    /// Canonical form of `path`, or `PathUnreachable` if it cannot be resolved
    fn resolve(path: &Path) -> Result<PathBuf> {
        std::fs::canonicalize(path).map_err(|e| {
            debug!("Cannot resolve {:?}: {}", path, e);
            Error::PathUnreachable {
                path: path.to_path_buf(),
            }
        })
    }
}

/// `file://` URL for an absolute path; directories get a trailing slash
pub fn file_url(path: &Path) -> Result<String> {
    let url = if path.is_dir() {
        Url::from_directory_path(path)
    } else {
        Url::from_file_path(path)
    };

    url.map(String::from)
        .map_err(|_| Error::InvalidRecord(format!("no file URL for relative path {:?}", path)))
}
