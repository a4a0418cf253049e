//! Quarantine store backed by file metadata
//!
//! The agent name, timestamp and flags go into the `com.apple.quarantine`
//! extended attribute. Bundle identifier, URLs and type are recorded in the
//! LaunchServices events database under the event identifier the attribute
//! points at, the same split macOS itself uses.

use super::QuarantineStore;
use crate::error::{Error, Result};
use crate::storage::EventsDatabase;
use crate::types::*;
use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Platform quarantine store
#[derive(Debug, Clone)]
pub struct XattrStore {
    attribute_name: String,
    events_db: Option<PathBuf>,
}

impl Default for XattrStore {
    fn default() -> Self {
        Self::new()
    }
}

impl XattrStore {
    /// Store using `com.apple.quarantine` and, on macOS, the current user's
    /// events database
    pub fn new() -> Self {
        let events_db = if cfg!(target_os = "macos") {
            EventsDatabase::default_path()
        } else {
            None
        };

        Self {
            attribute_name: QUARANTINE_ATTRIBUTE.to_string(),
            events_db,
        }
    }

    pub fn with_attribute_name(mut self, name: impl Into<String>) -> Self {
        self.attribute_name = name.into();
        self
    }

    /// Events database to record into; `None` keeps everything in the attribute
    pub fn with_events_db(mut self, path: Option<PathBuf>) -> Self {
        self.events_db = path;
        self
    }

    pub fn attribute_name(&self) -> &str {
        &self.attribute_name
    }

    pub fn events_db(&self) -> Option<&Path> {
        self.events_db.as_deref()
    }

    fn read_attribute(&self, path: &Path) -> Result<Option<Vec<u8>>> {
        xattr::get(path, &self.attribute_name).map_err(|source| Error::AttributeReadFailed {
            path: path.to_path_buf(),
            source,
        })
    }

    fn lookup_event(&self, id: &Uuid) -> Option<QuarantineEvent> {
        let db_path = self.events_db.as_ref()?;

        let lookup = EventsDatabase::open_existing(db_path)
            .and_then(|db| db.map(|db| db.get_event(id)).transpose())
            .map(Option::flatten);

        match lookup {
            Ok(event) => {
                if event.is_none() {
                    debug!("No quarantine event {} in {:?}", id, db_path);
                }
                event
            }
            Err(e) => {
                warn!("Failed to read quarantine event {} from {:?}: {}", id, db_path, e);
                None
            }
        }
    }

    fn record_event(
        &self,
        id: Uuid,
        attribute: &QuarantineAttribute,
        record: &QuarantineRecord,
    ) -> Result<bool> {
        let Some(db_path) = &self.events_db else {
            let dropped = attribute_only_losses(record);
            if !dropped.is_empty() {
                warn!("No quarantine events database, discarding {}", dropped.join(", "));
            }
            return Ok(false);
        };

        let db = EventsDatabase::open(db_path)?;
        db.insert_event(&QuarantineEvent::from_record(id, attribute.timestamp, record))?;
        debug!("Recorded quarantine event {} in {:?}", id, db_path);
        Ok(true)
    }

    fn forget_event(&self, id: &Uuid) {
        if let Some(db_path) = &self.events_db {
            let removed = EventsDatabase::open(db_path).and_then(|db| db.delete_event(id));
            if let Err(e) = removed {
                warn!("Failed to remove orphaned quarantine event {}: {}", id, e);
            }
        }
    }
}

/// Record keys the attribute cannot carry without an events database
fn attribute_only_losses(record: &QuarantineRecord) -> Vec<&str> {
    let mut dropped = Vec::new();
    for key in [
        QuarantineKey::AgentBundleIdentifier,
        QuarantineKey::OriginUrl,
        QuarantineKey::DataUrl,
        QuarantineKey::Type,
    ] {
        if record.get(key).is_some() {
            dropped.push(key.as_str());
        }
    }

    dropped.extend(
        record
            .extra()
            .keys()
            .map(String::as_str)
            .filter(|name| *name != FLAGS_KEY && *name != EVENT_ID_KEY),
    );
    dropped
}

impl QuarantineStore for XattrStore {
    fn get(&self, path: &Path) -> Result<Option<QuarantineRecord>> {
        debug!("Reading {} from {:?}", self.attribute_name, path);

        let Some(raw) = self.read_attribute(path)? else {
            return Ok(None);
        };
        let attribute = QuarantineAttribute::parse(&raw)?;

        let mut record = QuarantineRecord::new();
        if !attribute.agent_name.is_empty() {
            record.insert(QuarantineKey::AgentName, attribute.agent_name.clone());
        }
        let mut record = record
            .with_timestamp(attribute.timestamp)
            .with_extra(FLAGS_KEY, format!("{:04x}", attribute.flags));

        if let Some(id) = attribute.event_id {
            let event_key = id.hyphenated().to_string().to_uppercase();
            record = record.with_extra(EVENT_ID_KEY, event_key);
            if let Some(event) = self.lookup_event(&id) {
                record = event.merge_into(record);
            }
        }

        Ok(Some(record))
    }

    fn set(&self, path: &Path, record: &QuarantineRecord) -> Result<()> {
        let flags = match record.extra().get(FLAGS_KEY) {
            Some(flags) => u16::from_str_radix(flags, 16)
                .map_err(|_| Error::InvalidRecord(format!("invalid {}: {}", FLAGS_KEY, flags)))?,
            None => DEFAULT_FLAGS,
        };
        let timestamp = record.timestamp().unwrap_or_else(Utc::now);
        let agent_name = record.agent_name().unwrap_or_default();
        let mut attribute = QuarantineAttribute::new(agent_name, timestamp)?.with_flags(flags);

        let event_id = Uuid::new_v4();
        let recorded = self.record_event(event_id, &attribute, record)?;
        if recorded {
            attribute = attribute.with_event_id(event_id);
        }

        debug!("Writing {}={} to {:?}", self.attribute_name, attribute, path);
        if let Err(source) = xattr::set(path, &self.attribute_name, &attribute.to_bytes()) {
            if recorded {
                self.forget_event(&event_id);
            }
            return Err(Error::AttributeWriteFailed {
                path: path.to_path_buf(),
                source,
            });
        }

        info!("Wrote quarantine attribute on {:?}", path);
        Ok(())
    }

    fn clear(&self, path: &Path) -> Result<()> {
        debug!("Removing {} from {:?}", self.attribute_name, path);

        match xattr::remove(path, &self.attribute_name) {
            Ok(()) => {
                info!("Removed quarantine attribute from {:?}", path);
                Ok(())
            }
            // Removing an absent attribute fails with ENOATTR; that is not an error here.
            Err(source) => match self.read_attribute(path) {
                Ok(None) => {
                    debug!("{:?} was not quarantined", path);
                    Ok(())
                }
                _ => Err(Error::AttributeWriteFailed {
                    path: path.to_path_buf(),
                    source,
                }),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let store = XattrStore::new()
            .with_attribute_name("user.quarantine")
            .with_events_db(Some(PathBuf::from("/tmp/events.db")));

        assert_eq!(store.attribute_name(), "user.quarantine");
        assert_eq!(store.events_db(), Some(Path::new("/tmp/events.db")));

        let store = store.with_events_db(None);
        assert_eq!(store.events_db(), None);
    }

    #[test]
    fn test_invalid_flags_rejected_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("events.db");
        let store = XattrStore::new().with_events_db(Some(db_path.clone()));

        let record = QuarantineRecord::new().with_extra(FLAGS_KEY, "not-hex");
        let result = store.set(dir.path(), &record);

        assert!(matches!(result, Err(Error::InvalidRecord(_))));
        assert!(!db_path.exists());
    }

    #[test]
    fn test_missing_path_is_read_failure() {
        let store = XattrStore::new().with_events_db(None);
        let result = store.get(Path::new("/no/such/path/for/quarantine"));
        assert!(matches!(result, Err(Error::AttributeReadFailed { .. })));
    }

    #[test]
    fn test_attribute_only_losses() {
        let record = QuarantineRecord::new()
            .with_agent_name("x")
            .with_timestamp(Utc::now())
            .with_bundle_id("com.example.x")
            .with_origin_url("http://example.com")
            .with_extra(FLAGS_KEY, "0081")
            .with_extra("LSQuarantineSenderName", "Alice");

        assert_eq!(
            attribute_only_losses(&record),
            vec![
                "LSQuarantineAgentBundleIdentifier",
                "LSQuarantineOriginURL",
                "LSQuarantineSenderName",
            ]
        );

        let record = QuarantineRecord::new().with_agent_name("x");
        assert!(attribute_only_losses(&record).is_empty());
    }

    #[test]
    fn test_corrupt_event_row_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("events.db");
        let store = XattrStore::new().with_events_db(Some(db_path.clone()));

        let id = Uuid::new_v4();
        let record = QuarantineRecord::new().with_bundle_id("com.example.x");
        let db = EventsDatabase::open(&db_path).unwrap();
        db.insert_event(&QuarantineEvent::from_record(id, Utc::now(), &record))
            .unwrap();
        db.connection()
            .execute("UPDATE LSQuarantineEvent SET LSQuarantineTimeStamp = 1e300", [])
            .unwrap();
        drop(db);

        assert!(store.lookup_event(&id).is_none());
    }

    #[cfg(target_os = "macos")]
    mod macos {
        use super::*;
        use pretty_assertions::assert_eq;
        use tempfile::{tempdir, NamedTempFile};

        #[test]
        fn test_round_trip_with_events() {
            let dir = tempdir().unwrap();
            let file = NamedTempFile::new().unwrap();
            let store = XattrStore::new().with_events_db(Some(dir.path().join("events.db")));

            assert!(store.get(file.path()).unwrap().is_none());

            let record = QuarantineRecord::new()
                .with_agent_name("x")
                .with_bundle_id("com.example.x")
                .with_origin_url("http://example.com")
                .with_type(QuarantineType::WebDownload);
            store.set(file.path(), &record).unwrap();

            let read = store.get(file.path()).unwrap().unwrap();
            assert_eq!(read.agent_name(), Some("x"));
            assert_eq!(read.bundle_id(), Some("com.example.x"));
            assert_eq!(read.origin_url(), Some("http://example.com"));
            assert_eq!(read.quarantine_type(), Some(QuarantineType::WebDownload));
            assert_eq!(read.extra().get(FLAGS_KEY).map(String::as_str), Some("0081"));

            store.clear(file.path()).unwrap();
            store.clear(file.path()).unwrap();
            assert!(store.get(file.path()).unwrap().is_none());
        }

        #[test]
        fn test_attribute_only() {
            let file = NamedTempFile::new().unwrap();
            let store = XattrStore::new().with_events_db(None);

            let record = QuarantineRecord::new().with_origin_url("http://lost.example");
            store.set(file.path(), &record).unwrap();

            let raw = xattr::get(file.path(), QUARANTINE_ATTRIBUTE).unwrap().unwrap();
            let attribute = QuarantineAttribute::parse(&raw).unwrap();
            assert_eq!(attribute.agent_name, "");
            assert_eq!(attribute.event_id, None);

            let read = store.get(file.path()).unwrap().unwrap();
            assert_eq!(read.agent_name(), None);
            assert_eq!(read.origin_url(), None);
        }
    }
}
