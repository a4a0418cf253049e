//! SQLite access to the LaunchServices quarantine events database
//!
//! This module provides:
//! - Schema setup for the `LSQuarantineEvent` table
//! - Insert, lookup and delete of event rows

mod queries;
mod schema;

pub use queries::*;
pub use schema::{ensure_schema, has_schema, EVENTS_TABLE};

use crate::error::{Error, Result, StorageError};
use crate::types::QuarantineEvent;
use rusqlite::{Connection, OpenFlags};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use uuid::Uuid;

/// Location of the per-user events database, relative to the home directory
pub const EVENTS_DB_RELATIVE_PATH: &str =
    "Library/Preferences/com.apple.LaunchServices.QuarantineEventsV2";

/// Handle on a quarantine events database
pub struct EventsDatabase {
    conn: Connection,
    db_path: PathBuf,
}

impl EventsDatabase {
    /// The current user's events database, if a home directory is known
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(EVENTS_DB_RELATIVE_PATH))
    }

    /// Open for writing, creating the file and table when missing
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref().to_path_buf();

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::Storage(StorageError::Database(format!(
                    "Failed to create events database directory: {}",
                    e
                )))
            })?;
        }

        let conn = Connection::open(&db_path)?;
        ensure_schema(&conn)?;
        info!("Opened quarantine events database: {:?}", db_path);

        Ok(Self { conn, db_path })
    }

    /// Open read-only. Returns `None` when the file or table does not exist,
    /// so lookups never create anything on disk.
    pub fn open_existing(db_path: impl AsRef<Path>) -> Result<Option<Self>> {
        let db_path = db_path.as_ref();
        if !db_path.exists() {
            debug!("No quarantine events database at {:?}", db_path);
            return Ok(None);
        }

        let conn = Connection::open_with_flags(
            db_path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        if !has_schema(&conn)? {
            debug!("Quarantine events database {:?} has no events table", db_path);
            return Ok(None);
        }

        Ok(Some(Self {
            conn,
            db_path: db_path.to_path_buf(),
        }))
    }

    /// In-memory database (for testing)
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        ensure_schema(&conn)?;

        Ok(Self {
            conn,
            db_path: PathBuf::from(":memory:"),
        })
    }

    pub fn insert_event(&self, event: &QuarantineEvent) -> Result<()> {
        insert_event(&self.conn, event)
    }

    pub fn get_event(&self, id: &Uuid) -> Result<Option<QuarantineEvent>> {
        get_event(&self.conn, id)
    }

    pub fn delete_event(&self, id: &Uuid) -> Result<bool> {
        delete_event(&self.conn, id)
    }

    pub fn count_events(&self) -> Result<usize> {
        count_events(&self.conn)
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::tempdir;

    #[test]
    fn test_in_memory_database() {
        let db = EventsDatabase::in_memory().unwrap();
        assert_eq!(db.count_events().unwrap(), 0);
        assert_eq!(db.db_path(), Path::new(":memory:"));
    }

    #[test]
    fn test_open_existing_does_not_create() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Preferences/events.db");

        assert!(EventsDatabase::open_existing(&path).unwrap().is_none());
        assert!(!path.exists());
    }

    #[test]
    fn test_open_then_read_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Preferences/events.db");

        let event = QuarantineEvent {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            agent_bundle_id: None,
            agent_name: Some("quarantineCLI".to_string()),
            data_url: None,
            origin_url: Some("http://example.com".to_string()),
            quarantine_type: None,
            sender_name: None,
            sender_address: None,
            origin_title: None,
        };

        {
            let db = EventsDatabase::open(&path).unwrap();
            db.insert_event(&event).unwrap();
        }
        assert!(path.exists());

        let db = EventsDatabase::open_existing(&path).unwrap().unwrap();
        let retrieved = db.get_event(&event.id).unwrap().unwrap();
        assert_eq!(retrieved.origin_url.as_deref(), Some("http://example.com"));
    }

    #[test]
    fn test_open_existing_without_table() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.db");
        Connection::open(&path)
            .unwrap()
            .execute_batch("CREATE TABLE other (id INTEGER);")
            .unwrap();

        assert!(EventsDatabase::open_existing(&path).unwrap().is_none());
    }
}
