//! Events database schema

use crate::error::{Error, Result, StorageError};
use rusqlite::Connection;
use tracing::{debug, info};

/// Table LaunchServices records quarantine events in
pub const EVENTS_TABLE: &str = "LSQuarantineEvent";

/// Create the events table if it is missing
pub fn ensure_schema(conn: &Connection) -> Result<()> {
    if has_schema(conn)? {
        debug!("Quarantine events table already present");
        return Ok(());
    }

    conn.execute_batch(SCHEMA_EVENTS)
        .map_err(|e| Error::Storage(StorageError::SchemaFailed(e.to_string())))?;
    info!("Created quarantine events table");
    Ok(())
}

/// Whether the events table exists
pub fn has_schema(conn: &Connection) -> Result<bool> {
    let count: i32 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?",
        [EVENTS_TABLE],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

const SCHEMA_EVENTS: &str = r#"
CREATE TABLE IF NOT EXISTS LSQuarantineEvent (
    LSQuarantineEventIdentifier TEXT PRIMARY KEY NOT NULL,
    LSQuarantineTimeStamp REAL,
    LSQuarantineAgentBundleIdentifier TEXT,
    LSQuarantineAgentName TEXT,
    LSQuarantineDataURLString TEXT,
    LSQuarantineSenderName TEXT,
    LSQuarantineSenderAddress TEXT,
    LSQuarantineTypeNumber INTEGER,
    LSQuarantineOriginTitle TEXT,
    LSQuarantineOriginURLString TEXT,
    LSQuarantineOriginAlias BLOB
);

CREATE INDEX IF NOT EXISTS LSQuarantineEventIndex
    ON LSQuarantineEvent (LSQuarantineEventIdentifier);
"#;
