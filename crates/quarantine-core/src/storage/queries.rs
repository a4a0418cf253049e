//! Events database queries

use crate::error::{Result, StorageError};
use crate::types::{QuarantineEvent, QuarantineType};
use chrono::{DateTime, TimeZone, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::warn;
use uuid::Uuid;

/// Seconds between the Unix epoch and 2001-01-01T00:00:00Z
const CF_ABSOLUTE_TIME_OFFSET: i64 = 978_307_200;

/// Insert an event, replacing any row with the same identifier
pub fn insert_event(conn: &Connection, event: &QuarantineEvent) -> Result<()> {
    conn.execute(
        r#"
        INSERT OR REPLACE INTO LSQuarantineEvent (
            LSQuarantineEventIdentifier, LSQuarantineTimeStamp,
            LSQuarantineAgentBundleIdentifier, LSQuarantineAgentName,
            LSQuarantineDataURLString, LSQuarantineSenderName,
            LSQuarantineSenderAddress, LSQuarantineTypeNumber,
            LSQuarantineOriginTitle, LSQuarantineOriginURLString
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
        params![
            event_key(&event.id),
            to_absolute_time(&event.timestamp),
            event.agent_bundle_id,
            event.agent_name,
            event.data_url,
            event.sender_name,
            event.sender_address,
            event.quarantine_type.map(|t| t.number()),
            event.origin_title,
            event.origin_url,
        ],
    )?;

    Ok(())
}

/// Get an event by identifier
pub fn get_event(conn: &Connection, id: &Uuid) -> Result<Option<QuarantineEvent>> {
    let row = conn
        .query_row(
            r#"
            SELECT LSQuarantineTimeStamp, LSQuarantineAgentBundleIdentifier,
                   LSQuarantineAgentName, LSQuarantineDataURLString,
                   LSQuarantineSenderName, LSQuarantineSenderAddress,
                   LSQuarantineTypeNumber, LSQuarantineOriginTitle,
                   LSQuarantineOriginURLString
            FROM LSQuarantineEvent
            WHERE LSQuarantineEventIdentifier = ? COLLATE NOCASE
            "#,
            params![event_key(id)],
            |row| {
                let absolute = row.get::<_, Option<f64>>(0)?.unwrap_or(0.0);
                let event = QuarantineEvent {
                    id: *id,
                    timestamp: DateTime::<Utc>::default(),
                    agent_bundle_id: row.get(1)?,
                    agent_name: row.get(2)?,
                    data_url: row.get(3)?,
                    sender_name: row.get(4)?,
                    sender_address: row.get(5)?,
                    quarantine_type: row.get::<_, Option<i64>>(6)?.and_then(parse_type_number),
                    origin_title: row.get(7)?,
                    origin_url: row.get(8)?,
                };
                Ok((absolute, event))
            },
        )
        .optional()?;

    let Some((absolute, mut event)) = row else {
        return Ok(None);
    };
    event.timestamp = from_absolute_time(absolute).ok_or_else(|| {
        StorageError::InvalidRow(format!("event {} has timestamp out of range: {}", id, absolute))
    })?;

    Ok(Some(event))
}

/// Delete an event; returns whether a row was removed
pub fn delete_event(conn: &Connection, id: &Uuid) -> Result<bool> {
    let deleted = conn.execute(
        "DELETE FROM LSQuarantineEvent WHERE LSQuarantineEventIdentifier = ? COLLATE NOCASE",
        params![event_key(id)],
    )?;
    Ok(deleted > 0)
}

/// Number of recorded events
pub fn count_events(conn: &Connection) -> Result<usize> {
    let count: i64 =
        conn.query_row("SELECT COUNT(*) FROM LSQuarantineEvent", [], |row| row.get(0))?;
    Ok(count as usize)
}

fn event_key(id: &Uuid) -> String {
    id.hyphenated().to_string().to_uppercase()
}

fn parse_type_number(number: i64) -> Option<QuarantineType> {
    let parsed = QuarantineType::from_number(number);
    if parsed.is_none() {
        warn!("Ignoring unknown quarantine type number {}", number);
    }
    parsed
}

fn to_absolute_time(timestamp: &DateTime<Utc>) -> f64 {
    let seconds = timestamp.timestamp() - CF_ABSOLUTE_TIME_OFFSET;
    seconds as f64 + f64::from(timestamp.timestamp_subsec_nanos()) / 1e9
}

/// `None` for values no `DateTime` can hold, including NaN and infinities
fn from_absolute_time(absolute: f64) -> Option<DateTime<Utc>> {
    if !absolute.is_finite() {
        return None;
    }

    let whole = absolute.floor();
    if whole < i64::MIN as f64 || whole >= i64::MAX as f64 {
        return None;
    }
    let nanos = (((absolute - whole) * 1e9) as u32).min(999_999_999);
    let seconds = (whole as i64).checked_add(CF_ABSOLUTE_TIME_OFFSET)?;

    Utc.timestamp_opt(seconds, nanos).single()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn setup_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        crate::storage::ensure_schema(&conn).unwrap();
        conn
    }

    fn sample_event() -> QuarantineEvent {
        QuarantineEvent {
            id: Uuid::new_v4(),
            timestamp: Utc.with_ymd_and_hms(2021, 3, 4, 5, 6, 7).unwrap(),
            agent_bundle_id: Some("com.apple.Safari".to_string()),
            agent_name: Some("Safari".to_string()),
            data_url: Some("https://example.com/file.dmg".to_string()),
            origin_url: Some("https://example.com/".to_string()),
            quarantine_type: Some(QuarantineType::WebDownload),
            sender_name: None,
            sender_address: None,
            origin_title: Some("Example".to_string()),
        }
    }

    #[test]
    fn test_event_crud() {
        let conn = setup_db();
        let event = sample_event();

        // Insert
        insert_event(&conn, &event).unwrap();
        assert_eq!(count_events(&conn).unwrap(), 1);

        // Get
        let retrieved = get_event(&conn, &event.id).unwrap();
        assert_eq!(retrieved, Some(event.clone()));

        // Delete
        assert!(delete_event(&conn, &event.id).unwrap());
        assert!(get_event(&conn, &event.id).unwrap().is_none());
        assert!(!delete_event(&conn, &event.id).unwrap());
    }

    #[test]
    fn test_insert_replaces() {
        let conn = setup_db();
        let mut event = sample_event();
        insert_event(&conn, &event).unwrap();

        event.agent_name = Some("curl".to_string());
        event.quarantine_type = None;
        insert_event(&conn, &event).unwrap();

        assert_eq!(count_events(&conn).unwrap(), 1);
        let retrieved = get_event(&conn, &event.id).unwrap().unwrap();
        assert_eq!(retrieved.agent_name.as_deref(), Some("curl"));
        assert_eq!(retrieved.quarantine_type, None);
    }

    #[test]
    fn test_absolute_time() {
        let epoch = Utc.with_ymd_and_hms(2001, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(to_absolute_time(&epoch), 0.0);
        assert_eq!(from_absolute_time(0.0), Some(epoch));
        assert_eq!(
            from_absolute_time(86_400.0),
            Some(Utc.with_ymd_and_hms(2001, 1, 2, 0, 0, 0).unwrap())
        );

        assert_eq!(from_absolute_time(1e300), None);
        assert_eq!(from_absolute_time(-1e300), None);
        assert_eq!(from_absolute_time(f64::INFINITY), None);
        assert_eq!(from_absolute_time(f64::NAN), None);
        assert_eq!(from_absolute_time(i64::MAX as f64 - 1e6), None);
    }

    #[test]
    fn test_unknown_type_number_ignored() {
        let conn = setup_db();
        let event = sample_event();
        insert_event(&conn, &event).unwrap();
        conn.execute("UPDATE LSQuarantineEvent SET LSQuarantineTypeNumber = 99", [])
            .unwrap();

        let retrieved = get_event(&conn, &event.id).unwrap().unwrap();
        assert_eq!(retrieved.quarantine_type, None);
    }

    #[test]
    fn test_out_of_range_timestamp_rejected() {
        let conn = setup_db();
        let event = sample_event();
        insert_event(&conn, &event).unwrap();
        conn.execute("UPDATE LSQuarantineEvent SET LSQuarantineTimeStamp = 1e300", [])
            .unwrap();

        let result = get_event(&conn, &event.id);
        assert!(matches!(
            result,
            Err(crate::error::Error::Storage(StorageError::InvalidRow(_)))
        ));
    }

    #[test]
    fn test_missing_timestamp_reads_as_reference_date() {
        let conn = setup_db();
        let event = sample_event();
        insert_event(&conn, &event).unwrap();
        conn.execute("UPDATE LSQuarantineEvent SET LSQuarantineTimeStamp = NULL", [])
            .unwrap();

        let retrieved = get_event(&conn, &event.id).unwrap().unwrap();
        assert_eq!(retrieved.timestamp, Utc.with_ymd_and_hms(2001, 1, 1, 0, 0, 0).unwrap());
    }
}
