//! Codec for the `com.apple.quarantine` extended attribute value
//!
//! The value is a `;` separated string: `FLAGS;TIMESTAMP;AGENT;EVENT_ID`,
//! flags and timestamp in lowercase hex, the event identifier an upper-case
//! UUID pointing into the LaunchServices quarantine events database.

use crate::error::{Error, Result};
use chrono::{DateTime, TimeZone, Utc};
use std::fmt;
use uuid::Uuid;

/// Name of the extended attribute LaunchServices reads
pub const QUARANTINE_ATTRIBUTE: &str = "com.apple.quarantine";

/// Flags written when the record does not carry its own
pub const DEFAULT_FLAGS: u16 = 0x0081;

/// Record extra carrying the raw attribute flags as four hex digits
pub const FLAGS_KEY: &str = "QuarantineFlags";

/// Record extra carrying the events database identifier
pub const EVENT_ID_KEY: &str = "QuarantineEventIdentifier";

/// Decoded attribute value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuarantineAttribute {
    pub flags: u16,
    pub timestamp: DateTime<Utc>,
    pub agent_name: String,
    pub event_id: Option<Uuid>,
}

impl QuarantineAttribute {
    pub fn new(agent_name: impl Into<String>, timestamp: DateTime<Utc>) -> Result<Self> {
        let agent_name = agent_name.into();
        if agent_name.contains(';') {
            return Err(Error::InvalidRecord(format!(
                "agent name may not contain ';': {}",
                agent_name
            )));
        }

        Ok(Self {
            flags: DEFAULT_FLAGS,
            timestamp,
            agent_name,
            event_id: None,
        })
    }

    pub fn with_flags(mut self, flags: u16) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_event_id(mut self, event_id: Uuid) -> Self {
        self.event_id = Some(event_id);
        self
    }

    /// Decode a raw attribute value
    pub fn parse(raw: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(raw)
            .map_err(|e| Error::MalformedAttribute(format!("not UTF-8: {}", e)))?;
        let text = text.trim_end_matches(['\0', '\n', ' ']);

        let mut parts = text.split(';');
        let flags = parts
            .next()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::MalformedAttribute("missing flags".to_string()))?;
        let flags = u16::from_str_radix(flags, 16)
            .map_err(|_| Error::MalformedAttribute(format!("invalid flags: {}", flags)))?;

        let timestamp = parts
            .next()
            .ok_or_else(|| Error::MalformedAttribute("missing timestamp".to_string()))?;
        let seconds = i64::from_str_radix(timestamp, 16)
            .map_err(|_| Error::MalformedAttribute(format!("invalid timestamp: {}", timestamp)))?;
        let timestamp = Utc.timestamp_opt(seconds, 0).single().ok_or_else(|| {
            Error::MalformedAttribute(format!("timestamp out of range: {}", seconds))
        })?;

        let agent_name = parts.next().unwrap_or_default().to_string();

        let event_id = match parts.next() {
            None | Some("") => None,
            Some(id) => Some(Uuid::parse_str(id).map_err(|_| {
                Error::MalformedAttribute(format!("invalid event identifier: {}", id))
            })?),
        };

        Ok(Self {
            flags,
            timestamp,
            agent_name,
            event_id,
        })
    }

    /// Encode for writing back to the attribute
    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }
}

impl fmt::Display for QuarantineAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let event_id = self
            .event_id
            .map(|id| id.hyphenated().to_string().to_uppercase())
            .unwrap_or_default();
        write!(
            f,
            "{:04x};{:08x};{};{}",
            self.flags,
            self.timestamp.timestamp().max(0),
            self.agent_name,
            event_id
        )
    }
}
