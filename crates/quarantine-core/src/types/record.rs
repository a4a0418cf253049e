//! Quarantine record types

use crate::error::{Error, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A key of the quarantine properties dictionary known to LaunchServices.
///
/// Variant order is the order in which keys are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum QuarantineKey {
    AgentName,
    AgentBundleIdentifier,
    OriginUrl,
    DataUrl,
    TimeStamp,
    Type,
}

impl QuarantineKey {
    pub const ALL: [QuarantineKey; 6] = [
        QuarantineKey::AgentName,
        QuarantineKey::AgentBundleIdentifier,
        QuarantineKey::OriginUrl,
        QuarantineKey::DataUrl,
        QuarantineKey::TimeStamp,
        QuarantineKey::Type,
    ];

    /// The LaunchServices dictionary key
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AgentName => "LSQuarantineAgentName",
            Self::AgentBundleIdentifier => "LSQuarantineAgentBundleIdentifier",
            Self::OriginUrl => "LSQuarantineOriginURL",
            Self::DataUrl => "LSQuarantineDataURL",
            Self::TimeStamp => "LSQuarantineTimeStamp",
            Self::Type => "LSQuarantineType",
        }
    }

    /// Short names accepted on the command line
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Self::AgentName => &["agentName"],
            Self::AgentBundleIdentifier => &["bundleId", "agentBundleIdentifier"],
            Self::OriginUrl => &["originURL"],
            Self::DataUrl => &["dataURL", "itemURL"],
            Self::TimeStamp => &["timestamp"],
            Self::Type => &["type"],
        }
    }

    /// Resolve a user supplied key name.
    ///
    /// Canonical names must match exactly, aliases match case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| {
            key.as_str() == name
                || key.aliases().iter().any(|alias| alias.eq_ignore_ascii_case(name))
        })
    }
}

impl fmt::Display for QuarantineKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the quarantined item arrived on the system
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuarantineType {
    WebDownload,
    OtherDownload,
    EmailAttachment,
    InstantMessageAttachment,
    CalendarEventAttachment,
    OtherAttachment,
}

impl QuarantineType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WebDownload => "LSQuarantineTypeWebDownload",
            Self::OtherDownload => "LSQuarantineTypeOtherDownload",
            Self::EmailAttachment => "LSQuarantineTypeEmailAttachment",
            Self::InstantMessageAttachment => "LSQuarantineTypeInstantMessageAttachment",
            Self::CalendarEventAttachment => "LSQuarantineTypeCalendarEventAttachment",
            Self::OtherAttachment => "LSQuarantineTypeOtherAttachment",
        }
    }

    fn short_name(&self) -> &'static str {
        match self {
            Self::WebDownload => "web-download",
            Self::OtherDownload => "other-download",
            Self::EmailAttachment => "email-attachment",
            Self::InstantMessageAttachment => "instant-message-attachment",
            Self::CalendarEventAttachment => "calendar-event-attachment",
            Self::OtherAttachment => "other-attachment",
        }
    }

    /// Value of the `LSQuarantineTypeNumber` events database column
    pub fn number(&self) -> i64 {
        match self {
            Self::WebDownload => 0,
            Self::OtherDownload => 1,
            Self::EmailAttachment => 2,
            Self::InstantMessageAttachment => 3,
            Self::CalendarEventAttachment => 4,
            Self::OtherAttachment => 5,
        }
    }

    pub fn from_number(number: i64) -> Option<Self> {
        match number {
            0 => Some(Self::WebDownload),
            1 => Some(Self::OtherDownload),
            2 => Some(Self::EmailAttachment),
            3 => Some(Self::InstantMessageAttachment),
            4 => Some(Self::CalendarEventAttachment),
            5 => Some(Self::OtherAttachment),
            _ => None,
        }
    }

    const ALL: [QuarantineType; 6] = [
        Self::WebDownload,
        Self::OtherDownload,
        Self::EmailAttachment,
        Self::InstantMessageAttachment,
        Self::CalendarEventAttachment,
        Self::OtherAttachment,
    ];
}

impl fmt::Display for QuarantineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuarantineType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s || t.short_name().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::InvalidRecord(format!("unknown quarantine type: {}", s)))
    }
}

/// The quarantine properties attached to one path.
///
/// Presence of a record, even an empty one, means the path is quarantined.
/// Known keys live in `fields`; anything else is carried through `extra`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuarantineRecord {
    fields: BTreeMap<QuarantineKey, String>,
    extra: BTreeMap<String, String>,
}

impl QuarantineRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_agent_name(self, name: impl Into<String>) -> Self {
        self.with(QuarantineKey::AgentName, name)
    }

    pub fn with_bundle_id(self, bundle_id: impl Into<String>) -> Self {
        self.with(QuarantineKey::AgentBundleIdentifier, bundle_id)
    }

    pub fn with_origin_url(self, url: impl Into<String>) -> Self {
        self.with(QuarantineKey::OriginUrl, url)
    }

    pub fn with_data_url(self, url: impl Into<String>) -> Self {
        self.with(QuarantineKey::DataUrl, url)
    }

    pub fn with_timestamp(self, timestamp: DateTime<Utc>) -> Self {
        self.with(
            QuarantineKey::TimeStamp,
            timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
        )
    }

    pub fn with_type(self, quarantine_type: QuarantineType) -> Self {
        self.with(QuarantineKey::Type, quarantine_type.as_str())
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    fn with(mut self, key: QuarantineKey, value: impl Into<String>) -> Self {
        self.fields.insert(key, value.into());
        self
    }

    pub fn insert(&mut self, key: QuarantineKey, value: impl Into<String>) {
        self.fields.insert(key, value.into());
    }

    pub fn get(&self, key: QuarantineKey) -> Option<&str> {
        self.fields.get(&key).map(String::as_str)
    }

    pub fn agent_name(&self) -> Option<&str> {
        self.get(QuarantineKey::AgentName)
    }

    pub fn bundle_id(&self) -> Option<&str> {
        self.get(QuarantineKey::AgentBundleIdentifier)
    }

    pub fn origin_url(&self) -> Option<&str> {
        self.get(QuarantineKey::OriginUrl)
    }

    pub fn data_url(&self) -> Option<&str> {
        self.get(QuarantineKey::DataUrl)
    }

    /// Parsed timestamp; `None` when absent or not RFC 3339
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.get(QuarantineKey::TimeStamp)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|t| t.with_timezone(&Utc))
    }

    pub fn quarantine_type(&self) -> Option<QuarantineType> {
        self.get(QuarantineKey::Type).and_then(|s| s.parse().ok())
    }

    pub fn extra(&self) -> &BTreeMap<String, String> {
        &self.extra
    }

    /// Look up a value by user supplied name: known keys (or their aliases)
    /// first, then the extra bucket verbatim.
    pub fn lookup(&self, name: &str) -> Option<&str> {
        match QuarantineKey::from_name(name) {
            Some(key) => self.get(key),
            None => self.extra.get(name).map(String::as_str),
        }
    }

    /// All pairs, known keys in canonical order then extras by name
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .chain(self.extra.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }

    pub fn len(&self) -> usize {
        self.fields.len() + self.extra.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.extra.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_key_resolution() {
        assert_eq!(
            QuarantineKey::from_name("LSQuarantineOriginURL"),
            Some(QuarantineKey::OriginUrl)
        );
        assert_eq!(QuarantineKey::from_name("originURL"), Some(QuarantineKey::OriginUrl));
        assert_eq!(QuarantineKey::from_name("originurl"), Some(QuarantineKey::OriginUrl));
        assert_eq!(QuarantineKey::from_name("itemURL"), Some(QuarantineKey::DataUrl));
        assert_eq!(
            QuarantineKey::from_name("bundleId"),
            Some(QuarantineKey::AgentBundleIdentifier)
        );
        // canonical names are case sensitive
        assert_eq!(QuarantineKey::from_name("lsquarantineoriginurl"), None);
        assert_eq!(QuarantineKey::from_name("unknown"), None);
    }

    #[test]
    fn test_lookup_falls_back_to_extra() {
        let record = QuarantineRecord::new()
            .with_agent_name("Safari")
            .with_extra("LSQuarantineSenderName", "Alice");

        assert_eq!(record.lookup("agentName"), Some("Safari"));
        assert_eq!(record.lookup("LSQuarantineSenderName"), Some("Alice"));
        assert_eq!(record.lookup("bundleId"), None);
    }

    #[test]
    fn test_entries_order() {
        let record = QuarantineRecord::new()
            .with_extra("Zeta", "z")
            .with_origin_url("https://example.com")
            .with_agent_name("curl")
            .with_extra("Alpha", "a");

        let keys: Vec<&str> = record.entries().map(|(k, _)| k).collect();
        assert_eq!(
            keys,
            vec!["LSQuarantineAgentName", "LSQuarantineOriginURL", "Alpha", "Zeta"]
        );
        assert_eq!(record.len(), 4);
    }

    #[test]
    fn test_empty_record() {
        let record = QuarantineRecord::new();
        assert!(record.is_empty());
        assert_eq!(record.entries().count(), 0);
    }

    #[test]
    fn test_timestamp_and_type() {
        let when = Utc.with_ymd_and_hms(2020, 8, 17, 12, 30, 0).unwrap();
        let record = QuarantineRecord::new()
            .with_timestamp(when)
            .with_type(QuarantineType::EmailAttachment);

        assert_eq!(record.get(QuarantineKey::TimeStamp), Some("2020-08-17T12:30:00Z"));
        assert_eq!(record.timestamp(), Some(when));
        assert_eq!(record.quarantine_type(), Some(QuarantineType::EmailAttachment));
    }

    #[test]
    fn test_type_parsing() {
        assert_eq!("web-download".parse::<QuarantineType>().unwrap(), QuarantineType::WebDownload);
        assert_eq!(
            "LSQuarantineTypeOtherAttachment".parse::<QuarantineType>().unwrap(),
            QuarantineType::OtherAttachment
        );
        assert!("carrier-pigeon".parse::<QuarantineType>().is_err());

        for number in 0..6 {
            let t = QuarantineType::from_number(number).unwrap();
            assert_eq!(t.number(), number);
        }
        assert_eq!(QuarantineType::from_number(42), None);
    }
}
