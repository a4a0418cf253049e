//! Quarantine event rows

use super::{QuarantineKey, QuarantineRecord, QuarantineType};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Extra keys persisted in the events database alongside the known ones
pub const SENDER_NAME_KEY: &str = "LSQuarantineSenderName";
pub const SENDER_ADDRESS_KEY: &str = "LSQuarantineSenderAddress";
pub const ORIGIN_TITLE_KEY: &str = "LSQuarantineOriginTitle";

/// One row of the LaunchServices quarantine events table
#[derive(Debug, Clone, PartialEq)]
pub struct QuarantineEvent {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub agent_bundle_id: Option<String>,
    pub agent_name: Option<String>,
    pub data_url: Option<String>,
    pub origin_url: Option<String>,
    pub quarantine_type: Option<QuarantineType>,
    pub sender_name: Option<String>,
    pub sender_address: Option<String>,
    pub origin_title: Option<String>,
}

impl QuarantineEvent {
    /// Build the event row describing `record`
    pub fn from_record(id: Uuid, timestamp: DateTime<Utc>, record: &QuarantineRecord) -> Self {
        let owned = |key: QuarantineKey| record.get(key).map(str::to_string);
        let extra = |key: &str| record.extra().get(key).cloned();

        Self {
            id,
            timestamp,
            agent_bundle_id: owned(QuarantineKey::AgentBundleIdentifier),
            agent_name: owned(QuarantineKey::AgentName),
            data_url: owned(QuarantineKey::DataUrl),
            origin_url: owned(QuarantineKey::OriginUrl),
            quarantine_type: record.quarantine_type(),
            sender_name: extra(SENDER_NAME_KEY),
            sender_address: extra(SENDER_ADDRESS_KEY),
            origin_title: extra(ORIGIN_TITLE_KEY),
        }
    }

    /// Copy the fields this row knows about into `record`.
    ///
    /// Agent name and timestamp come from the attribute itself and are left
    /// alone.
    pub fn merge_into(&self, mut record: QuarantineRecord) -> QuarantineRecord {
        if let Some(bundle_id) = &self.agent_bundle_id {
            record.insert(QuarantineKey::AgentBundleIdentifier, bundle_id.clone());
        }
        if let Some(origin_url) = &self.origin_url {
            record.insert(QuarantineKey::OriginUrl, origin_url.clone());
        }
        if let Some(data_url) = &self.data_url {
            record.insert(QuarantineKey::DataUrl, data_url.clone());
        }
        if let Some(quarantine_type) = self.quarantine_type {
            record.insert(QuarantineKey::Type, quarantine_type.as_str());
        }

        let extras = [
            (SENDER_NAME_KEY, &self.sender_name),
            (SENDER_ADDRESS_KEY, &self.sender_address),
            (ORIGIN_TITLE_KEY, &self.origin_title),
        ];
        for (key, value) in extras {
            if let Some(value) = value {
                record = record.with_extra(key, value.clone());
            }
        }

        record
    }
}
