use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A single check-in. Created once per identity per session, never updated
/// or removed afterwards.
///
/// Serialized field names follow the upstream attendance schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceRecord {
    #[serde(rename = "student_id")]
    pub identity_id: String,
    #[serde(rename = "full_name")]
    pub display_name: String,
    pub checkin_time: DateTime<Utc>,
}

/// The session's record of who has checked in and when.
///
/// First write wins: repeat sightings of an identity leave the original
/// record untouched. Records keep first-seen order and live for the whole
/// session; the only way to clear the ledger is to drop it.
#[derive(Debug, Default)]
pub struct AttendanceLedger {
    records: Vec<AttendanceRecord>,
    seen: HashSet<String>,
}

impl AttendanceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a check-in unless this identity already has one.
    ///
    /// Atomic check-then-set: returns `true` when a new record was inserted
    /// with `checkin_time = now`, `false` when the identity was already
    /// present (no mutation).
    pub fn record_if_absent(
        &mut self,
        identity_id: &str,
        display_name: &str,
        now: DateTime<Utc>,
    ) -> bool {
        if self.seen.contains(identity_id) {
            return false;
        }
        self.seen.insert(identity_id.to_string());
        self.records.push(AttendanceRecord {
            identity_id: identity_id.to_string(),
            display_name: display_name.to_string(),
            checkin_time: now,
        });
        true
    }

    /// Records in first-seen order.
    pub fn list(&self) -> &[AttendanceRecord] {
        &self.records
    }

    pub fn get(&self, identity_id: &str) -> Option<&AttendanceRecord> {
        self.records.iter().find(|r| r.identity_id == identity_id)
    }

    pub fn count(&self) -> usize {
        self.records.len()
    }
}
