use chrono::{DateTime, Utc};
use rollcall_core::AttendanceRecord;
use serde::Serialize;
use uuid::Uuid;

/// Reporting events emitted by the engine for external display.
#[derive(Debug, Clone)]
pub enum ScanEvent {
    /// A roster load finished: `size` usable entries, `skipped` rows dropped.
    RosterLoaded { size: usize, skipped: usize },
    SessionStarted { session_id: Uuid },
    SessionStopped { session_id: Uuid },
    /// Detection ran and found no faces this cycle.
    NoFaces,
    /// Faces were present but none matched the roster this cycle.
    UnknownFaces { count: usize },
    /// A face matched a roster entry, whether or not it was a new check-in.
    FaceMatched {
        identity_id: String,
        display_name: String,
        distance: f32,
        newly_recorded: bool,
    },
    /// A new check-in landed in the ledger.
    CheckinRecorded {
        record: AttendanceRecord,
        total: usize,
    },
    /// A cycle failed; the loop continues at the next tick.
    CycleFailed { reason: String },
}

/// The most recent positive match, kept for display.
///
/// Updated on every match, including repeat sightings of an identity that
/// is already in the ledger.
#[derive(Debug, Clone, Serialize)]
pub struct LastMatch {
    pub identity_id: String,
    pub display_name: String,
    pub distance: f32,
    pub observed_at: DateTime<Utc>,
}
