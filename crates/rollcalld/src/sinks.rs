//! File-backed collaborators: roster rows from JSON, check-ins to JSONL,
//! engine events to the daemon log.

use std::path::PathBuf;

use async_trait::async_trait;
use rollcall_core::AttendanceRecord;
use rollcall_engine::{
    EventSink, PersistError, PersistenceSink, RosterRecord, RosterSource, RosterSourceError,
    ScanEvent,
};
use tokio::io::AsyncWriteExt;

/// Roster rows from a JSON file: an array of `students` rows
/// (`student_id`, `full_name`, `image_url`).
pub struct JsonRosterSource {
    path: PathBuf,
}

impl JsonRosterSource {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl RosterSource for JsonRosterSource {
    async fn fetch_records(&self) -> Result<Vec<RosterRecord>, RosterSourceError> {
        let raw = tokio::fs::read(&self.path)
            .await
            .map_err(|e| RosterSourceError::FetchFailed(format!("{}: {e}", self.path.display())))?;
        serde_json::from_slice(&raw)
            .map_err(|e| RosterSourceError::FetchFailed(format!("{}: {e}", self.path.display())))
    }
}

/// Best-effort attendance log: one JSON object per check-in, appended.
pub struct JsonlAttendanceSink {
    path: PathBuf,
}

impl JsonlAttendanceSink {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl PersistenceSink for JsonlAttendanceSink {
    async fn write_attendance(&self, record: &AttendanceRecord) -> Result<(), PersistError> {
        let mut line = serde_json::to_string(record)
            .map_err(|e| PersistError::WriteFailed(e.to_string()))?;
        line.push('\n');

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| PersistError::WriteFailed(e.to_string()))?;
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| PersistError::WriteFailed(format!("{}: {e}", self.path.display())))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| PersistError::WriteFailed(e.to_string()))
    }
}

/// Engine events rendered into the daemon log.
pub struct LogEventSink;

impl EventSink for LogEventSink {
    fn emit(&self, event: ScanEvent) {
        match event {
            ScanEvent::RosterLoaded { size, skipped } => {
                tracing::debug!(size, skipped, "roster loaded");
            }
            ScanEvent::SessionStarted { session_id } => {
                tracing::debug!(session = %session_id, "session started");
            }
            ScanEvent::SessionStopped { session_id } => {
                tracing::debug!(session = %session_id, "session stopped");
            }
            ScanEvent::NoFaces => {
                tracing::debug!("no faces this cycle");
            }
            ScanEvent::UnknownFaces { count } => {
                tracing::debug!(count, "unknown faces this cycle");
            }
            ScanEvent::FaceMatched {
                identity_id,
                display_name,
                distance,
                newly_recorded,
            } => {
                tracing::info!(
                    identity = %identity_id,
                    name = %display_name,
                    distance,
                    newly_recorded,
                    "face matched"
                );
            }
            ScanEvent::CheckinRecorded { record, total } => {
                tracing::info!(
                    identity = %record.identity_id,
                    name = %record.display_name,
                    total,
                    "check-in recorded"
                );
            }
            ScanEvent::CycleFailed { reason } => {
                tracing::warn!(%reason, "scan cycle failed");
            }
        }
    }
}
