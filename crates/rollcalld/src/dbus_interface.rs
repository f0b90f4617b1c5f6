use std::sync::Arc;

use rollcall_engine::{AttendanceEngine, EngineError, RosterSource};
use zbus::interface;

/// D-Bus control surface for the attendance daemon.
///
/// Bus name: org.rollcall.Attendance1
/// Object path: /org/rollcall/Attendance1
pub struct AttendanceService {
    engine: Arc<AttendanceEngine>,
    roster_source: Arc<dyn RosterSource>,
}

impl AttendanceService {
    pub fn new(engine: Arc<AttendanceEngine>, roster_source: Arc<dyn RosterSource>) -> Self {
        Self {
            engine,
            roster_source,
        }
    }
}

fn engine_error(e: EngineError) -> zbus::fdo::Error {
    zbus::fdo::Error::Failed(e.to_string())
}

#[interface(name = "org.rollcall.Attendance1")]
impl AttendanceService {
    /// Rebuild the roster from the configured source.
    /// Returns a JSON report: {"loaded": n, "skipped": m}.
    async fn load_roster(&self) -> zbus::fdo::Result<String> {
        tracing::info!("roster load requested");
        let report = self
            .engine
            .load_roster(self.roster_source.as_ref())
            .await
            .map_err(engine_error)?;
        Ok(serde_json::json!({
            "loaded": report.loaded,
            "skipped": report.skipped,
        })
        .to_string())
    }

    /// Start a scan session; returns the session id.
    async fn start_scan(&self) -> zbus::fdo::Result<String> {
        tracing::info!("scan start requested");
        let id = self.engine.start().map_err(engine_error)?;
        Ok(id.to_string())
    }

    /// Stop the active scan session. Returns false when none was active.
    async fn stop_scan(&self) -> zbus::fdo::Result<bool> {
        tracing::info!("scan stop requested");
        Ok(self.engine.stop().await)
    }

    /// Engine status as JSON.
    async fn status(&self) -> zbus::fdo::Result<String> {
        serde_json::to_string(&self.engine.status())
            .map_err(|e| zbus::fdo::Error::Failed(e.to_string()))
    }

    /// Check-ins so far as a JSON array, in first-seen order.
    async fn list_checkins(&self) -> zbus::fdo::Result<String> {
        serde_json::to_string(&self.engine.checkins())
            .map_err(|e| zbus::fdo::Error::Failed(e.to_string()))
    }

    /// The attendance ledger as CSV bytes, ready for download.
    async fn export_csv(&self) -> zbus::fdo::Result<Vec<u8>> {
        Ok(self.engine.export_csv())
    }

    /// Adjust the match threshold; applies from the next scan cycle.
    async fn set_threshold(&self, threshold: f64) -> zbus::fdo::Result<()> {
        self.engine.set_match_threshold(threshold as f32);
        Ok(())
    }
}
