//! The attendance engine: owns the roster snapshot, the attendance ledger,
//! and the scan session, and drives the periodic detect/match/record loop.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use rollcall_core::{
    export, AttendanceLedger, AttendanceRecord, EuclideanMatcher, Matcher, Roster,
};

use crate::events::{LastMatch, ScanEvent};
use crate::loader::{derive_roster, RosterLoadReport};
use crate::traits::{
    DetectOptions, DetectorError, EventSink, FaceDetector, PersistenceSink, RosterSource,
    RosterSourceError, VideoError, VideoSource,
};

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("roster is empty; load a roster before starting a scan")]
    EmptyRoster,
    #[error("a scan session is already active")]
    AlreadyScanning,
    #[error("cannot reload the roster while a scan session is active")]
    ScanInProgress,
    #[error("roster source error: {0}")]
    RosterSource(#[from] RosterSourceError),
}

/// Engine tuning. Every knob has a working default; the match threshold can
/// also be adjusted at runtime via [`AttendanceEngine::set_match_threshold`].
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum accepted embedding distance for a positive match.
    pub match_threshold: f32,
    /// Pause between scan cycles.
    pub scan_interval: Duration,
    pub detect_options: DetectOptions,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            match_threshold: 0.6,
            scan_interval: Duration::from_millis(900),
            detect_options: DetectOptions::default(),
        }
    }
}

/// Point-in-time engine state, serialized for the control surface.
#[derive(Debug, Clone, serde::Serialize)]
pub struct EngineStatus {
    pub scanning: bool,
    pub session_id: Option<String>,
    pub roster_size: usize,
    pub checkin_count: usize,
    pub match_threshold: f32,
    pub scan_interval_ms: u64,
    pub last_match: Option<LastMatch>,
}

enum SessionState {
    Idle,
    Scanning {
        id: Uuid,
        cancel: CancellationToken,
        task: JoinHandle<()>,
    },
}

/// State shared with the scan loop task.
struct Shared {
    detector: Arc<dyn FaceDetector>,
    video: Arc<dyn VideoSource>,
    persistence: Arc<dyn PersistenceSink>,
    events: Arc<dyn EventSink>,
    roster: RwLock<Arc<Roster>>,
    /// Mutated only by scan iterations, via the atomic check-then-set.
    ledger: Mutex<AttendanceLedger>,
    last_match: Mutex<Option<LastMatch>>,
    match_threshold: RwLock<f32>,
    scan_interval: Duration,
    detect_options: DetectOptions,
}

/// The matching-and-attendance engine.
///
/// Constructed once per process with its collaborators, then driven through
/// `load_roster` / `start` / `stop`. At most one scan session is active at a
/// time, and the roster is read-only while one is.
pub struct AttendanceEngine {
    shared: Arc<Shared>,
    session: Mutex<SessionState>,
}

impl AttendanceEngine {
    pub fn new(
        config: EngineConfig,
        detector: Arc<dyn FaceDetector>,
        video: Arc<dyn VideoSource>,
        persistence: Arc<dyn PersistenceSink>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                detector,
                video,
                persistence,
                events,
                roster: RwLock::new(Arc::new(Roster::new())),
                ledger: Mutex::new(AttendanceLedger::new()),
                last_match: Mutex::new(None),
                match_threshold: RwLock::new(config.match_threshold),
                scan_interval: config.scan_interval,
                detect_options: config.detect_options,
            }),
            session: Mutex::new(SessionState::Idle),
        }
    }

    /// Replace the active roster from `source`.
    ///
    /// Rejected while a scan session is active. A failed fetch aborts with
    /// no state change; per-row derivation failures skip the row. The
    /// previous roster is replaced wholesale, never merged.
    pub async fn load_roster(
        &self,
        source: &dyn RosterSource,
    ) -> Result<RosterLoadReport, EngineError> {
        if !matches!(*self.session.lock(), SessionState::Idle) {
            return Err(EngineError::ScanInProgress);
        }

        let records = source.fetch_records().await?;
        let (roster, report) = derive_roster(&records, self.shared.detector.as_ref()).await;

        {
            // Re-check under the session lock: a session may have started
            // while embeddings were being derived. Its snapshot stays
            // untouched either way; the swap is what must not happen.
            let session = self.session.lock();
            if !matches!(*session, SessionState::Idle) {
                return Err(EngineError::ScanInProgress);
            }
            *self.shared.roster.write() = Arc::new(roster);
        }

        tracing::info!(
            loaded = report.loaded,
            skipped = report.skipped,
            "roster replaced"
        );
        self.shared.events.emit(ScanEvent::RosterLoaded {
            size: report.loaded,
            skipped: report.skipped,
        });
        Ok(report)
    }

    /// Start a scan session.
    ///
    /// Guards: a non-empty roster and no active session. The session runs
    /// against the roster snapshot taken here, at a fixed period, until
    /// [`stop`](Self::stop).
    pub fn start(&self) -> Result<Uuid, EngineError> {
        let mut session = self.session.lock();
        if matches!(*session, SessionState::Scanning { .. }) {
            return Err(EngineError::AlreadyScanning);
        }

        let roster = Arc::clone(&self.shared.roster.read());
        if roster.is_empty() {
            return Err(EngineError::EmptyRoster);
        }

        let id = Uuid::new_v4();
        let cancel = CancellationToken::new();
        let task = tokio::spawn(run_loop(
            Arc::clone(&self.shared),
            roster,
            cancel.clone(),
            id,
        ));
        *session = SessionState::Scanning { id, cancel, task };

        tracing::info!(session = %id, "scan session started");
        self.shared
            .events
            .emit(ScanEvent::SessionStarted { session_id: id });
        Ok(id)
    }

    /// Stop the active scan session, if any.
    ///
    /// Cooperative: signals cancellation and waits for the loop task. An
    /// in-flight detection call is allowed to resolve, but once cancellation
    /// is observed the cycle writes nothing. Returns whether a session was
    /// actually stopped; stopping while idle is a no-op.
    pub async fn stop(&self) -> bool {
        let state = std::mem::replace(&mut *self.session.lock(), SessionState::Idle);
        match state {
            SessionState::Idle => false,
            SessionState::Scanning { id, cancel, task } => {
                cancel.cancel();
                if let Err(e) = task.await {
                    tracing::error!(session = %id, error = %e, "scan loop task failed to join");
                }
                tracing::info!(session = %id, "scan session stopped");
                self.shared
                    .events
                    .emit(ScanEvent::SessionStopped { session_id: id });
                true
            }
        }
    }

    pub fn status(&self) -> EngineStatus {
        let session_id = match &*self.session.lock() {
            SessionState::Idle => None,
            SessionState::Scanning { id, .. } => Some(id.to_string()),
        };
        EngineStatus {
            scanning: session_id.is_some(),
            session_id,
            roster_size: self.shared.roster.read().len(),
            checkin_count: self.shared.ledger.lock().count(),
            match_threshold: *self.shared.match_threshold.read(),
            scan_interval_ms: self.shared.scan_interval.as_millis() as u64,
            last_match: self.shared.last_match.lock().clone(),
        }
    }

    pub fn roster_size(&self) -> usize {
        self.shared.roster.read().len()
    }

    /// Check-ins so far, in first-seen order.
    pub fn checkins(&self) -> Vec<AttendanceRecord> {
        self.shared.ledger.lock().list().to_vec()
    }

    pub fn checkin_count(&self) -> usize {
        self.shared.ledger.lock().count()
    }

    /// CSV bytes of the current ledger, ready for download.
    pub fn export_csv(&self) -> Vec<u8> {
        export::csv_bytes(self.shared.ledger.lock().list())
    }

    pub fn match_threshold(&self) -> f32 {
        *self.shared.match_threshold.read()
    }

    /// Adjust the acceptance threshold; takes effect from the next cycle.
    pub fn set_match_threshold(&self, threshold: f32) {
        *self.shared.match_threshold.write() = threshold;
        tracing::info!(threshold, "match threshold updated");
    }
}

impl Drop for AttendanceEngine {
    fn drop(&mut self) {
        // Dropping the engine mid-session: signal the detached loop task so
        // it exits at its next cancellation check.
        if let SessionState::Scanning { cancel, .. } = &*self.session.lock() {
            cancel.cancel();
        }
    }
}

#[derive(Error, Debug)]
enum CycleError {
    #[error("video error: {0}")]
    Video(#[from] VideoError),
    #[error("detector error: {0}")]
    Detector(#[from] DetectorError),
}

/// The scan loop task: one iteration per tick, never overlapping, until
/// cancelled. Per-cycle failures are reported and the loop keeps going.
async fn run_loop(
    shared: Arc<Shared>,
    roster: Arc<Roster>,
    cancel: CancellationToken,
    session_id: Uuid,
) {
    let period = shared.scan_interval;
    // First cycle fires one period after start. Delayed ticks (a detection
    // outlasting the period) push the schedule back instead of bunching up,
    // so iterations never overlap.
    let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }
        // The tick may have won the race against an already-signalled stop.
        if cancel.is_cancelled() {
            break;
        }
        if let Err(e) = scan_once(&shared, &roster, &cancel).await {
            tracing::warn!(session = %session_id, error = %e, "scan cycle failed");
            shared.events.emit(ScanEvent::CycleFailed {
                reason: e.to_string(),
            });
        }
    }

    tracing::debug!(session = %session_id, "scan loop exited");
}

/// One detect/match/record cycle.
async fn scan_once(
    shared: &Shared,
    roster: &Roster,
    cancel: &CancellationToken,
) -> Result<(), CycleError> {
    let Some(frame) = shared.video.current_frame().await? else {
        // Capture temporarily unavailable; skip the cycle.
        return Ok(());
    };

    let faces = shared
        .detector
        .detect_faces(&frame, &shared.detect_options)
        .await?;

    // A stop issued while detection was outstanding wins: no display
    // updates, no ledger writes, no persistence.
    if cancel.is_cancelled() {
        return Ok(());
    }

    if faces.is_empty() {
        shared.events.emit(ScanEvent::NoFaces);
        return Ok(());
    }

    let threshold = *shared.match_threshold.read();
    let mut unknown = 0usize;

    for face in &faces {
        let Some(hit) = EuclideanMatcher.best_match(&face.embedding, roster, threshold) else {
            unknown += 1;
            continue;
        };

        if cancel.is_cancelled() {
            return Ok(());
        }

        let now = Utc::now();
        *shared.last_match.lock() = Some(LastMatch {
            identity_id: hit.entry.identity_id.clone(),
            display_name: hit.entry.display_name.clone(),
            distance: hit.distance,
            observed_at: now,
        });

        let (inserted, total) = {
            let mut ledger = shared.ledger.lock();
            let inserted =
                ledger.record_if_absent(&hit.entry.identity_id, &hit.entry.display_name, now);
            (inserted, ledger.count())
        };

        shared.events.emit(ScanEvent::FaceMatched {
            identity_id: hit.entry.identity_id.clone(),
            display_name: hit.entry.display_name.clone(),
            distance: hit.distance,
            newly_recorded: inserted,
        });

        if inserted {
            let record = AttendanceRecord {
                identity_id: hit.entry.identity_id.clone(),
                display_name: hit.entry.display_name.clone(),
                checkin_time: now,
            };
            shared.events.emit(ScanEvent::CheckinRecorded {
                record: record.clone(),
                total,
            });
            spawn_persist(shared, record);
        }
    }

    if unknown > 0 {
        shared.events.emit(ScanEvent::UnknownFaces { count: unknown });
    }

    Ok(())
}

/// Fire-and-forget persistence write.
///
/// Never awaited by the scan loop; a failure is logged and the in-memory
/// check-in stands.
fn spawn_persist(shared: &Shared, record: AttendanceRecord) {
    let sink = Arc::clone(&shared.persistence);
    tokio::spawn(async move {
        if let Err(e) = sink.write_attendance(&record).await {
            tracing::warn!(
                identity = %record.identity_id,
                error = %e,
                "attendance persistence failed"
            );
        }
    });
}
