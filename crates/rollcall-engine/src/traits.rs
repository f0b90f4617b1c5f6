//! Collaborator contracts: everything the engine observes or drives but
//! does not implement itself.

use async_trait::async_trait;
use rollcall_core::{AttendanceRecord, DetectedFace, Embedding};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::events::ScanEvent;

/// A captured grayscale camera frame, row-major.
#[derive(Debug, Clone)]
pub struct Frame {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Detector tuning passed through to the inference backend.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DetectOptions {
    /// Minimum detection confidence.
    pub min_score: f32,
    /// Square input size the detector scales frames to.
    pub input_size: u32,
}

impl Default for DetectOptions {
    fn default() -> Self {
        Self {
            min_score: 0.5,
            input_size: 256,
        }
    }
}

#[derive(Error, Debug)]
pub enum DetectorError {
    #[error("inference backend unavailable: {0}")]
    BackendUnavailable(String),
    #[error("inference failed: {0}")]
    InferenceFailed(String),
}

/// Face detection and embedding extraction, supplied by an external backend.
///
/// Failures are per-call: one failed detection never poisons the backend.
#[async_trait]
pub trait FaceDetector: Send + Sync {
    /// Detect all faces in a frame and extract an embedding for each.
    async fn detect_faces(
        &self,
        frame: &Frame,
        options: &DetectOptions,
    ) -> Result<Vec<DetectedFace>, DetectorError>;

    /// Derive one embedding from a reference image, used during roster load.
    ///
    /// `Ok(None)` means the image yielded no detectable face.
    async fn embed_single_face(&self, image_ref: &str)
        -> Result<Option<Embedding>, DetectorError>;
}

#[derive(Error, Debug)]
pub enum VideoError {
    #[error("frame capture failed: {0}")]
    CaptureFailed(String),
}

/// On-demand access to the current video frame. Camera selection and
/// format negotiation happen before scanning starts.
#[async_trait]
pub trait VideoSource: Send + Sync {
    /// The current frame, or `None` while capture is temporarily unavailable.
    async fn current_frame(&self) -> Result<Option<Frame>, VideoError>;
}

#[derive(Error, Debug)]
pub enum PersistError {
    #[error("attendance write failed: {0}")]
    WriteFailed(String),
}

/// Downstream store for check-ins.
///
/// Best-effort: the engine fires writes and forgets them. A failed write is
/// logged and never rolls back the in-memory check-in.
#[async_trait]
pub trait PersistenceSink: Send + Sync {
    async fn write_attendance(&self, record: &AttendanceRecord) -> Result<(), PersistError>;
}

#[derive(Error, Debug)]
pub enum RosterSourceError {
    #[error("roster fetch failed: {0}")]
    FetchFailed(String),
}

/// One row of the roster source (the upstream `students` table).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterRecord {
    #[serde(rename = "student_id")]
    pub identity_id: String,
    #[serde(rename = "full_name")]
    pub display_name: String,
    #[serde(rename = "image_url")]
    pub image_ref: String,
}

/// Read-only source of roster rows.
#[async_trait]
pub trait RosterSource: Send + Sync {
    async fn fetch_records(&self) -> Result<Vec<RosterRecord>, RosterSourceError>;
}

/// Observational sink for engine events; purely informational.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: ScanEvent);
}
