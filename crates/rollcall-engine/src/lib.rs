//! rollcall-engine — The attendance engine and its collaborator contracts.
//!
//! The engine owns the roster snapshot, the attendance ledger, and the scan
//! session state machine, and drives the periodic detect/match/record loop.
//! Camera capture, face detection/embedding, durable persistence, and
//! display are all collaborators behind the traits in [`traits`].

pub mod engine;
pub mod events;
pub mod loader;
pub mod traits;

pub use engine::{AttendanceEngine, EngineConfig, EngineError, EngineStatus};
pub use events::{LastMatch, ScanEvent};
pub use loader::{derive_roster, RosterLoadReport};
pub use traits::{
    DetectOptions, DetectorError, EventSink, FaceDetector, Frame, PersistError, PersistenceSink,
    RosterRecord, RosterSource, RosterSourceError, VideoError, VideoSource,
};
