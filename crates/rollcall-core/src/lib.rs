//! rollcall-core — Matching and attendance primitives.
//!
//! Nearest-neighbor embedding matching against a roster of known identities,
//! the at-most-once-per-session attendance ledger, and CSV export of the
//! ledger. Pure data and logic: capture, inference, and persistence live
//! behind the collaborator traits in `rollcall-engine`.

pub mod export;
pub mod ledger;
pub mod matcher;
pub mod roster;
pub mod types;

pub use ledger::{AttendanceLedger, AttendanceRecord};
pub use matcher::{EuclideanMatcher, MatchHit, Matcher};
pub use roster::{Roster, RosterEntry};
pub use types::{BoundingBox, DetectedFace, Embedding};
