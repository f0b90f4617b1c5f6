//! Roster derivation: source rows in, embeddings out.

use crate::traits::{FaceDetector, RosterRecord};
use rollcall_core::{Roster, RosterEntry};
use serde::Serialize;

/// Outcome of a roster load.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RosterLoadReport {
    /// Usable entries in the new roster.
    pub loaded: usize,
    /// Source rows skipped because no embedding could be derived.
    pub skipped: usize,
}

/// Derive a roster from source rows, one embedding per identity.
///
/// Rows whose image yields no detectable face, and rows whose embedding
/// derivation fails outright, are skipped and counted, never fatal. A row
/// repeating an earlier `identity_id` replaces it. A load with zero usable
/// rows still succeeds; callers gate scanning on roster size.
pub async fn derive_roster(
    records: &[RosterRecord],
    detector: &dyn FaceDetector,
) -> (Roster, RosterLoadReport) {
    let mut roster = Roster::new();
    let mut skipped = 0usize;

    for record in records {
        match detector.embed_single_face(&record.image_ref).await {
            Ok(Some(embedding)) => {
                roster.insert(RosterEntry {
                    identity_id: record.identity_id.clone(),
                    display_name: record.display_name.clone(),
                    embedding,
                });
            }
            Ok(None) => {
                tracing::warn!(
                    identity = %record.identity_id,
                    image = %record.image_ref,
                    "no detectable face in roster image; skipping"
                );
                skipped += 1;
            }
            Err(e) => {
                tracing::warn!(
                    identity = %record.identity_id,
                    error = %e,
                    "failed to derive roster embedding; skipping"
                );
                skipped += 1;
            }
        }
    }

    let report = RosterLoadReport {
        loaded: roster.len(),
        skipped,
    };
    (roster, report)
}
