use crate::roster::{Roster, RosterEntry};
use crate::types::Embedding;

/// Result of matching a probe embedding against the roster: the nearest
/// entry and its distance.
#[derive(Debug, Clone)]
pub struct MatchHit<'a> {
    pub entry: &'a RosterEntry,
    pub distance: f32,
}

/// Strategy for comparing a probe embedding against a roster of known
/// identities.
pub trait Matcher {
    fn best_match<'a>(
        &self,
        probe: &Embedding,
        roster: &'a Roster,
        threshold: f32,
    ) -> Option<MatchHit<'a>>;
}

/// Euclidean nearest-neighbor matcher with an inclusive acceptance threshold.
///
/// The entry at the strictly smallest distance wins; on an exact tie the
/// earlier roster entry is kept. An empty roster and a nearest distance
/// above `threshold` are both "no match", never an error.
pub struct EuclideanMatcher;

impl Matcher for EuclideanMatcher {
    fn best_match<'a>(
        &self,
        probe: &Embedding,
        roster: &'a Roster,
        threshold: f32,
    ) -> Option<MatchHit<'a>> {
        let mut best: Option<MatchHit<'a>> = None;

        for entry in roster.entries() {
            let distance = probe.euclidean_distance(&entry.embedding);
            let closer = match &best {
                None => true,
                Some(hit) => distance < hit.distance,
            };
            if closer {
                best = Some(MatchHit { entry, distance });
            }
        }

        best.filter(|hit| hit.distance <= threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster_at_distances(values: &[f32]) -> Roster {
        // 1-D embeddings: distance from a probe at 0.0 equals the value.
        let mut roster = Roster::new();
        for (i, v) in values.iter().enumerate() {
            roster.insert(RosterEntry {
                identity_id: format!("S{i}"),
                display_name: format!("Person {i}"),
                embedding: Embedding::new(vec![*v]),
            });
        }
        roster
    }

    fn probe() -> Embedding {
        Embedding::new(vec![0.0])
    }

    #[test]
    fn test_nearest_wins() {
        let roster = roster_at_distances(&[0.9, 0.3, 0.5]);
        let hit = EuclideanMatcher
            .best_match(&probe(), &roster, 0.6)
            .expect("nearest entry is within threshold");
        assert_eq!(hit.entry.identity_id, "S1");
        assert_eq!(hit.distance, 0.3);
    }

    #[test]
    fn test_no_match_above_threshold() {
        // One entry is nearest, but even it is too far away.
        let roster = roster_at_distances(&[0.9, 0.8]);
        assert!(EuclideanMatcher.best_match(&probe(), &roster, 0.6).is_none());
    }

    #[test]
    fn test_empty_roster_is_no_match() {
        let roster = Roster::new();
        assert!(EuclideanMatcher.best_match(&probe(), &roster, 0.6).is_none());
        assert!(EuclideanMatcher
            .best_match(&probe(), &roster, f32::MAX)
            .is_none());
    }

    #[test]
    fn test_threshold_is_inclusive() {
        // 3-4-5 triangle gives an exact distance of 5.0.
        let mut roster = Roster::new();
        roster.insert(RosterEntry {
            identity_id: "S0".into(),
            display_name: "Exact".into(),
            embedding: Embedding::new(vec![3.0, 4.0]),
        });
        let probe = Embedding::new(vec![0.0, 0.0]);

        let hit = EuclideanMatcher.best_match(&probe, &roster, 5.0);
        assert_eq!(hit.expect("distance == threshold matches").distance, 5.0);

        assert!(EuclideanMatcher.best_match(&probe, &roster, 4.99).is_none());
    }

    #[test]
    fn test_tie_keeps_first_entry() {
        let roster = roster_at_distances(&[0.5, 0.5]);
        let hit = EuclideanMatcher
            .best_match(&probe(), &roster, 0.6)
            .expect("tied entries are within threshold");
        assert_eq!(hit.entry.identity_id, "S0");
    }
}
