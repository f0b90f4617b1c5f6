use crate::types::Embedding;
use serde::{Deserialize, Serialize};

/// A known identity eligible for matching.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterEntry {
    pub identity_id: String,
    pub display_name: String,
    pub embedding: Embedding,
}

/// The current set of known identities.
///
/// Entries keep their load order and `identity_id` values are unique within
/// a snapshot. A roster is rebuilt wholesale on each load, never merged
/// incrementally, and is read-only while a scan session is active.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Roster {
    entries: Vec<RosterEntry>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry, replacing any existing entry with the same
    /// `identity_id` in place. The newest embedding wins.
    pub fn insert(&mut self, entry: RosterEntry) {
        match self
            .entries
            .iter_mut()
            .find(|e| e.identity_id == entry.identity_id)
        {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    pub fn entries(&self) -> &[RosterEntry] {
        &self.entries
    }

    pub fn get(&self, identity_id: &str) -> Option<&RosterEntry> {
        self.entries.iter().find(|e| e.identity_id == identity_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, name: &str, values: Vec<f32>) -> RosterEntry {
        RosterEntry {
            identity_id: id.into(),
            display_name: name.into(),
            embedding: Embedding::new(values),
        }
    }

    #[test]
    fn test_insert_preserves_order() {
        let mut roster = Roster::new();
        roster.insert(entry("S1", "Alice", vec![1.0]));
        roster.insert(entry("S2", "Bob", vec![2.0]));
        roster.insert(entry("S3", "Carol", vec![3.0]));

        let ids: Vec<_> = roster.entries().iter().map(|e| e.identity_id.as_str()).collect();
        assert_eq!(ids, ["S1", "S2", "S3"]);
    }

    #[test]
    fn test_insert_duplicate_replaces_in_place() {
        let mut roster = Roster::new();
        roster.insert(entry("S1", "Alice", vec![1.0]));
        roster.insert(entry("S2", "Bob", vec![2.0]));
        roster.insert(entry("S1", "Alice Updated", vec![9.0]));

        assert_eq!(roster.len(), 2);
        let first = &roster.entries()[0];
        assert_eq!(first.identity_id, "S1");
        assert_eq!(first.display_name, "Alice Updated");
        assert_eq!(first.embedding.values, vec![9.0]);
    }

    #[test]
    fn test_get() {
        let mut roster = Roster::new();
        roster.insert(entry("S1", "Alice", vec![1.0]));
        assert!(roster.get("S1").is_some());
        assert!(roster.get("S9").is_none());
    }
}
