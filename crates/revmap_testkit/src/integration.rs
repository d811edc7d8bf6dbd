//! Cross-crate integration test helpers.
//!
//! [`MapHarness`] keeps a reference model of everything written to a map
//! and checks snapshot reads against it.

use crate::fixtures::{signed_root, TestMap};
use crate::generators::RevisionWrites;
use revmap_core::{KeyHash, MapLeaf, MapReader, MapWriter, Revision};
use std::collections::BTreeMap;

/// A test harness that mirrors a map's full leaf history.
pub struct MapHarness {
    /// The map under test.
    pub map: TestMap,
    /// Per key, every write by revision. `None` is a tombstone.
    history: BTreeMap<KeyHash, BTreeMap<Revision, Option<Vec<u8>>>>,
    /// Revision of the latest committed root.
    revision: Revision,
}

impl MapHarness {
    /// Creates a harness over an in-memory map.
    pub fn new() -> Self {
        Self::with_map(TestMap::memory())
    }

    /// Creates a harness over `map`, which must be empty.
    pub fn with_map(map: TestMap) -> Self {
        Self {
            map,
            history: BTreeMap::new(),
            revision: Revision::ZERO,
        }
    }

    /// Returns the revision of the latest committed root.
    pub fn revision(&self) -> Revision {
        self.revision
    }

    /// Writes `writes` in one transaction, stores the next root and commits.
    pub fn commit(&mut self, writes: &RevisionWrites) -> Revision {
        let mut tx = self.map.begin().expect("Failed to begin transaction");
        let revision = tx.write_revision();
        assert_eq!(Some(revision), self.revision.checked_next(), "write revision skipped");

        for (key, value) in writes {
            let leaf = match value {
                Some(bytes) => MapLeaf::new(key.clone(), bytes.clone()),
                None => MapLeaf::tombstone(key.clone()),
            };
            tx.set(key, &leaf).expect("Failed to set leaf");
        }
        tx.store_signed_map_root(&signed_root(revision, revision.as_i64()))
            .expect("Failed to store root");
        tx.commit().expect("Failed to commit");

        for (key, value) in writes {
            self.history
                .entry(key.clone())
                .or_default()
                .insert(revision, value.clone());
        }
        self.revision = revision;
        revision
    }

    /// Returns the value the model expects for `key` at `revision`.
    pub fn expected(&self, key: &KeyHash, revision: Revision) -> Option<&[u8]> {
        self.history
            .get(key)?
            .range(..=revision)
            .next_back()
            .and_then(|(_, value)| value.as_deref())
    }

    /// Reads every known key at `revision` in one batch and compares the
    /// result with the model.
    pub fn verify_at(&self, revision: Revision) {
        let keys: Vec<KeyHash> = self.history.keys().cloned().collect();
        let snapshot = self.map.snapshot().expect("Failed to open snapshot");
        let leaves = snapshot.get(revision, &keys).expect("Failed to get leaves");

        let actual: BTreeMap<&KeyHash, &[u8]> = leaves
            .iter()
            .map(|leaf| (&leaf.key_hash, leaf.leaf_value.as_slice()))
            .collect();
        assert_eq!(actual.len(), leaves.len(), "duplicate key in result");

        for key in &keys {
            assert_eq!(
                actual.get(key).copied(),
                self.expected(key, revision),
                "Leaf mismatch for {key} at {revision}"
            );
        }
    }

    /// Verifies every revision from before the first root to one past the
    /// latest.
    pub fn verify_all(&self) {
        for revision in 0..=self.revision.as_i64() + 1 {
            self.verify_at(Revision::new(revision));
        }
    }
}

impl Default for MapHarness {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::key_hash;
    use crate::generators::{history_strategy, key_hash_strategy, PropTestConfig};
    use proptest::prelude::*;

    fn writes(pairs: &[(&str, Option<&str>)]) -> RevisionWrites {
        pairs
            .iter()
            .map(|(label, value)| (key_hash(label), value.map(|v| v.as_bytes().to_vec())))
            .collect()
    }

    #[test]
    fn overwrite_and_tombstone() {
        let mut harness = MapHarness::new();
        harness.commit(&writes(&[("a", Some("1")), ("b", Some("x"))]));
        harness.commit(&writes(&[("a", Some("2"))]));
        harness.commit(&writes(&[("a", None)]));
        harness.commit(&writes(&[("a", Some("3"))]));

        assert_eq!(harness.expected(&key_hash("a"), Revision::new(3)), None);
        assert_eq!(
            harness.expected(&key_hash("b"), Revision::new(4)),
            Some(&b"x"[..])
        );
        harness.verify_all();
    }

    #[test]
    fn file_map_history() {
        let mut harness = MapHarness::with_map(TestMap::file());
        harness.commit(&writes(&[("k", Some("old"))]));
        harness.commit(&writes(&[("k", Some("new"))]));
        harness.verify_all();
    }

    #[test]
    fn empty_revisions_advance() {
        let mut harness = MapHarness::new();
        harness.commit(&RevisionWrites::new());
        harness.commit(&RevisionWrites::new());
        assert_eq!(harness.revision(), Revision::new(2));

        let snapshot = harness.map.snapshot().unwrap();
        assert_eq!(
            snapshot.latest_signed_map_root().unwrap().map_revision,
            Revision::new(2)
        );
    }

    proptest! {
        #![proptest_config(PropTestConfig::quick().to_proptest_config())]

        #[test]
        fn snapshots_match_model(history in history_strategy(1, 8)) {
            let mut harness = MapHarness::new();
            for revision_writes in &history {
                harness.commit(revision_writes);
            }
            prop_assert_eq!(harness.revision(), Revision::new(history.len() as i64));
            harness.verify_all();
        }

        #[test]
        fn unwritten_keys_read_nothing(
            history in history_strategy(1, 4),
            stranger in key_hash_strategy(),
        ) {
            let mut harness = MapHarness::new();
            for revision_writes in &history {
                harness.commit(revision_writes);
            }
            prop_assume!(harness.expected(&stranger, harness.revision()).is_none());

            let snapshot = harness.map.snapshot().unwrap();
            let leaves = snapshot.get(harness.revision(), &[stranger]).unwrap();
            prop_assert!(leaves.is_empty());
        }
    }
}
