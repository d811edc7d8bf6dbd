//! Property-based test generators using proptest.
//!
//! Provides strategies for generating map histories. Keys are drawn from a
//! small pool so that histories overwrite and tombstone the same keys often.

use crate::fixtures::key_hash;
use proptest::prelude::*;
use revmap_core::KeyHash;
use std::collections::BTreeMap;

/// Number of distinct keys [`pooled_key_strategy`] draws from.
pub const KEY_POOL_SIZE: u8 = 8;

/// Writes applied in one revision. `None` writes a tombstone.
pub type RevisionWrites = BTreeMap<KeyHash, Option<Vec<u8>>>;

/// Strategy for generating arbitrary 32-byte key hashes.
pub fn key_hash_strategy() -> impl Strategy<Value = KeyHash> {
    prop::array::uniform32(any::<u8>()).prop_map(|bytes| KeyHash::from_bytes(bytes.to_vec()))
}

/// Strategy for key hashes drawn from a fixed pool.
pub fn pooled_key_strategy() -> impl Strategy<Value = KeyHash> {
    (0..KEY_POOL_SIZE).prop_map(|i| key_hash(&format!("key-{i}")))
}

/// Strategy for a written value; one in five is a tombstone.
pub fn leaf_value_strategy() -> impl Strategy<Value = Option<Vec<u8>>> {
    prop_oneof![
        4 => prop::collection::vec(any::<u8>(), 1..64).prop_map(Some),
        1 => Just(None),
    ]
}

/// Strategy for the writes of a single revision.
pub fn revision_writes_strategy() -> impl Strategy<Value = RevisionWrites> {
    prop::collection::btree_map(pooled_key_strategy(), leaf_value_strategy(), 0..6)
}

/// Strategy for a history of `min..max` revisions.
pub fn history_strategy(min: usize, max: usize) -> impl Strategy<Value = Vec<RevisionWrites>> {
    prop::collection::vec(revision_writes_strategy(), min..max)
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}
