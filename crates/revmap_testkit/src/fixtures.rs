//! Test fixtures and map helpers.
//!
//! Provides convenience functions for setting up test maps and the leaves
//! and roots written to them.

use revmap_core::{
    Config, DigitallySigned, KeyHash, MapId, MapLeaf, MapStorage, Revision, SignatureAlgorithm,
    SignedMapRoot,
};
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use tempfile::TempDir;

/// Map ID used by all fixtures.
pub const TEST_MAP_ID: MapId = MapId::new(1);

/// A test map with automatic cleanup.
pub struct TestMap {
    /// The map handle.
    pub storage: MapStorage,
    /// The temporary directory (kept alive to prevent cleanup).
    _temp_dir: Option<TempDir>,
}

impl TestMap {
    /// Creates a map in a private in-memory database.
    pub fn memory() -> Self {
        Self::memory_with(Config::new())
    }

    /// Creates an in-memory map with `config`; the schema is always installed.
    pub fn memory_with(config: Config) -> Self {
        Self {
            storage: MapStorage::open_in_memory(TEST_MAP_ID, config.create_schema(true))
                .expect("Failed to open in-memory map"),
            _temp_dir: None,
        }
    }

    /// Creates a map backed by a database file in a temporary directory.
    pub fn file() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("map.db");
        let storage = MapStorage::open(&path, TEST_MAP_ID, Config::new().create_schema(true))
            .expect("Failed to open file map");

        Self {
            storage,
            _temp_dir: Some(temp_dir),
        }
    }

    /// Returns the database path if file-based, None if in-memory.
    pub fn path(&self) -> Option<PathBuf> {
        self._temp_dir.as_ref().map(|d| d.path().join("map.db"))
    }
}

impl std::ops::Deref for TestMap {
    type Target = MapStorage;

    fn deref(&self) -> &Self::Target {
        &self.storage
    }
}

/// Runs a test with a temporary in-memory map.
pub fn with_temp_map<F, R>(f: F) -> R
where
    F: FnOnce(&MapStorage) -> R,
{
    let test_map = TestMap::memory();
    f(&test_map.storage)
}

/// Runs a test with a temporary file-based map.
pub fn with_file_map<F, R>(f: F) -> R
where
    F: FnOnce(&MapStorage, &std::path::Path) -> R,
{
    let test_map = TestMap::file();
    let path = test_map.path().expect("File map should have a path");
    f(&test_map.storage, &path)
}

/// Hashes a human-readable key label with SHA-256.
pub fn key_hash(label: &str) -> KeyHash {
    KeyHash::from_bytes(Sha256::digest(label.as_bytes()).to_vec())
}

/// Builds a leaf holding `value` under the hash of `label`.
pub fn leaf(label: &str, value: &[u8]) -> MapLeaf {
    let key = key_hash(label);
    MapLeaf {
        leaf_hash: Sha256::digest(value).to_vec(),
        ..MapLeaf::new(key, value.to_vec())
    }
}

/// Builds a signed root for `revision` with a deterministic hash and an
/// unsigned signature.
pub fn signed_root(revision: Revision, timestamp_nanos: i64) -> SignedMapRoot {
    SignedMapRoot {
        timestamp_nanos,
        root_hash: Sha256::digest(revision.as_i64().to_be_bytes()).to_vec(),
        map_revision: revision,
        signature: DigitallySigned {
            signature_algorithm: SignatureAlgorithm::Anonymous,
            signature: format!("sig-{}", revision.as_i64()).into_bytes(),
            ..DigitallySigned::default()
        },
        map_id: TEST_MAP_ID,
        metadata: None,
    }
}
