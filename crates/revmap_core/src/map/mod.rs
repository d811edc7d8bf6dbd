//! Revisioned map storage.
//!
//! A [`MapStorage`] identifies one map and opens transactions on it. Every
//! [`MapTx`] is bound to a single write revision, one past the revision of
//! the latest signed root, fixed when the transaction begins.
//!
//! Leaves are never overwritten. Writing a key again at a later revision adds
//! a row, and a read at revision `R` sees the row with the largest revision
//! `<= R`. Rows store the revision negated so that "most recent write at or
//! before `R`" is a range predicate plus a `MIN()` aggregate over the primary
//! key index.
//!
//! ```rust
//! use revmap_core::{Config, KeyHash, MapId, MapLeaf, MapReader, MapStorage, MapWriter, Revision};
//!
//! let storage = MapStorage::open_in_memory(MapId::new(1), Config::new().create_schema(true))?;
//! let key = KeyHash::from_bytes(vec![7; 32]);
//!
//! let mut tx = storage.begin()?;
//! assert_eq!(tx.write_revision(), Revision::new(1));
//! tx.set(&key, &MapLeaf::new(key.clone(), b"hello".to_vec()))?;
//! tx.commit()?;
//!
//! let snapshot = storage.snapshot()?;
//! let leaves = snapshot.get(Revision::new(1), &[key])?;
//! assert_eq!(leaves[0].leaf_value, b"hello");
//! # Ok::<(), revmap_core::CoreError>(())
//! ```

mod sql;
mod storage;
mod tx;

pub use storage::MapStorage;
pub use tx::{MapTx, ReadOnlyMapTx};

use crate::error::CoreResult;
use crate::record::{MapLeaf, SignedMapRoot};
use crate::types::{KeyHash, MapId, Revision};

/// Read operations available on every map transaction.
pub trait MapReader {
    /// Returns the map this transaction is bound to.
    fn map_id(&self) -> MapId;

    /// Returns the revision leaves written by this transaction get.
    fn write_revision(&self) -> Revision;

    /// Returns the leaves visible at `revision` for `key_hashes`.
    ///
    /// At most one leaf is returned per distinct key; keys with no visible
    /// value, or whose latest visible row is empty, are left out. Result
    /// order is unspecified.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the lookup fails, or a codec error if a
    /// non-empty payload cannot be decoded.
    fn get(&self, revision: Revision, key_hashes: &[KeyHash]) -> CoreResult<Vec<MapLeaf>>;

    /// Returns the latest signed root, or the zero-value root if the map has
    /// none. "Latest" follows [`Config::root_ordering`](crate::Config).
    fn latest_signed_map_root(&self) -> CoreResult<SignedMapRoot>;

    /// Returns the signed root stored for `revision`, if any.
    fn signed_map_root_at(&self, revision: Revision) -> CoreResult<Option<SignedMapRoot>>;

    /// Returns every signed root of the map in ascending revision order.
    fn signed_map_roots(&self) -> CoreResult<Vec<SignedMapRoot>>;
}

/// Write operations, available only on [`MapTx`].
pub trait MapWriter: MapReader {
    /// Appends `leaf` under `key_hash` at the write revision.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidKeyHash`](crate::CoreError) for a key of
    /// the wrong size, a codec error if the leaf cannot be encoded,
    /// [`CoreError::DuplicateLeaf`](crate::CoreError) if the key was
    /// already set in this revision, or a storage error.
    fn set(&mut self, key_hash: &KeyHash, leaf: &MapLeaf) -> CoreResult<()>;

    /// Appends a signed root.
    ///
    /// The root is stored under this transaction's map regardless of
    /// `root.map_id`.
    ///
    /// # Errors
    ///
    /// Returns a codec error if the signature or metadata cannot be encoded,
    /// [`CoreError::RevisionConflict`](crate::CoreError) if a root already
    /// exists at `root.map_revision`,
    /// [`CoreError::UnexpectedRowCount`](crate::CoreError) if the insert did
    /// not affect exactly one row, or a storage error.
    fn store_signed_map_root(&mut self, root: &SignedMapRoot) -> CoreResult<()>;
}
