//! Map handle.

use crate::config::Config;
use crate::error::{CoreError, CoreResult};
use crate::map::tx::{MapTx, ReadOnlyMapTx};
use crate::map::MapReader;
use crate::tree::TreeStorage;
use crate::types::MapId;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Handle to one logical map.
///
/// Holds the map identity and a shared [`TreeStorage`]; all state lives in
/// the database. Cloning is cheap.
#[derive(Clone)]
pub struct MapStorage {
    tree: Arc<TreeStorage>,
    map_id: MapId,
}

impl MapStorage {
    /// Opens map `map_id` in the database file at `path`.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the file cannot be opened or configured.
    pub fn open(path: impl AsRef<Path>, map_id: MapId, config: Config) -> CoreResult<Self> {
        let tree = TreeStorage::open(path, config)?;
        Ok(Self::with_tree(Arc::new(tree), map_id))
    }

    /// Opens map `map_id` in a private in-memory database.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the database or its schema cannot be
    /// created.
    pub fn open_in_memory(map_id: MapId, config: Config) -> CoreResult<Self> {
        let tree = TreeStorage::open_in_memory(config)?;
        Ok(Self::with_tree(Arc::new(tree), map_id))
    }

    /// Creates a handle on an existing tree storage, which may be shared
    /// with handles for other maps.
    pub fn with_tree(tree: Arc<TreeStorage>, map_id: MapId) -> Self {
        Self { tree, map_id }
    }

    /// Returns the map ID.
    pub fn map_id(&self) -> MapId {
        self.map_id
    }

    /// Returns the configuration.
    pub fn config(&self) -> &Config {
        self.tree.config()
    }

    /// Begins a transaction writing at the revision after the latest root.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the transaction cannot be opened, any
    /// error from reading the latest signed root, and
    /// [`CoreError::InvalidOperation`] if that root is at the largest
    /// representable revision.
    pub fn begin(&self) -> CoreResult<MapTx<'_>> {
        let tree_tx = self.tree.begin_tree_tx()?;
        let mut tx = MapTx::new(tree_tx, self.map_id, self.tree.config());

        let root = tx.latest_signed_map_root()?;
        let write_revision = root.map_revision.checked_next().ok_or_else(|| {
            CoreError::invalid_operation(format!(
                "{} has no revision after {}",
                self.map_id, root.map_revision
            ))
        })?;
        tx.set_write_revision(write_revision);
        debug!(map_id = %self.map_id, %write_revision, "began map transaction");

        Ok(tx)
    }

    /// Begins a transaction that can only read.
    ///
    /// # Errors
    ///
    /// Fails the same way as [`MapStorage::begin`].
    pub fn snapshot(&self) -> CoreResult<ReadOnlyMapTx<'_>> {
        self.begin().map(ReadOnlyMapTx::new)
    }
}
