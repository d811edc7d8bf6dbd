//! Shared tree storage handle.

use crate::config::Config;
use crate::error::CoreResult;
use crate::schema;
use crate::tree::statements::StatementCache;
use crate::tree::tx::TreeTx;
use parking_lot::{ArcMutexGuard, Mutex, RawMutex};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Number of prepared handles kept per connection.
const PREPARED_STATEMENT_CAPACITY: usize = 64;

/// A pooled connection, checked out for the life of one transaction.
pub(crate) type PooledConnection = ArcMutexGuard<RawMutex, Connection>;

/// Where the pool's connections point.
#[derive(Debug)]
enum Location {
    File(PathBuf),
    /// URI of a named in-memory database shared by every connection that
    /// opens it in this process.
    Memory(String),
}

impl Location {
    fn memory() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        let id = NEXT.fetch_add(1, Ordering::Relaxed);
        Self::Memory(format!(
            "file:/revmap-{}-{id}?vfs=memdb",
            std::process::id()
        ))
    }
}

/// Connection access and statement caching shared by map handles.
///
/// Each transaction checks out its own engine connection, so any number of
/// transactions may be open on one handle at once; conflicts between them
/// are left to the engine's locking. Idle connections are kept for reuse
/// along with their prepared statements. Several
/// [`MapStorage`](crate::MapStorage) handles may share one `TreeStorage`
/// through an `Arc`.
pub struct TreeStorage {
    location: Location,
    connections: Mutex<Vec<Arc<Mutex<Connection>>>>,
    statements: &'static StatementCache,
    config: Config,
}

impl TreeStorage {
    /// Opens the database file at `path`, creating it if needed.
    ///
    /// File databases run in write-ahead-log mode so readers and a writer
    /// can proceed side by side.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the file cannot be opened or configured.
    pub fn open(path: impl AsRef<Path>, config: Config) -> CoreResult<Self> {
        Self::with_location(Location::File(path.as_ref().to_path_buf()), config)
    }

    /// Opens a private in-memory database.
    ///
    /// The database lives as long as the handle and is visible to all of
    /// its connections, but to no other handle.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the database cannot be created or, with
    /// [`Config::create_schema`] enabled, if the schema cannot be installed.
    pub fn open_in_memory(config: Config) -> CoreResult<Self> {
        Self::with_location(Location::memory(), config)
    }

    fn with_location(location: Location, config: Config) -> CoreResult<Self> {
        let storage = Self {
            location,
            connections: Mutex::new(Vec::new()),
            statements: StatementCache::global(),
            config,
        };
        // The first connection is opened eagerly and never closed, which
        // also keeps a named in-memory database alive.
        let conn = storage.checkout()?;
        if storage.config.create_schema {
            schema::create_schema(&conn)?;
        }
        drop(conn);
        Ok(storage)
    }

    /// Returns the configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Begins a transaction on an idle connection, opening a new one if
    /// every connection is in use.
    ///
    /// # Errors
    ///
    /// Returns a storage error if a new connection cannot be opened or the
    /// engine refuses to begin.
    pub fn begin_tree_tx(&self) -> CoreResult<TreeTx<'_>> {
        TreeTx::begin(self.checkout()?, self.statements)
    }

    /// Installs the map relations.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the DDL fails.
    pub fn create_schema(&self) -> CoreResult<()> {
        schema::create_schema(&*self.checkout()?)
    }

    fn checkout(&self) -> CoreResult<PooledConnection> {
        let mut connections = self.connections.lock();
        if let Some(conn) = connections.iter().find_map(|slot| slot.try_lock_arc()) {
            return Ok(conn);
        }

        let slot = Arc::new(Mutex::new(self.connect()?));
        let conn = slot.lock_arc();
        connections.push(slot);
        debug!(
            location = ?self.location,
            connections = connections.len(),
            "opened pooled connection"
        );
        Ok(conn)
    }

    fn connect(&self) -> CoreResult<Connection> {
        let conn = match &self.location {
            Location::File(path) => {
                let conn = Connection::open(path)?;
                let mode: String =
                    conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
                debug!(?path, %mode, "opened database file");
                conn
            }
            Location::Memory(uri) => Connection::open(uri)?,
        };
        conn.busy_timeout(self.config.busy_timeout)?;
        conn.set_prepared_statement_cache_capacity(PREPARED_STATEMENT_CAPACITY);
        Ok(conn)
    }
}
