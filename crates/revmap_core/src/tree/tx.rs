//! Engine transaction wrapper.

use crate::error::CoreResult;
use crate::tree::statements::StatementCache;
use crate::tree::storage::PooledConnection;
use crate::types::Revision;
use rusqlite::{CachedStatement, Connection};
use tracing::{debug, warn};

/// An open SQL transaction on a tree storage connection.
///
/// Owns a connection checked out of the [`TreeStorage`](super::TreeStorage)
/// pool and returns it when dropped. Dropping a transaction that was neither
/// committed nor rolled back rolls it back.
pub struct TreeTx<'a> {
    conn: PooledConnection,
    statements: &'a StatementCache,
    write_revision: Revision,
    open: bool,
}

impl<'a> TreeTx<'a> {
    pub(crate) fn begin(
        conn: PooledConnection,
        statements: &'a StatementCache,
    ) -> CoreResult<Self> {
        conn.execute_batch("BEGIN")?;
        debug!("began tree transaction");
        Ok(Self {
            conn,
            statements,
            write_revision: Revision::ZERO,
            open: true,
        })
    }

    /// Returns the revision new rows are written at.
    pub fn write_revision(&self) -> Revision {
        self.write_revision
    }

    pub(crate) fn set_write_revision(&mut self, revision: Revision) {
        self.write_revision = revision;
    }

    /// Returns the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Prepares `sql`, reusing the connection's cached handle if present.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the statement does not compile.
    pub fn prepare(&self, sql: &str) -> CoreResult<CachedStatement<'_>> {
        Ok(self.conn.prepare_cached(sql)?)
    }

    /// Prepares `template` expanded for a batch of `count` elements.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the expanded statement does not compile.
    pub fn prepare_batch(
        &self,
        template: &'static str,
        count: usize,
    ) -> CoreResult<CachedStatement<'_>> {
        let sql = self.statements.expand(template, count);
        self.prepare(&sql)
    }

    /// Commits the transaction.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the engine refuses the commit; the
    /// transaction is then rolled back on drop.
    pub fn commit(mut self) -> CoreResult<()> {
        self.finish("COMMIT")
    }

    /// Rolls the transaction back.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the engine fails to roll back; the
    /// rollback is retried on drop.
    pub fn rollback(mut self) -> CoreResult<()> {
        self.finish("ROLLBACK")
    }

    fn finish(&mut self, verb: &str) -> CoreResult<()> {
        self.conn.execute_batch(verb)?;
        self.open = false;
        debug!(verb, revision = %self.write_revision, "closed tree transaction");
        Ok(())
    }
}

impl Drop for TreeTx<'_> {
    fn drop(&mut self) {
        if self.open {
            if let Err(err) = self.conn.execute_batch("ROLLBACK") {
                warn!("Failed to roll back abandoned transaction: {err}");
            }
        }
    }
}
