//! Relations backing map storage.
//!
//! Both relations are append-only. `MapLeaf.MapRevision` holds the negated
//! write revision; see [`crate::map`] for how lookups use it.

use crate::error::CoreResult;
use rusqlite::Connection;

/// DDL for the map relations. Safe to run more than once.
pub const MAP_SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS MapHead (
    TreeId           INTEGER NOT NULL,
    MapHeadTimestamp INTEGER NOT NULL,
    RootHash         BLOB    NOT NULL,
    MapRevision      INTEGER NOT NULL,
    RootSignature    BLOB    NOT NULL,
    MapperData       BLOB,
    PRIMARY KEY (TreeId, MapRevision)
);

CREATE INDEX IF NOT EXISTS MapHeadTimestampIdx
    ON MapHead (TreeId, MapHeadTimestamp DESC);

CREATE TABLE IF NOT EXISTS MapLeaf (
    TreeId      INTEGER NOT NULL,
    KeyHash     BLOB    NOT NULL,
    MapRevision INTEGER NOT NULL,
    TheData     BLOB    NOT NULL,
    PRIMARY KEY (TreeId, KeyHash, MapRevision)
);
";

/// Installs the map relations on `conn`.
///
/// # Errors
///
/// Returns a storage error if the DDL fails.
pub fn create_schema(conn: &Connection) -> CoreResult<()> {
    conn.execute_batch(MAP_SCHEMA)?;
    Ok(())
}
