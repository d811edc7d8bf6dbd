//! Statements and row mapping for the map relations.

use crate::error::CoreResult;
use crate::record::{DigitallySigned, MapperMetadata, SignedMapRoot};
use crate::types::{MapId, Revision};
use revmap_codec::Decode;
use rusqlite::Row;
use tracing::warn;

pub(crate) const INSERT_MAP_HEAD: &str = "INSERT INTO MapHead(TreeId, MapHeadTimestamp, RootHash, MapRevision, RootSignature, MapperData)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6)";

pub(crate) const SELECT_LATEST_ROOT_BY_REVISION: &str =
    "SELECT MapHeadTimestamp, RootHash, MapRevision, RootSignature, MapperData
     FROM MapHead WHERE TreeId = ?1
     ORDER BY MapRevision DESC LIMIT 1";

pub(crate) const SELECT_LATEST_ROOT_BY_TIMESTAMP: &str =
    "SELECT MapHeadTimestamp, RootHash, MapRevision, RootSignature, MapperData
     FROM MapHead WHERE TreeId = ?1
     ORDER BY MapHeadTimestamp DESC, MapRevision DESC LIMIT 1";

pub(crate) const SELECT_ROOT_AT_REVISION: &str =
    "SELECT MapHeadTimestamp, RootHash, MapRevision, RootSignature, MapperData
     FROM MapHead WHERE TreeId = ?1 AND MapRevision = ?2";

pub(crate) const SELECT_ROOTS: &str =
    "SELECT MapHeadTimestamp, RootHash, MapRevision, RootSignature, MapperData
     FROM MapHead WHERE TreeId = ?1
     ORDER BY MapRevision ASC";

pub(crate) const INSERT_MAP_LEAF: &str =
    "INSERT INTO MapLeaf(TreeId, KeyHash, MapRevision, TheData) VALUES (?1, ?2, ?3, ?4)";

// MapRevision is stored negated, so `>= -revision` keeps rows written at or
// before `revision` and MIN() picks the most recent of them, the first entry
// of the ascending key range. SQLite takes the bare TheData column from the
// row holding the minimum.
pub(crate) const SELECT_MAP_LEAF: &str = "SELECT KeyHash, MIN(MapRevision), TheData
     FROM MapLeaf
     WHERE KeyHash IN (<placeholder>) AND
           TreeId = ? AND
           MapRevision >= ?
     GROUP BY KeyHash";

/// Returns the `MapLeaf.MapRevision` value for a true revision.
pub(crate) const fn stored_revision(revision: Revision) -> i64 {
    -revision.as_i64()
}

/// Raw `MapHead` columns, blobs still encoded.
#[derive(Debug)]
pub(crate) struct RootRow {
    timestamp_nanos: i64,
    root_hash: Vec<u8>,
    map_revision: i64,
    signature: Vec<u8>,
    metadata: Option<Vec<u8>>,
}

impl RootRow {
    /// Reads a row whose columns are, in order: timestamp, root hash,
    /// revision, signature, mapper data.
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            timestamp_nanos: row.get(0)?,
            root_hash: row.get(1)?,
            map_revision: row.get(2)?,
            signature: row.get(3)?,
            metadata: row.get(4)?,
        })
    }

    /// Decodes the signature and metadata blobs.
    pub(crate) fn into_root(self, map_id: MapId) -> CoreResult<SignedMapRoot> {
        let signature = if self.signature.is_empty() {
            DigitallySigned::default()
        } else {
            DigitallySigned::decode(&self.signature).map_err(|err| {
                warn!("Failed to decode root signature: {err}");
                err
            })?
        };

        let metadata = match self.metadata {
            Some(bytes) if !bytes.is_empty() => {
                Some(MapperMetadata::decode(&bytes).map_err(|err| {
                    warn!("Failed to decode mapper metadata: {err}");
                    err
                })?)
            }
            _ => None,
        };

        Ok(SignedMapRoot {
            timestamp_nanos: self.timestamp_nanos,
            root_hash: self.root_hash,
            map_revision: Revision::new(self.map_revision),
            signature,
            map_id,
            metadata,
        })
    }
}
