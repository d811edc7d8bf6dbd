//! Map transactions.

use crate::config::{Config, RootOrdering};
use crate::error::{CoreError, CoreResult};
use crate::map::sql::{
    stored_revision, RootRow, INSERT_MAP_HEAD, INSERT_MAP_LEAF, SELECT_LATEST_ROOT_BY_REVISION,
    SELECT_LATEST_ROOT_BY_TIMESTAMP, SELECT_MAP_LEAF, SELECT_ROOTS, SELECT_ROOT_AT_REVISION,
};
use crate::map::{MapReader, MapWriter};
use crate::record::{MapLeaf, SignedMapRoot};
use crate::tree::TreeTx;
use crate::types::{KeyHash, MapId, Revision};
use revmap_codec::{Decode, Encode};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, OptionalExtension};
use tracing::{debug, warn};

/// A read-write unit of work on one map.
///
/// Commit or roll back through [`MapTx::commit`] and [`MapTx::rollback`];
/// dropping an open transaction rolls it back.
pub struct MapTx<'a> {
    tx: TreeTx<'a>,
    map_id: MapId,
    config: &'a Config,
}

impl<'a> MapTx<'a> {
    pub(crate) fn new(tx: TreeTx<'a>, map_id: MapId, config: &'a Config) -> Self {
        Self { tx, map_id, config }
    }

    pub(crate) fn set_write_revision(&mut self, revision: Revision) {
        self.tx.set_write_revision(revision);
    }

    /// Commits everything written in this transaction.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the engine refuses the commit, for
    /// example when another connection holds a conflicting lock past the
    /// busy timeout. The transaction is then rolled back on drop.
    pub fn commit(self) -> CoreResult<()> {
        self.tx.commit()
    }

    /// Discards everything written in this transaction.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the engine fails to roll back.
    pub fn rollback(self) -> CoreResult<()> {
        self.tx.rollback()
    }

    fn check_key(&self, key_hash: &KeyHash) -> CoreResult<()> {
        if key_hash.len() != self.config.hash_size {
            return Err(CoreError::invalid_key_hash(
                key_hash.len(),
                self.config.hash_size,
            ));
        }
        Ok(())
    }

    fn query_roots(&self, sql: &str, revision: Option<Revision>) -> CoreResult<Vec<SignedMapRoot>> {
        let mut stmt = self.tx.prepare(sql)?;
        let rows = match revision {
            Some(revision) => stmt
                .query_map(params![self.map_id.as_i64(), revision.as_i64()], RootRow::from_row)?
                .collect::<Result<Vec<_>, _>>()?,
            None => stmt
                .query_map(params![self.map_id.as_i64()], RootRow::from_row)?
                .collect::<Result<Vec<_>, _>>()?,
        };
        rows.into_iter()
            .map(|row| row.into_root(self.map_id))
            .collect()
    }
}

impl MapReader for MapTx<'_> {
    fn map_id(&self) -> MapId {
        self.map_id
    }

    fn write_revision(&self) -> Revision {
        self.tx.write_revision()
    }

    fn get(&self, revision: Revision, key_hashes: &[KeyHash]) -> CoreResult<Vec<MapLeaf>> {
        // Nothing is written before revision 1.
        if revision < Revision::ZERO {
            return Ok(Vec::new());
        }

        let mut keys: Vec<&KeyHash> = key_hashes.iter().collect();
        keys.sort_unstable();
        keys.dedup();

        let mut leaves = Vec::with_capacity(keys.len());
        let mut empty = 0usize;

        for batch in keys.chunks(self.config.max_key_batch) {
            let mut stmt = self.tx.prepare_batch(SELECT_MAP_LEAF, batch.len())?;

            let mut args: Vec<Value> = Vec::with_capacity(batch.len() + 2);
            args.extend(batch.iter().map(|key| Value::Blob(key.as_bytes().to_vec())));
            args.push(Value::Integer(self.map_id.as_i64()));
            args.push(Value::Integer(stored_revision(revision)));
            debug!(args = args.len(), "querying map leaves");

            let mut rows = stmt.query(params_from_iter(args))?;
            while let Some(row) = rows.next()? {
                let key_hash: Vec<u8> = row.get(0)?;
                let data: Vec<u8> = row.get(2)?;
                if data.is_empty() {
                    empty += 1;
                    continue;
                }
                let mut leaf = MapLeaf::decode(&data)?;
                if leaf.is_empty() {
                    empty += 1;
                    continue;
                }
                leaf.key_hash = KeyHash::from_bytes(key_hash);
                leaves.push(leaf);
            }
        }

        debug!(
            map_id = %self.map_id,
            %revision,
            found = leaves.len(),
            empty,
            "read map leaves"
        );
        Ok(leaves)
    }

    fn latest_signed_map_root(&self) -> CoreResult<SignedMapRoot> {
        let sql = match self.config.root_ordering {
            RootOrdering::Revision => SELECT_LATEST_ROOT_BY_REVISION,
            RootOrdering::Timestamp => SELECT_LATEST_ROOT_BY_TIMESTAMP,
        };
        let mut stmt = self.tx.prepare(sql)?;
        let row = stmt
            .query_row(params![self.map_id.as_i64()], RootRow::from_row)
            .optional()?;

        // A map with no roots yet reports the zero-value root.
        match row {
            Some(row) => row.into_root(self.map_id),
            None => Ok(SignedMapRoot::default()),
        }
    }

    fn signed_map_root_at(&self, revision: Revision) -> CoreResult<Option<SignedMapRoot>> {
        Ok(self
            .query_roots(SELECT_ROOT_AT_REVISION, Some(revision))?
            .pop())
    }

    fn signed_map_roots(&self) -> CoreResult<Vec<SignedMapRoot>> {
        self.query_roots(SELECT_ROOTS, None)
    }
}

impl MapWriter for MapTx<'_> {
    fn set(&mut self, key_hash: &KeyHash, leaf: &MapLeaf) -> CoreResult<()> {
        self.check_key(key_hash)?;
        let payload = leaf.encode().map_err(|err| {
            warn!("Failed to encode leaf {key_hash}: {err}");
            err
        })?;

        let revision = self.write_revision();
        let mut stmt = self.tx.prepare(INSERT_MAP_LEAF)?;
        let result = stmt.execute(params![
            self.map_id.as_i64(),
            key_hash.as_bytes(),
            stored_revision(revision),
            payload,
        ]);

        match result.map_err(CoreError::from) {
            Ok(1) => Ok(()),
            Ok(actual) => Err(CoreError::unexpected_row_count(1, actual)),
            Err(err) if err.is_constraint_violation() => Err(CoreError::DuplicateLeaf {
                key_hash: key_hash.clone(),
                revision,
            }),
            Err(err) => Err(err),
        }
    }

    fn store_signed_map_root(&mut self, root: &SignedMapRoot) -> CoreResult<()> {
        if root.map_revision < Revision::ZERO || root.map_revision.checked_next().is_none() {
            return Err(CoreError::invalid_operation(format!(
                "cannot store a root at {}",
                root.map_revision
            )));
        }
        let signature = root.signature.encode().map_err(|err| {
            warn!("Failed to encode root signature {:?}: {err}", root.signature);
            err
        })?;
        let metadata = root
            .metadata
            .as_ref()
            .map(|metadata| {
                metadata.encode().map_err(|err| {
                    warn!("Failed to encode mapper metadata {metadata:?}: {err}");
                    err
                })
            })
            .transpose()?;

        let mut stmt = self.tx.prepare(INSERT_MAP_HEAD)?;
        let result = stmt.execute(params![
            self.map_id.as_i64(),
            root.timestamp_nanos,
            root.root_hash,
            root.map_revision.as_i64(),
            signature,
            metadata,
        ]);

        match result.map_err(CoreError::from) {
            Ok(1) => Ok(()),
            Ok(actual) => Err(CoreError::unexpected_row_count(1, actual)),
            Err(err) if err.is_constraint_violation() => {
                warn!(map_id = %self.map_id, revision = %root.map_revision, "Signed root already exists");
                Err(CoreError::RevisionConflict {
                    map_id: self.map_id,
                    revision: root.map_revision,
                })
            }
            Err(err) => {
                warn!("Failed to store signed map root: {err}");
                Err(err)
            }
        }
    }
}

/// A map transaction restricted to reads.
///
/// Wraps a [`MapTx`] without exposing its write operations. Dropping or
/// closing it rolls the underlying transaction back.
pub struct ReadOnlyMapTx<'a> {
    inner: MapTx<'a>,
}

impl<'a> ReadOnlyMapTx<'a> {
    pub(crate) fn new(inner: MapTx<'a>) -> Self {
        Self { inner }
    }

    /// Ends the snapshot.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the engine fails to roll back.
    pub fn close(self) -> CoreResult<()> {
        self.inner.rollback()
    }
}

impl MapReader for ReadOnlyMapTx<'_> {
    fn map_id(&self) -> MapId {
        self.inner.map_id()
    }

    fn write_revision(&self) -> Revision {
        self.inner.write_revision()
    }

    fn get(&self, revision: Revision, key_hashes: &[KeyHash]) -> CoreResult<Vec<MapLeaf>> {
        self.inner.get(revision, key_hashes)
    }

    fn latest_signed_map_root(&self) -> CoreResult<SignedMapRoot> {
        self.inner.latest_signed_map_root()
    }

    fn signed_map_root_at(&self, revision: Revision) -> CoreResult<Option<SignedMapRoot>> {
        self.inner.signed_map_root_at(revision)
    }

    fn signed_map_roots(&self) -> CoreResult<Vec<SignedMapRoot>> {
        self.inner.signed_map_roots()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::MapStorage;
    use crate::record::{DigitallySigned, HashAlgorithm, MapperMetadata, SignatureAlgorithm};

    fn storage_with(config: Config) -> MapStorage {
        MapStorage::open_in_memory(MapId::new(1), config.create_schema(true)).unwrap()
    }

    fn storage() -> MapStorage {
        storage_with(Config::new())
    }

    fn key(byte: u8) -> KeyHash {
        KeyHash::from_bytes(vec![byte; 32])
    }

    fn root(revision: i64, timestamp_nanos: i64) -> SignedMapRoot {
        SignedMapRoot {
            timestamp_nanos,
            root_hash: vec![0xab; 32],
            map_revision: Revision::new(revision),
            signature: DigitallySigned {
                hash_algorithm: HashAlgorithm::Sha256,
                signature_algorithm: SignatureAlgorithm::Ecdsa,
                signature: vec![1, 2, 3, revision as u8],
            },
            map_id: MapId::new(1),
            metadata: None,
        }
    }

    /// Writes `writes` at the next revision and stores its root.
    fn commit_revision(storage: &MapStorage, writes: &[(u8, &str)]) -> Revision {
        let mut tx = storage.begin().unwrap();
        let revision = tx.write_revision();
        for (byte, value) in writes {
            let k = key(*byte);
            tx.set(&k, &MapLeaf::new(k.clone(), value.as_bytes().to_vec()))
                .unwrap();
        }
        tx.store_signed_map_root(&root(revision.as_i64(), revision.as_i64() * 10))
            .unwrap();
        tx.commit().unwrap();
        revision
    }

    fn value_at(storage: &MapStorage, revision: i64, byte: u8) -> Option<Vec<u8>> {
        let snapshot = storage.snapshot().unwrap();
        let mut leaves = snapshot.get(Revision::new(revision), &[key(byte)]).unwrap();
        assert!(leaves.len() <= 1);
        leaves.pop().map(|leaf| leaf.leaf_value)
    }

    #[test]
    fn revision_monotonicity_scenario() {
        let storage = storage();
        assert_eq!(commit_revision(&storage, &[(1, "a")]), Revision::new(1));
        assert_eq!(commit_revision(&storage, &[(1, "b")]), Revision::new(2));

        assert_eq!(value_at(&storage, 1, 1), Some(b"a".to_vec()));
        assert_eq!(value_at(&storage, 2, 1), Some(b"b".to_vec()));
        let snapshot = storage.snapshot().unwrap();
        assert_eq!(
            snapshot.latest_signed_map_root().unwrap().map_revision,
            Revision::new(2)
        );
    }

    #[test]
    fn snapshot_reads_see_latest_write_at_or_before() {
        let storage = storage();
        commit_revision(&storage, &[]); // 1
        commit_revision(&storage, &[(1, "v1")]); // 2
        commit_revision(&storage, &[]); // 3
        commit_revision(&storage, &[(1, "v2")]); // 4

        assert_eq!(value_at(&storage, 0, 1), None);
        assert_eq!(value_at(&storage, 1, 1), None);
        assert_eq!(value_at(&storage, 2, 1), Some(b"v1".to_vec()));
        assert_eq!(value_at(&storage, 3, 1), Some(b"v1".to_vec()));
        assert_eq!(value_at(&storage, 4, 1), Some(b"v2".to_vec()));
        assert_eq!(value_at(&storage, 100, 1), Some(b"v2".to_vec()));
    }

    #[test]
    fn batch_returns_one_leaf_per_key() {
        let storage = storage();
        commit_revision(&storage, &[(1, "one"), (2, "two")]);
        commit_revision(&storage, &[(2, "two'"), (3, "three")]);

        let snapshot = storage.snapshot().unwrap();
        let mut leaves = snapshot
            .get(Revision::new(2), &[key(3), key(1), key(2), key(1), key(9)])
            .unwrap();
        leaves.sort_by(|a, b| a.key_hash.cmp(&b.key_hash));

        let found: Vec<_> = leaves
            .iter()
            .map(|leaf| (leaf.key_hash.clone(), leaf.leaf_value.clone()))
            .collect();
        assert_eq!(
            found,
            vec![
                (key(1), b"one".to_vec()),
                (key(2), b"two'".to_vec()),
                (key(3), b"three".to_vec()),
            ]
        );

        let at_one = snapshot.get(Revision::new(1), &[key(2), key(3)]).unwrap();
        assert_eq!(at_one.len(), 1);
        assert_eq!(at_one[0].leaf_value, b"two");
    }

    #[test]
    fn batches_larger_than_the_limit_are_split() {
        let storage = storage_with(Config::new().max_key_batch(2));
        let writes: Vec<(u8, &str)> = (1..=5).map(|b| (b, "x")).collect();
        commit_revision(&storage, &writes);

        let keys: Vec<_> = (1..=5).map(key).collect();
        let snapshot = storage.snapshot().unwrap();
        assert_eq!(snapshot.get(Revision::new(1), &keys).unwrap().len(), 5);
    }

    #[test]
    fn empty_key_list_returns_nothing() {
        let storage = storage();
        commit_revision(&storage, &[(1, "a")]);
        let snapshot = storage.snapshot().unwrap();
        assert!(snapshot.get(Revision::new(1), &[]).unwrap().is_empty());
    }

    #[test]
    fn get_sees_own_uncommitted_writes() {
        let storage = storage();
        let mut tx = storage.begin().unwrap();
        let k = key(4);
        tx.set(&k, &MapLeaf::new(k.clone(), b"pending".to_vec())).unwrap();
        assert_eq!(tx.get(tx.write_revision(), &[k.clone()]).unwrap().len(), 1);
        tx.rollback().unwrap();

        assert_eq!(value_at(&storage, 1, 4), None);
    }

    #[test]
    fn returned_key_comes_from_the_row() {
        let storage = storage();
        let mut tx = storage.begin().unwrap();
        let k = key(5);
        tx.set(&k, &MapLeaf::new(key(6), b"v".to_vec())).unwrap();
        let leaves = tx.get(Revision::new(1), &[k.clone()]).unwrap();
        assert_eq!(leaves[0].key_hash, k);
    }

    #[test]
    fn tombstones_hide_older_values() {
        let storage = storage();
        commit_revision(&storage, &[(1, "alive")]);

        let mut tx = storage.begin().unwrap();
        tx.set(&key(1), &MapLeaf::tombstone(key(1))).unwrap();
        tx.store_signed_map_root(&root(2, 20)).unwrap();
        tx.commit().unwrap();

        assert_eq!(value_at(&storage, 1, 1), Some(b"alive".to_vec()));
        assert_eq!(value_at(&storage, 2, 1), None);
    }

    #[test]
    fn zero_length_payload_is_skipped() {
        let storage = storage();
        let tx = storage.begin().unwrap();
        tx.tx
            .connection()
            .execute(
                "INSERT INTO MapLeaf VALUES (1, ?1, -1, x'')",
                [key(7).as_bytes()],
            )
            .unwrap();
        assert!(tx.get(Revision::new(1), &[key(7)]).unwrap().is_empty());
    }

    #[test]
    fn corrupt_payload_is_a_decode_error() {
        let storage = storage();
        let tx = storage.begin().unwrap();
        tx.tx
            .connection()
            .execute(
                "INSERT INTO MapLeaf VALUES (1, ?1, -1, x'ff00')",
                [key(7).as_bytes()],
            )
            .unwrap();
        let err = tx.get(Revision::new(1), &[key(7)]).unwrap_err();
        assert!(matches!(err, CoreError::Codec(_)));
    }

    #[test]
    fn set_rejects_wrong_key_size() {
        let storage = storage();
        let mut tx = storage.begin().unwrap();
        let short = KeyHash::from_bytes(vec![1; 8]);
        let err = tx.set(&short, &MapLeaf::new(short.clone(), b"v".to_vec())).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InvalidKeyHash {
                expected: 32,
                actual: 8
            }
        ));
    }

    #[test]
    fn second_set_in_one_revision_is_a_duplicate() {
        let storage = storage();
        let mut tx = storage.begin().unwrap();
        let k = key(1);
        tx.set(&k, &MapLeaf::new(k.clone(), b"a".to_vec())).unwrap();
        let err = tx.set(&k, &MapLeaf::new(k.clone(), b"b".to_vec())).unwrap_err();
        assert!(matches!(err, CoreError::DuplicateLeaf { revision, .. } if revision == Revision::new(1)));
    }

    #[test]
    fn root_round_trips_all_fields() {
        let storage = storage();
        let mut stored = root(1, 1_700_000_000_000_000_000);
        stored.metadata = Some(MapperMetadata {
            source_log_id: b"log-1".to_vec(),
            highest_fully_completed_seq: 41,
            highest_partially_completed_seq: 42,
        });

        let mut tx = storage.begin().unwrap();
        tx.store_signed_map_root(&stored).unwrap();
        tx.commit().unwrap();

        let snapshot = storage.snapshot().unwrap();
        assert_eq!(snapshot.latest_signed_map_root().unwrap(), stored);
        assert_eq!(
            snapshot.signed_map_root_at(Revision::new(1)).unwrap(),
            Some(stored)
        );
        assert_eq!(snapshot.signed_map_root_at(Revision::new(2)).unwrap(), None);
    }

    #[test]
    fn root_without_metadata_round_trips() {
        let storage = storage();
        let stored = root(1, 5);
        let mut tx = storage.begin().unwrap();
        tx.store_signed_map_root(&stored).unwrap();
        assert_eq!(tx.latest_signed_map_root().unwrap(), stored);
    }

    #[test]
    fn duplicate_root_revision_conflicts() {
        let storage = storage();
        commit_revision(&storage, &[]);

        let mut tx = storage.begin().unwrap();
        let err = tx.store_signed_map_root(&root(1, 99)).unwrap_err();
        assert!(matches!(
            err,
            CoreError::RevisionConflict { revision, .. } if revision == Revision::new(1)
        ));
    }

    #[test]
    fn out_of_range_root_revisions_are_rejected() {
        let storage = storage();
        let mut tx = storage.begin().unwrap();
        for revision in [-1, i64::MIN, i64::MAX] {
            let err = tx.store_signed_map_root(&root(revision, 1)).unwrap_err();
            assert!(matches!(err, CoreError::InvalidOperation { .. }));
        }
        assert!(tx.signed_map_roots().unwrap().is_empty());
    }

    #[test]
    fn reads_before_revision_zero_are_empty() {
        let storage = storage();
        commit_revision(&storage, &[(1, "a")]);
        let snapshot = storage.snapshot().unwrap();
        for revision in [-1, i64::MIN] {
            assert!(snapshot
                .get(Revision::new(revision), &[key(1)])
                .unwrap()
                .is_empty());
        }
    }

    fn file_storages(count: usize) -> (tempfile::TempDir, Vec<MapStorage>) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.db");
        let config = Config::new()
            .create_schema(true)
            .busy_timeout(std::time::Duration::from_millis(50));
        let storages = (0..count)
            .map(|_| MapStorage::open(&path, MapId::new(1), config.clone()).unwrap())
            .collect();
        (dir, storages)
    }

    fn assert_lost_race(err: &CoreError) {
        assert!(
            err.is_busy() || matches!(err, CoreError::RevisionConflict { .. }),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn racing_writers_on_one_handle_cannot_both_commit() {
        let (_dir, storages) = file_storages(1);
        let storage = &storages[0];

        let mut first = storage.begin().unwrap();
        let mut second = storage.begin().unwrap();
        assert_eq!(first.write_revision(), Revision::new(1));
        assert_eq!(second.write_revision(), Revision::new(1));

        first.store_signed_map_root(&root(1, 10)).unwrap();
        first.commit().unwrap();

        let err = second.store_signed_map_root(&root(1, 11)).unwrap_err();
        assert_lost_race(&err);
        second.rollback().unwrap();

        let snapshot = storage.snapshot().unwrap();
        let roots = snapshot.signed_map_roots().unwrap();
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].timestamp_nanos, 10);
    }

    #[test]
    fn racing_writers_on_two_handles_cannot_both_commit() {
        let (_dir, storages) = file_storages(2);

        let mut first = storages[0].begin().unwrap();
        let mut second = storages[1].begin().unwrap();
        assert_eq!(first.write_revision(), second.write_revision());

        let k = key(1);
        first.set(&k, &MapLeaf::new(k.clone(), b"first".to_vec())).unwrap();
        first.store_signed_map_root(&root(1, 10)).unwrap();
        first.commit().unwrap();

        let err = second
            .set(&k, &MapLeaf::new(k.clone(), b"second".to_vec()))
            .unwrap_err();
        assert_lost_race(&err);
        drop(second);

        assert_eq!(value_at(&storages[1], 1, 1), Some(b"first".to_vec()));
    }

    #[test]
    fn stale_writer_cannot_reclaim_a_revision() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.db");
        let config = Config::new().create_schema(true);
        let first = MapStorage::open(&path, MapId::new(1), config.clone()).unwrap();
        let second = MapStorage::open(&path, MapId::new(1), config).unwrap();

        let mut tx = first.begin().unwrap();
        tx.store_signed_map_root(&root(1, 10)).unwrap();
        tx.commit().unwrap();

        // A writer still holding revision 1 is turned away at the storage
        // boundary rather than overwriting the committed root.
        let mut tx = second.begin().unwrap();
        assert_eq!(tx.write_revision(), Revision::new(2));
        let err = tx.store_signed_map_root(&root(1, 11)).unwrap_err();
        assert!(matches!(err, CoreError::RevisionConflict { .. }));
    }

    #[test]
    fn latest_root_ordering_is_configurable() {
        // Revision 2 carries an older timestamp than revision 1.
        let by_revision = storage();
        let mut tx = by_revision.begin().unwrap();
        tx.store_signed_map_root(&root(1, 200)).unwrap();
        tx.store_signed_map_root(&root(2, 100)).unwrap();
        assert_eq!(
            tx.latest_signed_map_root().unwrap().map_revision,
            Revision::new(2)
        );
        tx.commit().unwrap();

        let by_timestamp = storage_with(Config::new().root_ordering(RootOrdering::Timestamp));
        let mut tx = by_timestamp.begin().unwrap();
        tx.store_signed_map_root(&root(1, 200)).unwrap();
        tx.store_signed_map_root(&root(2, 100)).unwrap();
        assert_eq!(
            tx.latest_signed_map_root().unwrap().map_revision,
            Revision::new(1)
        );
    }

    #[test]
    fn roots_are_listed_by_revision() {
        let storage = storage();
        for _ in 0..3 {
            commit_revision(&storage, &[]);
        }
        let snapshot = storage.snapshot().unwrap();
        let revisions: Vec<i64> = snapshot
            .signed_map_roots()
            .unwrap()
            .iter()
            .map(|root| root.map_revision.as_i64())
            .collect();
        assert_eq!(revisions, vec![1, 2, 3]);
    }

    #[test]
    fn snapshot_close_releases_the_connection() {
        let storage = storage();
        let snapshot = storage.snapshot().unwrap();
        assert_eq!(snapshot.write_revision(), Revision::new(1));
        snapshot.close().unwrap();
        commit_revision(&storage, &[(1, "a")]);
    }
}
