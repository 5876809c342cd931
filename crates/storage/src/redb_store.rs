//! redb-backed implementation of the store contract
//!
//! Column families map to redb tables; a `ReadTransaction` plays the role of
//! a snapshot (redb is MVCC, so an open read transaction is stable against
//! later writes); a single `WriteTransaction` across all touched tables is
//! the atomic batch.
//!
//! All tables are created eagerly at open so reads never observe a
//! yet-to-be-created table on a fresh database.

use std::fmt::Display;
use std::path::Path;

use redb::{Database, ReadOnlyTable, ReadableTable, TableDefinition};
use tracing::info;

use rocketfs_core::{Result, Status};

use crate::column_family::ColumnFamily;
use crate::kv::{KvSnapshot, KvStore, WriteBatch};

const T_DEFAULT: TableDefinition<&[u8], &[u8]> = TableDefinition::new("default");
const T_INODE: TableDefinition<&[u8], &[u8]> = TableDefinition::new("Inode");
const T_MTIME: TableDefinition<&[u8], &[u8]> = TableDefinition::new("DirectoryMTime");
const T_ATIME: TableDefinition<&[u8], &[u8]> = TableDefinition::new("ATime");
const T_DENT: TableDefinition<&[u8], &[u8]> = TableDefinition::new("DEnt");

fn table_def(cf: ColumnFamily) -> TableDefinition<'static, &'static [u8], &'static [u8]> {
    match cf {
        ColumnFamily::Default => T_DEFAULT,
        ColumnFamily::Inode => T_INODE,
        ColumnFamily::MTime => T_MTIME,
        ColumnFamily::ATime => T_ATIME,
        ColumnFamily::DEnt => T_DENT,
    }
}

fn store_err(what: &str, err: impl Display) -> Status {
    Status::system(format!("{what}: {err}"))
}

/// Embedded metadata store
pub struct RedbKvStore {
    db: Database,
}

impl RedbKvStore {
    /// File name of the store inside its configured directory
    pub const DB_FILE_NAME: &'static str = "namenode.redb";

    /// Open (or create) the store under `dir`, creating every column family
    pub fn open(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)
            .map_err(|e| store_err("failed to create kv store directory", e))?;
        let path = dir.join(Self::DB_FILE_NAME);
        let db = Database::create(&path)
            .map_err(|e| store_err("failed to open kv store database", e))?;

        // Tables must exist before the first snapshot is taken.
        let txn = db
            .begin_write()
            .map_err(|e| store_err("failed to begin bootstrap transaction", e))?;
        for cf in ColumnFamily::ALL {
            txn.open_table(table_def(cf))
                .map_err(|e| store_err("failed to create column family", e))?;
        }
        txn.commit()
            .map_err(|e| store_err("failed to commit bootstrap transaction", e))?;

        info!(path = %path.display(), "opened metadata kv store");
        Ok(RedbKvStore { db })
    }
}

impl KvStore for RedbKvStore {
    fn snapshot(&self) -> Result<Box<dyn KvSnapshot>> {
        let txn = self
            .db
            .begin_read()
            .map_err(|e| store_err("failed to begin read snapshot", e))?;
        let mut tables = Vec::with_capacity(ColumnFamily::ALL.len());
        for cf in ColumnFamily::ALL {
            tables.push(
                txn.open_table(table_def(cf))
                    .map_err(|e| store_err("failed to open column family for snapshot", e))?,
            );
        }
        Ok(Box::new(RedbSnapshot { tables }))
    }

    fn apply(&self, batch: WriteBatch) -> Result<()> {
        let txn = self
            .db
            .begin_write()
            .map_err(|e| store_err("failed to begin write batch", e))?;
        {
            // One handle per family, indexed in ColumnFamily::ALL order.
            let mut tables = Vec::with_capacity(ColumnFamily::ALL.len());
            for cf in ColumnFamily::ALL {
                tables.push(
                    txn.open_table(table_def(cf))
                        .map_err(|e| store_err("failed to open column family for write", e))?,
                );
            }
            for op in batch.iter() {
                let table = &mut tables[op.cf as usize];
                match &op.value {
                    Some(value) => {
                        table
                            .insert(op.key.as_slice(), value.as_slice())
                            .map_err(|e| store_err("failed to stage put", e))?;
                    }
                    None => {
                        table
                            .remove(op.key.as_slice())
                            .map_err(|e| store_err("failed to stage delete", e))?;
                    }
                }
            }
        }
        txn.commit()
            .map_err(|e| store_err("failed to commit write batch", e))?;
        Ok(())
    }
}

struct RedbSnapshot {
    // Indexed in ColumnFamily::ALL order; the tables keep the underlying
    // read transaction alive.
    tables: Vec<ReadOnlyTable<&'static [u8], &'static [u8]>>,
}

impl RedbSnapshot {
    fn table(&self, cf: ColumnFamily) -> &ReadOnlyTable<&'static [u8], &'static [u8]> {
        &self.tables[cf as usize]
    }
}

impl KvSnapshot for RedbSnapshot {
    fn get(&self, cf: ColumnFamily, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let guard = self
            .table(cf)
            .get(key)
            .map_err(|e| store_err("snapshot get failed", e))?;
        Ok(guard.map(|g| g.value().to_vec()))
    }

    fn range(
        &self,
        cf: ColumnFamily,
        start: &[u8],
        end: &[u8],
        limit: usize,
    ) -> Result<Vec<Vec<u8>>> {
        let mut values = Vec::new();
        if limit == 0 || start >= end {
            return Ok(values);
        }
        let iter = self
            .table(cf)
            .range::<&[u8]>(start..end)
            .map_err(|e| store_err("snapshot range failed", e))?;
        for entry in iter {
            let (_, value) = entry.map_err(|e| store_err("snapshot range iteration failed", e))?;
            values.push(value.value().to_vec());
            if values.len() == limit {
                break;
            }
        }
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_store() -> (TempDir, RedbKvStore) {
        let dir = TempDir::new().unwrap();
        let store = RedbKvStore::open(dir.path()).unwrap();
        (dir, store)
    }

    #[test]
    fn test_get_absent_is_none() {
        let (_dir, store) = open_store();
        let snapshot = store.snapshot().unwrap();
        assert_eq!(
            snapshot.get(ColumnFamily::Inode, b"missing").unwrap(),
            None
        );
    }

    #[test]
    fn test_put_then_get() {
        let (_dir, store) = open_store();
        let mut batch = WriteBatch::new();
        batch.put(ColumnFamily::Inode, b"k".to_vec(), b"v".to_vec());
        store.apply(batch).unwrap();

        let snapshot = store.snapshot().unwrap();
        assert_eq!(
            snapshot.get(ColumnFamily::Inode, b"k").unwrap(),
            Some(b"v".to_vec())
        );
    }

    #[test]
    fn test_snapshot_is_stable_against_later_writes() {
        let (_dir, store) = open_store();
        let before = store.snapshot().unwrap();

        let mut batch = WriteBatch::new();
        batch.put(ColumnFamily::Inode, b"k".to_vec(), b"v".to_vec());
        store.apply(batch).unwrap();

        assert_eq!(before.get(ColumnFamily::Inode, b"k").unwrap(), None);
        let after = store.snapshot().unwrap();
        assert_eq!(
            after.get(ColumnFamily::Inode, b"k").unwrap(),
            Some(b"v".to_vec())
        );
    }

    #[test]
    fn test_batch_is_atomic_across_families() {
        let (_dir, store) = open_store();
        let mut batch = WriteBatch::new();
        batch.put(ColumnFamily::Inode, b"i".to_vec(), b"1".to_vec());
        batch.put(ColumnFamily::MTime, b"i".to_vec(), b"2".to_vec());
        batch.put(ColumnFamily::DEnt, b"i".to_vec(), b"3".to_vec());
        store.apply(batch).unwrap();

        let snapshot = store.snapshot().unwrap();
        assert!(snapshot.get(ColumnFamily::Inode, b"i").unwrap().is_some());
        assert!(snapshot.get(ColumnFamily::MTime, b"i").unwrap().is_some());
        assert!(snapshot.get(ColumnFamily::DEnt, b"i").unwrap().is_some());
    }

    #[test]
    fn test_families_are_isolated() {
        let (_dir, store) = open_store();
        let mut batch = WriteBatch::new();
        batch.put(ColumnFamily::Inode, b"same-key".to_vec(), b"inode".to_vec());
        store.apply(batch).unwrap();

        let snapshot = store.snapshot().unwrap();
        assert!(snapshot
            .get(ColumnFamily::Inode, b"same-key")
            .unwrap()
            .is_some());
        assert!(snapshot
            .get(ColumnFamily::MTime, b"same-key")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_delete_removes_key() {
        let (_dir, store) = open_store();
        let mut batch = WriteBatch::new();
        batch.put(ColumnFamily::DEnt, b"k".to_vec(), b"v".to_vec());
        store.apply(batch).unwrap();

        let mut batch = WriteBatch::new();
        batch.delete(ColumnFamily::DEnt, b"k".to_vec());
        store.apply(batch).unwrap();

        let snapshot = store.snapshot().unwrap();
        assert_eq!(snapshot.get(ColumnFamily::DEnt, b"k").unwrap(), None);
    }

    #[test]
    fn test_range_is_ordered_and_limited() {
        let (_dir, store) = open_store();
        let mut batch = WriteBatch::new();
        // Inserted out of order on purpose.
        for key in [b"b", b"d", b"a", b"c"] {
            batch.put(ColumnFamily::DEnt, key.to_vec(), key.to_vec());
        }
        store.apply(batch).unwrap();

        let snapshot = store.snapshot().unwrap();
        let values = snapshot.range(ColumnFamily::DEnt, b"a", b"e", 3).unwrap();
        assert_eq!(values, vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]);
    }

    #[test]
    fn test_range_end_is_exclusive() {
        let (_dir, store) = open_store();
        let mut batch = WriteBatch::new();
        batch.put(ColumnFamily::DEnt, b"a".to_vec(), b"a".to_vec());
        batch.put(ColumnFamily::DEnt, b"b".to_vec(), b"b".to_vec());
        store.apply(batch).unwrap();

        let snapshot = store.snapshot().unwrap();
        let values = snapshot.range(ColumnFamily::DEnt, b"a", b"b", 10).unwrap();
        assert_eq!(values, vec![b"a".to_vec()]);
    }

    #[test]
    fn test_range_zero_limit_is_empty() {
        let (_dir, store) = open_store();
        let snapshot = store.snapshot().unwrap();
        assert!(snapshot
            .range(ColumnFamily::DEnt, b"a", b"z", 0)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_reopen_preserves_data() {
        let dir = TempDir::new().unwrap();
        {
            let store = RedbKvStore::open(dir.path()).unwrap();
            let mut batch = WriteBatch::new();
            batch.put(ColumnFamily::Inode, b"persisted".to_vec(), b"yes".to_vec());
            store.apply(batch).unwrap();
        }
        let store = RedbKvStore::open(dir.path()).unwrap();
        let snapshot = store.snapshot().unwrap();
        assert_eq!(
            snapshot.get(ColumnFamily::Inode, b"persisted").unwrap(),
            Some(b"yes".to_vec())
        );
    }
}
