//! File table
//!
//! Files span `Inode`, `MTime`, and `ATime`, with no dent row: a file's directory
//! entries are hard-link rows, looked up through the dent view.

use rocketfs_concurrency::Transaction;
use rocketfs_core::{InodeId, RequestArena, Result, Status};
use rocketfs_storage::ColumnFamily;

use crate::entity::File;
use crate::record::InodeRecord;
use crate::serde::{plan_write, ATimeSerde, InodeSerde, MTimeSerde};

/// Reads and writes of file entities
pub struct FileTable;

impl FileTable {
    /// Read a file by inode ID
    ///
    /// Returns `None` when the inode is absent or is a directory.
    pub fn read(txn: &mut Transaction, arena: &RequestArena, id: InodeId) -> Result<Option<File>> {
        let key = InodeSerde::read_key(arena, id);
        let Some(inode_bytes) = txn.get(ColumnFamily::Inode, key)? else {
            return Ok(None);
        };
        let record = match InodeSerde::decode_value(&inode_bytes)
            .map_err(|e| Status::system(format!("failed to decode inode {id}")).caused_by(e))?
        {
            InodeRecord::File(record) => record,
            InodeRecord::Dir(_) => return Ok(None),
        };

        let mtime_bytes = txn
            .get(ColumnFamily::MTime, key)?
            .ok_or_else(|| Status::system(format!("inode {id} has no mtime row")))?;
        let atime_bytes = txn
            .get(ColumnFamily::ATime, key)?
            .ok_or_else(|| Status::system(format!("inode {id} has no atime row")))?;
        Ok(Some(InodeSerde::file_from_record(
            record,
            MTimeSerde::decode_value(&mtime_bytes)?,
            ATimeSerde::decode_value(&atime_bytes)?,
        )))
    }

    /// Stage a file mutation across its three column families
    pub fn write(
        txn: &mut Transaction,
        original: Option<&File>,
        modified: Option<&File>,
    ) -> Result<()> {
        plan_write(&InodeSerde, txn, ColumnFamily::Inode, original, modified)?;
        plan_write(&MTimeSerde, txn, ColumnFamily::MTime, original, modified)?;
        plan_write(&ATimeSerde, txn, ColumnFamily::ATime, original, modified)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::BlockId;
    use rocketfs_concurrency::TxnStore;
    use rocketfs_core::Acl;
    use rocketfs_storage::RedbKvStore;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn open() -> (TempDir, TxnStore, RequestArena) {
        let dir = TempDir::new().unwrap();
        let kv = Arc::new(RedbKvStore::open(dir.path()).unwrap());
        (dir, TxnStore::new(kv), RequestArena::with_prealloc(4096))
    }

    fn sample_file(id: u64) -> File {
        File {
            id: InodeId(id),
            acl: Acl {
                uid: 1000,
                gid: 1000,
                perm: 0o644,
            },
            nlink: 1,
            len: 1024,
            block_size: 4096,
            blocks: vec![BlockId(1), BlockId(2)],
            ctime_ns: 5,
            mtime_ns: 6,
            atime_ns: 7,
        }
    }

    #[tokio::test]
    async fn test_create_then_read_round_trip() {
        let (_tmp, store, arena) = open();
        let f = sample_file(50);

        let mut txn = store.begin().unwrap();
        FileTable::write(&mut txn, None, Some(&f)).unwrap();
        store.commit(txn).await.unwrap();

        let mut txn = store.begin().unwrap();
        assert_eq!(FileTable::read(&mut txn, &arena, f.id).unwrap(), Some(f));
    }

    #[tokio::test]
    async fn test_missing_file_is_none() {
        let (_tmp, store, arena) = open();
        let mut txn = store.begin().unwrap();
        assert_eq!(FileTable::read(&mut txn, &arena, InodeId(1234)).unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_write_stages_three_rows() {
        let (_tmp, store, _arena) = open();
        let f = sample_file(50);
        let mut txn = store.begin().unwrap();
        FileTable::write(&mut txn, None, Some(&f)).unwrap();
        assert_eq!(txn.write_set_len(), 3);
    }

    #[tokio::test]
    async fn test_dir_inode_is_not_a_file() {
        let (_tmp, store, arena) = open();
        let d = crate::entity::Dir {
            parent_id: InodeId::ROOT,
            name: "d".to_string(),
            id: InodeId(60),
            acl: Acl {
                uid: 0,
                gid: 0,
                perm: 0o755,
            },
            ctime_ns: 1,
            mtime_ns: 1,
            atime_ns: 1,
        };
        let mut txn = store.begin().unwrap();
        crate::tables::DirTable::write(&mut txn, None, Some(&d)).unwrap();
        store.commit(txn).await.unwrap();

        let mut txn = store.begin().unwrap();
        assert_eq!(FileTable::read(&mut txn, &arena, d.id).unwrap(), None);
    }

    #[tokio::test]
    async fn test_len_update_rewrites_inode_row_only_when_changed() {
        let (_tmp, store, _arena) = open();
        let f = sample_file(50);
        let mut grown = f.clone();
        grown.len = 2048;
        grown.blocks.push(BlockId(3));

        let mut txn = store.begin().unwrap();
        FileTable::write(&mut txn, Some(&f), Some(&grown)).unwrap();
        // len/blocks live in the inode record; times unchanged.
        assert_eq!(txn.write_set_len(), 1);
    }
}
