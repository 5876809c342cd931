//! Hard-link table
//!
//! Hard links live entirely in the `DEnt` column family; the linked file is
//! fetched separately through the file table.

use rocketfs_concurrency::Transaction;
use rocketfs_core::{InodeId, RequestArena, Result};
use rocketfs_storage::ColumnFamily;

use crate::entity::HardLink;
use crate::serde::{plan_write, DentSerde};
use crate::tables::dent_view::{DentEntry, DentView};

/// Reads and writes of hard-link entities
pub struct HardLinkTable;

impl HardLinkTable {
    /// Read a hard link by `(parent, name)`
    ///
    /// Returns `None` when the entry is absent or names a directory.
    pub fn read(
        txn: &mut Transaction,
        arena: &RequestArena,
        parent_id: InodeId,
        name: &str,
    ) -> Result<Option<HardLink>> {
        match DentView::read(txn, arena, parent_id, name)? {
            DentEntry::HardLink(link) => Ok(Some(link)),
            DentEntry::Dir(_) | DentEntry::Absent => Ok(None),
        }
    }

    /// Stage a hard-link mutation
    pub fn write(
        txn: &mut Transaction,
        original: Option<&HardLink>,
        modified: Option<&HardLink>,
    ) -> Result<()> {
        plan_write(&DentSerde, txn, ColumnFamily::DEnt, original, modified)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rocketfs_concurrency::TxnStore;
    use rocketfs_storage::RedbKvStore;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn open() -> (TempDir, TxnStore, RequestArena) {
        let dir = TempDir::new().unwrap();
        let kv = Arc::new(RedbKvStore::open(dir.path()).unwrap());
        (dir, TxnStore::new(kv), RequestArena::with_prealloc(4096))
    }

    fn link(name: &str, id: u64) -> HardLink {
        HardLink {
            parent_id: InodeId::ROOT,
            name: name.to_string(),
            id: InodeId(id),
        }
    }

    #[tokio::test]
    async fn test_create_then_read_round_trip() {
        let (_tmp, store, arena) = open();
        let l = link("notes.txt", 70);

        let mut txn = store.begin().unwrap();
        HardLinkTable::write(&mut txn, None, Some(&l)).unwrap();
        store.commit(txn).await.unwrap();

        let mut txn = store.begin().unwrap();
        assert_eq!(
            HardLinkTable::read(&mut txn, &arena, InodeId::ROOT, "notes.txt").unwrap(),
            Some(l)
        );
    }

    #[tokio::test]
    async fn test_absent_is_none() {
        let (_tmp, store, arena) = open();
        let mut txn = store.begin().unwrap();
        assert_eq!(
            HardLinkTable::read(&mut txn, &arena, InodeId::ROOT, "absent").unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_directory_entry_is_not_a_hard_link() {
        let (_tmp, store, arena) = open();
        let d = crate::entity::Dir {
            parent_id: InodeId::ROOT,
            name: "subdir".to_string(),
            id: InodeId(71),
            acl: rocketfs_core::Acl {
                uid: 0,
                gid: 0,
                perm: 0o755,
            },
            ctime_ns: 0,
            mtime_ns: 0,
            atime_ns: 0,
        };
        let mut txn = store.begin().unwrap();
        crate::tables::DirTable::write(&mut txn, None, Some(&d)).unwrap();
        store.commit(txn).await.unwrap();

        let mut txn = store.begin().unwrap();
        assert_eq!(
            HardLinkTable::read(&mut txn, &arena, InodeId::ROOT, "subdir").unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_rename_within_parent_deletes_and_puts() {
        let (_tmp, store, _arena) = open();
        let old = link("old", 70);
        let new = link("new", 70);

        let mut txn = store.begin().unwrap();
        HardLinkTable::write(&mut txn, None, Some(&old)).unwrap();
        store.commit(txn).await.unwrap();

        let mut txn = store.begin().unwrap();
        HardLinkTable::write(&mut txn, Some(&old), Some(&new)).unwrap();
        // Key changed: one delete plus one put.
        assert_eq!(txn.write_set_len(), 2);
    }
}
