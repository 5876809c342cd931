//! Directory-entry view
//!
//! The logical union of directory rows and hard-link rows under one
//! `(parent, name) → entry` mapping. Lookup and listing both go through
//! this view, which is what makes `(parent, name)` globally unique across
//! the two entity kinds.
//!
//! Listing scans `[be(parent) ∥ start_after ∥ 0x00, be(parent) ∥ 0xFF)`:
//! the appended NUL resumes strictly after the cursor entry (names cannot
//! contain NUL), and 0xFF never occurs in UTF-8, so the upper bound covers
//! every entry of the parent and nothing else.

use bumpalo::collections::Vec as BumpVec;
use rocketfs_concurrency::Transaction;
use rocketfs_core::{InodeId, RequestArena, Result, Status};
use rocketfs_storage::ColumnFamily;

use crate::entity::HardLink;
use crate::record::DentRecord;
use crate::serde::DentSerde;

/// A directory row as seen through the dent view
///
/// Carries only the fields persisted in the `DEnt` family; assemble the
/// full directory through `DirTable::read` when attributes are needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirDent {
    /// Containing directory
    pub parent_id: InodeId,
    /// Entry name
    pub name: String,
    /// The directory's inode ID
    pub id: InodeId,
}

/// One entry of the view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DentEntry {
    /// No entry under this name
    Absent,
    /// The name belongs to a directory
    Dir(DirDent),
    /// The name is a hard link to a file
    HardLink(HardLink),
}

impl DentEntry {
    /// Whether this is [`DentEntry::Absent`]
    pub fn is_absent(&self) -> bool {
        matches!(self, DentEntry::Absent)
    }
}

fn entry_from_record(record: DentRecord) -> DentEntry {
    match record {
        DentRecord::Dir(dir) => DentEntry::Dir(DirDent {
            parent_id: InodeId(dir.parent_id),
            name: dir.name,
            id: InodeId(dir.id),
        }),
        DentRecord::HardLink(link) => DentEntry::HardLink(HardLink {
            parent_id: InodeId(link.parent_id),
            name: link.name,
            id: InodeId(link.id),
        }),
    }
}

/// Lookup and listing over the unified entry view
pub struct DentView;

impl DentView {
    /// Look up `(parent, name)`
    pub fn read(
        txn: &mut Transaction,
        arena: &RequestArena,
        parent_id: InodeId,
        name: &str,
    ) -> Result<DentEntry> {
        let key = DentSerde::read_key(arena, parent_id, name);
        let Some(bytes) = txn.get(ColumnFamily::DEnt, key)? else {
            return Ok(DentEntry::Absent);
        };
        let record = DentSerde::decode_value(&bytes).map_err(|e| {
            Status::system(format!(
                "failed to decode dir entry under parent {parent_id} named {name:?}"
            ))
            .caused_by(e)
        })?;
        Ok(entry_from_record(record))
    }

    /// List up to `limit` entries of `parent_id` in name order, resuming
    /// strictly after `start_after` (empty = from the beginning)
    pub fn list(
        txn: &mut Transaction,
        arena: &RequestArena,
        parent_id: InodeId,
        start_after: &str,
        limit: usize,
    ) -> Result<Vec<DentEntry>> {
        let start = if start_after.is_empty() {
            DentSerde::read_key(arena, parent_id, "")
        } else {
            DentSerde::read_key(arena, parent_id, &format!("{start_after}\0"))
        };
        // Upper bound is the raw byte 0xFF, which UTF-8 names never contain.
        let end = {
            let mut buf = BumpVec::with_capacity_in(9, arena.bump());
            buf.extend_from_slice(&parent_id.to_be_bytes());
            buf.push(0xFF);
            buf.into_bump_slice()
        };

        let values = txn.range(ColumnFamily::DEnt, start, end, limit)?;
        let mut entries = Vec::with_capacity(values.len());
        for bytes in &values {
            let record = DentSerde::decode_value(bytes).map_err(|e| {
                Status::system(format!(
                    "failed to decode dir entry while listing parent {parent_id}"
                ))
                .caused_by(e)
            })?;
            entries.push(entry_from_record(record));
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Dir;
    use crate::tables::{DirTable, HardLinkTable};
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

    fn dir(name: &str, id: u64) -> Dir {
        Dir {
            parent_id: InodeId::ROOT,
            name: name.to_string(),
            id: InodeId(id),
            acl: Acl {
                uid: 0,
                gid: 0,
                perm: 0o755,
            },
            ctime_ns: 0,
            mtime_ns: 0,
            atime_ns: 0,
        }
    }

    async fn seed(store: &TxnStore, dirs: &[(&str, u64)], links: &[(&str, u64)]) {
        let mut txn = store.begin().unwrap();
        for (name, id) in dirs {
            DirTable::write(&mut txn, None, Some(&dir(name, *id))).unwrap();
        }
        for (name, id) in links {
            let link = HardLink {
                parent_id: InodeId::ROOT,
                name: name.to_string(),
                id: InodeId(*id),
            };
            HardLinkTable::write(&mut txn, None, Some(&link)).unwrap();
        }
        store.commit(txn).await.unwrap();
    }

    #[tokio::test]
    async fn test_read_absent() {
        let (_tmp, store, arena) = open();
        let mut txn = store.begin().unwrap();
        assert!(DentView::read(&mut txn, &arena, InodeId::ROOT, "nope")
            .unwrap()
            .is_absent());
    }

    #[tokio::test]
    async fn test_read_finds_both_kinds() {
        let (_tmp, store, arena) = open();
        seed(&store, &[("d", 10)], &[("f", 11)]).await;

        let mut txn = store.begin().unwrap();
        match DentView::read(&mut txn, &arena, InodeId::ROOT, "d").unwrap() {
            DentEntry::Dir(dent) => {
                assert_eq!(dent.id, InodeId(10));
                assert_eq!(dent.name, "d");
            }
            other => panic!("expected dir entry, got {other:?}"),
        }
        match DentView::read(&mut txn, &arena, InodeId::ROOT, "f").unwrap() {
            DentEntry::HardLink(link) => assert_eq!(link.id, InodeId(11)),
            other => panic!("expected hard link, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_list_is_name_ordered() {
        let (_tmp, store, arena) = open();
        seed(&store, &[("c", 3), ("a", 1), ("b", 2)], &[]).await;

        let mut txn = store.begin().unwrap();
        let entries = DentView::list(&mut txn, &arena, InodeId::ROOT, "", 10).unwrap();
        let names: Vec<_> = entries
            .iter()
            .map(|e| match e {
                DentEntry::Dir(d) => d.name.clone(),
                DentEntry::HardLink(l) => l.name.clone(),
                DentEntry::Absent => unreachable!("list never yields absent"),
            })
            .collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_list_resumes_strictly_after_cursor() {
        let (_tmp, store, arena) = open();
        seed(&store, &[("a", 1), ("b", 2), ("c", 3)], &[]).await;

        let mut txn = store.begin().unwrap();
        let entries = DentView::list(&mut txn, &arena, InodeId::ROOT, "b", 10).unwrap();
        assert_eq!(entries.len(), 1);
        match &entries[0] {
            DentEntry::Dir(d) => assert_eq!(d.name, "c"),
            other => panic!("expected dir entry, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_list_respects_limit() {
        let (_tmp, store, arena) = open();
        seed(&store, &[("a", 1), ("b", 2), ("c", 3)], &[]).await;

        let mut txn = store.begin().unwrap();
        let entries = DentView::list(&mut txn, &arena, InodeId::ROOT, "", 2).unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[tokio::test]
    async fn test_list_does_not_leak_other_parents() {
        let (_tmp, store, arena) = open();
        seed(&store, &[("a", 1)], &[]).await;
        // An entry under a different parent, adjacent in key space.
        let mut txn = store.begin().unwrap();
        let foreign = Dir {
            parent_id: InodeId(2),
            ..dir("x", 99)
        };
        DirTable::write(&mut txn, None, Some(&foreign)).unwrap();
        store.commit(txn).await.unwrap();

        let mut txn = store.begin().unwrap();
        let entries = DentView::list(&mut txn, &arena, InodeId::ROOT, "", 10).unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn test_list_mixes_dirs_and_links() {
        let (_tmp, store, arena) = open();
        seed(&store, &[("dir1", 1)], &[("file1", 2)]).await;

        let mut txn = store.begin().unwrap();
        let entries = DentView::list(&mut txn, &arena, InodeId::ROOT, "", 10).unwrap();
        assert_eq!(entries.len(), 2);
        assert!(matches!(entries[0], DentEntry::Dir(_)));
        assert!(matches!(entries[1], DentEntry::HardLink(_)));
    }
}
