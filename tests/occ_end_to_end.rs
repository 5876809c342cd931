//! Concurrency-control scenarios driven through the metadata tables
//!
//! These tests interleave transactions by hand to exercise the conflict
//! detector with real namespace rows rather than raw keys.

use std::sync::Arc;

use tempfile::TempDir;

use rocketfs_concurrency::TxnStore;
use rocketfs_core::{Acl, InodeId, RequestArena, StatusKind};
use rocketfs_metadata::{DentView, Dir, DirTable};
use rocketfs_storage::RedbKvStore;

fn open() -> (TempDir, TxnStore) {
    let dir = TempDir::new().unwrap();
    let kv = Arc::new(RedbKvStore::open(dir.path()).unwrap());
    (dir, TxnStore::new(kv))
}

fn new_dir(name: &str, id: u64) -> Dir {
    Dir {
        parent_id: InodeId::ROOT,
        name: name.to_string(),
        id: InodeId(id),
        acl: Acl {
            uid: 1000,
            gid: 1000,
            perm: 0o755,
        },
        ctime_ns: 1,
        mtime_ns: 1,
        atime_ns: 1,
    }
}

/// Two transactions probe the same absent name and both try to create it.
/// The first commit wins; the second aborts with a conflict and leaves the
/// store untouched by its writes.
#[tokio::test]
async fn test_concurrent_mkdir_same_name_conflicts() {
    let (_tmp, store) = open();
    let arena = RequestArena::with_prealloc(4096);

    let mut t1 = store.begin().unwrap();
    let mut t2 = store.begin().unwrap();

    assert!(DentView::read(&mut t1, &arena, InodeId::ROOT, "a")
        .unwrap()
        .is_absent());
    assert!(DentView::read(&mut t2, &arena, InodeId::ROOT, "a")
        .unwrap()
        .is_absent());

    DirTable::write(&mut t1, None, Some(&new_dir("a", 100))).unwrap();
    DirTable::write(&mut t2, None, Some(&new_dir("a", 101))).unwrap();

    store.commit(t1).await.unwrap();
    let err = store.commit(t2).await.unwrap_err();
    assert_eq!(err.kind(), StatusKind::Conflict);

    // The surviving row is the winner's.
    let mut reader = store.begin().unwrap();
    let survivor = DirTable::read_by_name(&mut reader, &arena, InodeId::ROOT, "a")
        .unwrap()
        .unwrap();
    assert_eq!(survivor.id, InodeId(100));
}

/// Creates under different names touch disjoint keys and commit freely.
#[tokio::test]
async fn test_concurrent_mkdir_different_names_both_commit() {
    let (_tmp, store) = open();
    let arena = RequestArena::with_prealloc(4096);

    let mut t1 = store.begin().unwrap();
    let mut t2 = store.begin().unwrap();

    assert!(DentView::read(&mut t1, &arena, InodeId::ROOT, "a")
        .unwrap()
        .is_absent());
    assert!(DentView::read(&mut t2, &arena, InodeId::ROOT, "b")
        .unwrap()
        .is_absent());

    DirTable::write(&mut t1, None, Some(&new_dir("a", 100))).unwrap();
    DirTable::write(&mut t2, None, Some(&new_dir("b", 101))).unwrap();

    store.commit(t1).await.unwrap();
    store.commit(t2).await.unwrap();
}

/// A listing conflicts with a concurrent create inside the listed range.
#[tokio::test]
async fn test_list_conflicts_with_concurrent_create() {
    let (_tmp, store) = open();
    let arena = RequestArena::with_prealloc(4096);

    let mut lister = store.begin().unwrap();
    let entries = DentView::list(&mut lister, &arena, InodeId::ROOT, "", 100).unwrap();
    assert!(entries.is_empty());
    // Give the lister a write so its commit is not a no-op observation.
    DirTable::write(&mut lister, None, Some(&new_dir("marker", 200))).unwrap();

    let mut creator = store.begin().unwrap();
    DirTable::write(&mut creator, None, Some(&new_dir("intruder", 201))).unwrap();
    store.commit(creator).await.unwrap();

    let err = store.commit(lister).await.unwrap_err();
    assert_eq!(err.kind(), StatusKind::Conflict);
}

/// A listing is untouched by creates under a different parent.
#[tokio::test]
async fn test_list_ignores_create_under_other_parent() {
    let (_tmp, store) = open();
    let arena = RequestArena::with_prealloc(4096);

    // Seed a subdirectory to create under.
    let mut seed = store.begin().unwrap();
    DirTable::write(&mut seed, None, Some(&new_dir("sub", 300))).unwrap();
    store.commit(seed).await.unwrap();

    let mut lister = store.begin().unwrap();
    DentView::list(&mut lister, &arena, InodeId(300), "", 100).unwrap();
    DirTable::write(&mut lister, None, Some(&new_dir("marker", 301))).unwrap();

    let mut creator = store.begin().unwrap();
    DirTable::write(&mut creator, None, Some(&new_dir("elsewhere", 302))).unwrap();
    store.commit(creator).await.unwrap();

    store.commit(lister).await.unwrap();
}

/// After the ledger is purged past a transaction's snapshot, its commit
/// aborts rather than risking missed conflicts.
#[tokio::test]
async fn test_purged_ledger_aborts_old_transaction() {
    let (_tmp, store) = open();
    let arena = RequestArena::with_prealloc(4096);

    let mut old = store.begin().unwrap();
    assert!(DentView::read(&mut old, &arena, InodeId::ROOT, "x")
        .unwrap()
        .is_absent());
    DirTable::write(&mut old, None, Some(&new_dir("x", 400))).unwrap();

    store.purge_to(store.current_version()).await;

    let err = store.commit(old).await.unwrap_err();
    assert_eq!(err.kind(), StatusKind::Conflict);

    // A fresh transaction proceeds normally.
    let mut fresh = store.begin().unwrap();
    assert!(DentView::read(&mut fresh, &arena, InodeId::ROOT, "x")
        .unwrap()
        .is_absent());
    DirTable::write(&mut fresh, None, Some(&new_dir("x", 401))).unwrap();
    store.commit(fresh).await.unwrap();
}
