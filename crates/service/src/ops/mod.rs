//! Namespace operations
//!
//! One module per RPC method. Each operation builds a handler context
//! (arena + transaction + tables), runs its domain logic, commits if it
//! wrote anything, and translates the status chain into the response's
//! wire fields. Read-only operations drop their transaction instead of
//! committing, so they never take the detector's lock.

pub mod create;
pub mod get_inode;
pub mod list_dir;
pub mod lookup;
pub mod mkdirs;
pub mod ping_pong;

use rocketfs_concurrency::Transaction;
use rocketfs_core::{InodeId, RequestArena, Result, Status};
use rocketfs_metadata::{Dir, DirTable, FileTable};
use tracing::{debug, error};

/// Log a failed operation: system errors at error level, expected domain
/// failures (not-found, permission, conflict) at debug
pub(crate) fn log_failure(op: &'static str, status: &Status) {
    if status.is_system() {
        error!(op, status = %status, "operation failed");
    } else {
        debug!(op, status = %status, "operation rejected");
    }
}

/// What an inode ID resolved to when a directory was expected
pub(crate) enum DirLookup {
    /// The inode is a directory
    Found(Dir),
    /// The inode exists but is a regular file
    IsFile,
    /// No inode under this ID
    Missing,
}

/// Resolve `id` as a directory, distinguishing a regular file from a
/// missing inode; callers map the non-directory cases onto their own
/// status kinds
pub(crate) fn resolve_dir(
    txn: &mut Transaction,
    arena: &RequestArena,
    id: InodeId,
) -> Result<DirLookup> {
    if let Some(dir) = DirTable::read(txn, arena, id)? {
        return Ok(DirLookup::Found(dir));
    }
    if FileTable::read(txn, arena, id)?.is_some() {
        return Ok(DirLookup::IsFile);
    }
    Ok(DirLookup::Missing)
}

/// Resolve the parent directory of an operation: a file parent is
/// parent-not-a-directory, a missing one is parent-not-found
pub(crate) fn read_parent_dir(
    txn: &mut Transaction,
    arena: &RequestArena,
    parent_id: InodeId,
) -> Result<Dir> {
    match resolve_dir(txn, arena, parent_id)? {
        DirLookup::Found(dir) => Ok(dir),
        DirLookup::IsFile => Err(Status::parent_not_dir(format!(
            "inode {parent_id} is a regular file, not a directory"
        ))),
        DirLookup::Missing => Err(Status::parent_not_found(format!(
            "parent inode {parent_id} not found"
        ))),
    }
}
