//! Namespace entities
//!
//! Rows are owned values. Directories reference their parent by ID and hard
//! links reference their file by ID, so there are no structural cycles;
//! cross-table consistency is a commit-time property enforced by the write
//! planner, not by pointers.

use rocketfs_core::{Acl, InodeId};
use serde::{Deserialize, Serialize};

/// Identifier of a data block on the datanodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockId(pub u64);

/// A directory
///
/// Primary key `id`; secondary uniqueness `(parent_id, name)`. The root has
/// `parent_id == id == InodeId::ROOT`, an empty name, mode `0o777`, and
/// zero timestamps; it is synthesized on read if no row exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dir {
    /// Containing directory (self for root)
    pub parent_id: InodeId,
    /// Entry name within the parent (empty for root)
    pub name: String,
    /// This directory's inode ID
    pub id: InodeId,
    /// Ownership and mode bits
    pub acl: Acl,
    /// Status-change time, nanoseconds since the Unix epoch
    pub ctime_ns: i64,
    /// Modification time
    pub mtime_ns: i64,
    /// Access time
    pub atime_ns: i64,
}

/// A regular file
///
/// Addressed by `id`; its directory entries are hard-link rows. A file may
/// only be deleted once `nlink` reaches zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    /// This file's inode ID
    pub id: InodeId,
    /// Ownership and mode bits
    pub acl: Acl,
    /// Number of hard links referencing this file (≥ 1)
    pub nlink: u32,
    /// Length in bytes
    pub len: u64,
    /// Block size in bytes
    pub block_size: u32,
    /// Data blocks, in order
    pub blocks: Vec<BlockId>,
    /// Status-change time, nanoseconds since the Unix epoch
    pub ctime_ns: i64,
    /// Modification time
    pub mtime_ns: i64,
    /// Access time
    pub atime_ns: i64,
}

/// A directory entry pointing at a file
///
/// Primary key `(parent_id, name)`, globally unique across directories and
/// hard links because both live in the single dent view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HardLink {
    /// Containing directory
    pub parent_id: InodeId,
    /// Entry name within the parent
    pub name: String,
    /// The linked file's inode ID
    pub id: InodeId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entities_compare_by_value() {
        let acl = Acl {
            uid: 0,
            gid: 0,
            perm: 0o755,
        };
        let a = Dir {
            parent_id: InodeId::ROOT,
            name: "a".to_string(),
            id: InodeId(7),
            acl,
            ctime_ns: 1,
            mtime_ns: 2,
            atime_ns: 3,
        };
        let mut b = a.clone();
        assert_eq!(a, b);
        b.atime_ns = 4;
        assert_ne!(a, b);
    }
}
