//! Persisted record encodings
//!
//! Values are tagged unions serialized with bincode: the enum discriminant
//! is the variant tag, so readers dispatch on it and unknown variants fail
//! loudly instead of being misread. Schema growth happens by appending
//! variants or optional trailing fields.
//!
//! The time columns are not records at all; they hold a raw big-endian
//! `i64` so a touch writes exactly eight bytes.

use rocketfs_core::{Acl, Result, Status};
use serde::{Deserialize, Serialize};

/// Value of the `Inode` column family
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InodeRecord {
    /// The inode is a directory
    Dir(DirInodeRecord),
    /// The inode is a regular file
    File(FileInodeRecord),
}

/// Directory fields persisted in the `Inode` column family
///
/// `mtime`/`atime` are deliberately absent; they live in their own columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirInodeRecord {
    /// Containing directory
    pub parent_id: u64,
    /// Entry name within the parent
    pub name: String,
    /// This directory's inode ID
    pub id: u64,
    /// Ownership and mode bits
    pub acl: Acl,
    /// Status-change time
    pub ctime_ns: i64,
}

/// File fields persisted in the `Inode` column family
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileInodeRecord {
    /// This file's inode ID
    pub id: u64,
    /// Ownership and mode bits
    pub acl: Acl,
    /// Hard-link count
    pub nlink: u32,
    /// Length in bytes
    pub len: u64,
    /// Block size in bytes
    pub block_size: u32,
    /// Data blocks, in order
    pub blocks: Vec<u64>,
    /// Status-change time
    pub ctime_ns: i64,
}

/// Value of the `DEnt` column family
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DentRecord {
    /// The entry names a directory
    Dir(DirDentRecord),
    /// The entry is a hard link to a file
    HardLink(HardLinkDentRecord),
}

/// Directory fields persisted in the `DEnt` column family
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirDentRecord {
    /// Containing directory
    pub parent_id: u64,
    /// Entry name
    pub name: String,
    /// The directory's inode ID
    pub id: u64,
}

/// Hard-link fields persisted in the `DEnt` column family
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HardLinkDentRecord {
    /// Containing directory
    pub parent_id: u64,
    /// Entry name
    pub name: String,
    /// The linked file's inode ID
    pub id: u64,
}

/// Encode a record value
pub fn encode<T: Serialize>(record: &T) -> Result<Vec<u8>> {
    bincode::serialize(record)
        .map_err(|e| Status::system(format!("failed to encode record: {e}")))
}

/// Decode a record value
pub fn decode<'a, T: Deserialize<'a>>(bytes: &'a [u8]) -> Result<T> {
    bincode::deserialize(bytes)
        .map_err(|e| Status::system(format!("failed to decode record: {e}")))
}
