//! Serde for the `Inode` column family
//!
//! Keyed by `be_u64(inode_id)`; valued by the tagged [`InodeRecord`].
//! Implements [`Serde`] for both `Dir` and `File` since either entity kind
//! can occupy an inode row.

use bumpalo::collections::Vec as BumpVec;
use rocketfs_core::{InodeId, RequestArena, Result, Status};

use crate::entity::{BlockId, Dir, File};
use crate::record::{self, DirInodeRecord, FileInodeRecord, InodeRecord};
use crate::serde::Serde;

/// Encoder for inode rows
#[derive(Debug, Default)]
pub struct InodeSerde;

impl InodeSerde {
    /// Key for an inode ID, owned (write path)
    pub fn key(id: InodeId) -> Vec<u8> {
        id.to_be_bytes().to_vec()
    }

    /// Key for an inode ID, allocated from the request arena (read path)
    pub fn read_key(arena: &RequestArena, id: InodeId) -> &[u8] {
        let mut buf = BumpVec::with_capacity_in(8, arena.bump());
        buf.extend_from_slice(&id.to_be_bytes());
        buf.into_bump_slice()
    }

    /// Decode an inode key
    pub fn decode_key(key: &[u8]) -> Result<InodeId> {
        let bytes: [u8; 8] = key
            .try_into()
            .map_err(|_| Status::system(format!("inode key has length {}, want 8", key.len())))?;
        Ok(InodeId::from_be_bytes(bytes))
    }

    /// Decode an inode value into its record form
    pub fn decode_value(bytes: &[u8]) -> Result<InodeRecord> {
        record::decode(bytes)
    }

    fn dir_record(dir: &Dir) -> InodeRecord {
        InodeRecord::Dir(DirInodeRecord {
            parent_id: dir.parent_id.0,
            name: dir.name.clone(),
            id: dir.id.0,
            acl: dir.acl,
            ctime_ns: dir.ctime_ns,
        })
    }

    fn file_record(file: &File) -> InodeRecord {
        InodeRecord::File(FileInodeRecord {
            id: file.id.0,
            acl: file.acl,
            nlink: file.nlink,
            len: file.len,
            block_size: file.block_size,
            blocks: file.blocks.iter().map(|b| b.0).collect(),
            ctime_ns: file.ctime_ns,
        })
    }

    /// Rebuild a `Dir` from its inode record plus the split-out times
    pub fn dir_from_record(record: DirInodeRecord, mtime_ns: i64, atime_ns: i64) -> Dir {
        Dir {
            parent_id: InodeId(record.parent_id),
            name: record.name,
            id: InodeId(record.id),
            acl: record.acl,
            ctime_ns: record.ctime_ns,
            mtime_ns,
            atime_ns,
        }
    }

    /// Rebuild a `File` from its inode record plus the split-out times
    pub fn file_from_record(record: FileInodeRecord, mtime_ns: i64, atime_ns: i64) -> File {
        File {
            id: InodeId(record.id),
            acl: record.acl,
            nlink: record.nlink,
            len: record.len,
            block_size: record.block_size,
            blocks: record.blocks.into_iter().map(BlockId).collect(),
            ctime_ns: record.ctime_ns,
            mtime_ns,
            atime_ns,
        }
    }
}

impl Serde<Dir> for InodeSerde {
    fn serialize_key(&self, entity: &Dir) -> Vec<u8> {
        Self::key(entity.id)
    }

    fn serialize_value(&self, entity: &Dir) -> Result<Vec<u8>> {
        record::encode(&Self::dir_record(entity))
    }

    fn is_key_changed(&self, original: &Dir, modified: &Dir) -> bool {
        original.id != modified.id
    }

    fn is_value_changed(&self, original: &Dir, modified: &Dir) -> bool {
        // mtime/atime live in their own columns and do not dirty this row.
        original.parent_id != modified.parent_id
            || original.name != modified.name
            || original.id != modified.id
            || original.acl != modified.acl
            || original.ctime_ns != modified.ctime_ns
    }
}

impl Serde<File> for InodeSerde {
    fn serialize_key(&self, entity: &File) -> Vec<u8> {
        Self::key(entity.id)
    }

    fn serialize_value(&self, entity: &File) -> Result<Vec<u8>> {
        record::encode(&Self::file_record(entity))
    }

    fn is_key_changed(&self, original: &File, modified: &File) -> bool {
        original.id != modified.id
    }

    fn is_value_changed(&self, original: &File, modified: &File) -> bool {
        original.id != modified.id
            || original.acl != modified.acl
            || original.nlink != modified.nlink
            || original.len != modified.len
            || original.block_size != modified.block_size
            || original.blocks != modified.blocks
            || original.ctime_ns != modified.ctime_ns
    }
}
