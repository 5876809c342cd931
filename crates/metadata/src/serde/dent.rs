//! Serde for the `DEnt` column family
//!
//! Keyed by `be_u64(parent_id) ∥ name`, so all of a directory's entries are
//! one contiguous key range sorted by name. Valued by the tagged
//! [`DentRecord`], which holds either a directory or a hard link.

use bumpalo::collections::Vec as BumpVec;
use rocketfs_core::{InodeId, RequestArena, Result, Status};

use crate::entity::{Dir, HardLink};
use crate::record::{self, DentRecord, DirDentRecord, HardLinkDentRecord};
use crate::serde::Serde;

/// Encoder for directory-entry rows
#[derive(Debug, Default)]
pub struct DentSerde;

impl DentSerde {
    /// Key for `(parent, name)`, owned (write path)
    pub fn key(parent_id: InodeId, name: &str) -> Vec<u8> {
        let mut key = Vec::with_capacity(8 + name.len());
        key.extend_from_slice(&parent_id.to_be_bytes());
        key.extend_from_slice(name.as_bytes());
        key
    }

    /// Key for `(parent, name)`, allocated from the request arena (read path)
    pub fn read_key<'a>(arena: &'a RequestArena, parent_id: InodeId, name: &str) -> &'a [u8] {
        let mut buf = BumpVec::with_capacity_in(8 + name.len(), arena.bump());
        buf.extend_from_slice(&parent_id.to_be_bytes());
        buf.extend_from_slice(name.as_bytes());
        buf.into_bump_slice()
    }

    /// Decode a dent key into `(parent, name)`
    pub fn decode_key(key: &[u8]) -> Result<(InodeId, String)> {
        if key.len() < 8 {
            return Err(Status::system(format!(
                "dent key has length {}, want at least 8",
                key.len()
            )));
        }
        let (id_bytes, name_bytes) = key.split_at(8);
        let parent_id = InodeId::from_be_bytes(id_bytes.try_into().expect("split_at(8) is 8 bytes"));
        let name = std::str::from_utf8(name_bytes)
            .map_err(|e| Status::system(format!("dent key holds non-UTF-8 name: {e}")))?
            .to_string();
        Ok((parent_id, name))
    }

    /// Decode a dent value into its record form
    pub fn decode_value(bytes: &[u8]) -> Result<DentRecord> {
        record::decode(bytes)
    }
}

impl Serde<Dir> for DentSerde {
    fn serialize_key(&self, entity: &Dir) -> Vec<u8> {
        Self::key(entity.parent_id, &entity.name)
    }

    fn serialize_value(&self, entity: &Dir) -> Result<Vec<u8>> {
        record::encode(&DentRecord::Dir(DirDentRecord {
            parent_id: entity.parent_id.0,
            name: entity.name.clone(),
            id: entity.id.0,
        }))
    }

    fn is_key_changed(&self, original: &Dir, modified: &Dir) -> bool {
        original.parent_id != modified.parent_id || original.name != modified.name
    }

    fn is_value_changed(&self, original: &Dir, modified: &Dir) -> bool {
        original.id != modified.id
    }
}

impl Serde<HardLink> for DentSerde {
    fn serialize_key(&self, entity: &HardLink) -> Vec<u8> {
        Self::key(entity.parent_id, &entity.name)
    }

    fn serialize_value(&self, entity: &HardLink) -> Result<Vec<u8>> {
        record::encode(&DentRecord::HardLink(HardLinkDentRecord {
            parent_id: entity.parent_id.0,
            name: entity.name.clone(),
            id: entity.id.0,
        }))
    }

    fn is_key_changed(&self, original: &HardLink, modified: &HardLink) -> bool {
        original.parent_id != modified.parent_id || original.name != modified.name
    }

    fn is_value_changed(&self, original: &HardLink, modified: &HardLink) -> bool {
        original.id != modified.id
    }
}
