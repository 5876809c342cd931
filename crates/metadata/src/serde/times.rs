//! Serdes for the `MTime` and `ATime` column families
//!
//! Same key as the inode row; the value is a raw big-endian `i64`. Keeping
//! the high-churn timestamps in their own narrow columns means a touch
//! writes eight bytes instead of re-serializing the whole inode record.

use rocketfs_core::{InodeId, Result, Status};

use crate::entity::{Dir, File};
use crate::serde::{InodeSerde, Serde};

fn encode_time(ns: i64) -> Vec<u8> {
    ns.to_be_bytes().to_vec()
}

/// Decode a time-column value
pub(crate) fn decode_time(bytes: &[u8]) -> Result<i64> {
    let bytes: [u8; 8] = bytes.try_into().map_err(|_| {
        Status::system(format!("time value has length {}, want 8", bytes.len()))
    })?;
    Ok(i64::from_be_bytes(bytes))
}

/// Encoder for modification-time rows
#[derive(Debug, Default)]
pub struct MTimeSerde;

impl MTimeSerde {
    /// Decode an mtime value
    pub fn decode_value(bytes: &[u8]) -> Result<i64> {
        decode_time(bytes)
    }
}

impl Serde<Dir> for MTimeSerde {
    fn serialize_key(&self, entity: &Dir) -> Vec<u8> {
        InodeSerde::key(entity.id)
    }

    fn serialize_value(&self, entity: &Dir) -> Result<Vec<u8>> {
        Ok(encode_time(entity.mtime_ns))
    }

    fn is_key_changed(&self, original: &Dir, modified: &Dir) -> bool {
        original.id != modified.id
    }

    fn is_value_changed(&self, original: &Dir, modified: &Dir) -> bool {
        original.mtime_ns != modified.mtime_ns
    }
}

impl Serde<File> for MTimeSerde {
    fn serialize_key(&self, entity: &File) -> Vec<u8> {
        InodeSerde::key(entity.id)
    }

    fn serialize_value(&self, entity: &File) -> Result<Vec<u8>> {
        Ok(encode_time(entity.mtime_ns))
    }

    fn is_key_changed(&self, original: &File, modified: &File) -> bool {
        original.id != modified.id
    }

    fn is_value_changed(&self, original: &File, modified: &File) -> bool {
        original.mtime_ns != modified.mtime_ns
    }
}

/// Encoder for access-time rows
#[derive(Debug, Default)]
pub struct ATimeSerde;

impl ATimeSerde {
    /// Decode an atime value
    pub fn decode_value(bytes: &[u8]) -> Result<i64> {
        decode_time(bytes)
    }
}

impl Serde<Dir> for ATimeSerde {
    fn serialize_key(&self, entity: &Dir) -> Vec<u8> {
        InodeSerde::key(entity.id)
    }

    fn serialize_value(&self, entity: &Dir) -> Result<Vec<u8>> {
        Ok(encode_time(entity.atime_ns))
    }

    fn is_key_changed(&self, original: &Dir, modified: &Dir) -> bool {
        original.id != modified.id
    }

    fn is_value_changed(&self, original: &Dir, modified: &Dir) -> bool {
        original.atime_ns != modified.atime_ns
    }
}

impl Serde<File> for ATimeSerde {
    fn serialize_key(&self, entity: &File) -> Vec<u8> {
        InodeSerde::key(entity.id)
    }

    fn serialize_value(&self, entity: &File) -> Result<Vec<u8>> {
        Ok(encode_time(entity.atime_ns))
    }

    fn is_key_changed(&self, original: &File, modified: &File) -> bool {
        original.id != modified.id
    }

    fn is_value_changed(&self, original: &File, modified: &File) -> bool {
        original.atime_ns != modified.atime_ns
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rocketfs_core::Acl;

    fn dir(mtime_ns: i64, atime_ns: i64) -> Dir {
        Dir {
            parent_id: InodeId::ROOT,
            name: "d".to_string(),
            id: InodeId(4),
            acl: Acl {
                uid: 0,
                gid: 0,
                perm: 0o777,
            },
            ctime_ns: 0,
            mtime_ns,
            atime_ns,
        }
    }

    #[test]
    fn test_time_value_round_trip() {
        for ns in [0i64, 1, -1, i64::MAX, i64::MIN, 1_700_000_000_000_000_000] {
            assert_eq!(decode_time(&encode_time(ns)).unwrap(), ns);
        }
    }

    #[test]
    fn test_time_value_is_eight_bytes() {
        let d = dir(55, 66);
        assert_eq!(Serde::<Dir>::serialize_value(&MTimeSerde, &d).unwrap().len(), 8);
        assert_eq!(Serde::<Dir>::serialize_value(&ATimeSerde, &d).unwrap().len(), 8);
    }

    #[test]
    fn test_mtime_change_only_dirties_mtime() {
        let orig = dir(1, 1);
        let touched = dir(2, 1);
        assert!(Serde::<Dir>::is_value_changed(&MTimeSerde, &orig, &touched));
        assert!(!Serde::<Dir>::is_value_changed(&ATimeSerde, &orig, &touched));
    }

    #[test]
    fn test_truncated_time_value_is_system_error() {
        assert!(decode_time(&[1, 2, 3]).is_err());
    }
}
