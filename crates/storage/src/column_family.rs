//! Column families of the metadata store
//!
//! A column family is a named, independently-keyed table inside the single
//! embedded store. The time columns are split out from the inode records so
//! that high-frequency touch updates write a narrow 8-byte value instead of
//! rewriting the full record.

use serde::{Deserialize, Serialize};

/// The fixed set of column families, in open order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ColumnFamily {
    /// Unused by the metadata schema; kept so the store always has its
    /// conventional default family
    Default,
    /// Inode records keyed by `be_u64(inode_id)`
    Inode,
    /// Modification times keyed by `be_u64(inode_id)`
    MTime,
    /// Access times keyed by `be_u64(inode_id)`
    ATime,
    /// Directory entries keyed by `be_u64(parent_id) ∥ name`
    DEnt,
}

impl ColumnFamily {
    /// All column families, in open order
    pub const ALL: [ColumnFamily; 5] = [
        ColumnFamily::Default,
        ColumnFamily::Inode,
        ColumnFamily::MTime,
        ColumnFamily::ATime,
        ColumnFamily::DEnt,
    ];

    /// Persisted table name
    pub fn name(self) -> &'static str {
        match self {
            ColumnFamily::Default => "default",
            ColumnFamily::Inode => "Inode",
            ColumnFamily::MTime => "DirectoryMTime",
            ColumnFamily::ATime => "ATime",
            ColumnFamily::DEnt => "DEnt",
        }
    }
}

impl std::fmt::Display for ColumnFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
