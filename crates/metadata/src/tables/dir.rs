//! Directory table
//!
//! A directory spans four column families: its record in `Inode`, the
//! split-out times in `MTime`/`ATime`, and its `(parent, name)` entry in
//! `DEnt`. Reads assemble all of them; writes run all four serdes through
//! the planner.

use rocketfs_concurrency::Transaction;
use rocketfs_core::{Acl, InodeId, RequestArena, Result, Status};
use rocketfs_storage::ColumnFamily;

use crate::entity::Dir;
use crate::record::InodeRecord;
use crate::serde::{plan_write, ATimeSerde, DentSerde, InodeSerde, MTimeSerde};
use crate::tables::dent_view::{DentEntry, DentView};

/// Mode bits of the synthesized root directory
const ROOT_PERM: u32 = 0o777;

/// Reads and writes of directory entities
pub struct DirTable;

impl DirTable {
    /// Read a directory by inode ID
    ///
    /// Returns `None` when the inode is absent or is not a directory. The
    /// root is synthesized with fixed defaults if it has no persisted row,
    /// so the root always exists.
    pub fn read(txn: &mut Transaction, arena: &RequestArena, id: InodeId) -> Result<Option<Dir>> {
        let key = InodeSerde::read_key(arena, id);
        let Some(inode_bytes) = txn.get(ColumnFamily::Inode, key)? else {
            if id == InodeId::ROOT {
                return Ok(Some(Self::synthesized_root()));
            }
            return Ok(None);
        };
        let record = match InodeSerde::decode_value(&inode_bytes)
            .map_err(|e| Status::system(format!("failed to decode inode {id}")).caused_by(e))?
        {
            InodeRecord::Dir(record) => record,
            InodeRecord::File(_) => return Ok(None),
        };

        // An inode row without its time rows is a broken write plan.
        let mtime_bytes = txn.get(ColumnFamily::MTime, key)?.ok_or_else(|| {
            Status::system(format!("inode {id} has no mtime row"))
        })?;
        let atime_bytes = txn.get(ColumnFamily::ATime, key)?.ok_or_else(|| {
            Status::system(format!("inode {id} has no atime row"))
        })?;
        Ok(Some(InodeSerde::dir_from_record(
            record,
            MTimeSerde::decode_value(&mtime_bytes)?,
            ATimeSerde::decode_value(&atime_bytes)?,
        )))
    }

    /// Read a directory by `(parent, name)`
    ///
    /// Returns `None` when the entry is absent or names a hard link. A dent
    /// hit chains into [`DirTable::read`] so the caller always sees a fully
    /// assembled directory.
    pub fn read_by_name(
        txn: &mut Transaction,
        arena: &RequestArena,
        parent_id: InodeId,
        name: &str,
    ) -> Result<Option<Dir>> {
        match DentView::read(txn, arena, parent_id, name)? {
            DentEntry::Dir(dent) => Self::read(txn, arena, dent.id),
            DentEntry::HardLink(_) | DentEntry::Absent => Ok(None),
        }
    }

    /// Stage a directory mutation across all four column families
    pub fn write(
        txn: &mut Transaction,
        original: Option<&Dir>,
        modified: Option<&Dir>,
    ) -> Result<()> {
        plan_write(&InodeSerde, txn, ColumnFamily::Inode, original, modified)?;
        plan_write(&MTimeSerde, txn, ColumnFamily::MTime, original, modified)?;
        plan_write(&ATimeSerde, txn, ColumnFamily::ATime, original, modified)?;
        plan_write(&DentSerde, txn, ColumnFamily::DEnt, original, modified)?;
        Ok(())
    }

    fn synthesized_root() -> Dir {
        Dir {
            parent_id: InodeId::ROOT,
            name: String::new(),
            id: InodeId::ROOT,
            acl: Acl {
                uid: 0,
                gid: 0,
                perm: ROOT_PERM,
            },
            ctime_ns: 0,
            mtime_ns: 0,
            atime_ns: 0,
        }
    }
}
