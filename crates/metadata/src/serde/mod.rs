//! Per-column-family encoders and the write planner
//!
//! One serde per (column family, entity) pair. Keys are packed by hand so
//! their byte order equals the logical index order: inode keys are the
//! big-endian ID, dent keys are `be_u64(parent) ∥ name`. Values go through
//! the record encodings.
//!
//! The planner turns a row's `(original, modified)` pair into at most one
//! delete and one put:
//!
//! | original | modified | key same? | value same? | emitted           |
//! |----------|----------|-----------|-------------|-------------------|
//! | none     | none     |           |             | nothing           |
//! | some     | none     |           |             | delete original   |
//! | none     | some     |           |             | put modified      |
//! | some     | some     | yes       | yes         | nothing           |
//! | some     | some     | yes       | no          | put               |
//! | some     | some     | no        | any         | delete + put      |
//!
//! A single entity mutation fans out across column families by running each
//! family's serde through this planner independently.

mod dent;
mod inode;
mod times;

pub use dent::DentSerde;
pub use inode::InodeSerde;
pub use times::{ATimeSerde, MTimeSerde};

use rocketfs_concurrency::Transaction;
use rocketfs_core::Result;
use rocketfs_storage::ColumnFamily;

/// Encoder for one (column family, entity) pair
pub trait Serde<E> {
    /// Key bytes; binary order must equal logical index order
    fn serialize_key(&self, entity: &E) -> Vec<u8>;

    /// Value bytes
    fn serialize_value(&self, entity: &E) -> Result<Vec<u8>>;

    /// Whether the mutation moved the row to a different key
    fn is_key_changed(&self, original: &E, modified: &E) -> bool;

    /// Whether the mutation changed this family's portion of the value
    fn is_value_changed(&self, original: &E, modified: &E) -> bool;
}

/// Planned operations for one row in one column family
#[derive(Debug, Default, PartialEq, Eq)]
pub struct WriteOps {
    /// Key to delete, if any
    pub del_key: Option<Vec<u8>>,
    /// Key/value to put, if any
    pub put_kv: Option<(Vec<u8>, Vec<u8>)>,
}

/// Compute the planner table for `(original, modified)`
pub fn write_ops<E, S: Serde<E>>(
    serde: &S,
    original: Option<&E>,
    modified: Option<&E>,
) -> Result<WriteOps> {
    let Some(modified) = modified else {
        return Ok(match original {
            Some(original) => WriteOps {
                del_key: Some(serde.serialize_key(original)),
                put_kv: None,
            },
            None => WriteOps::default(),
        });
    };
    let Some(original) = original else {
        return Ok(WriteOps {
            del_key: None,
            put_kv: Some((
                serde.serialize_key(modified),
                serde.serialize_value(modified)?,
            )),
        });
    };
    let key_changed = serde.is_key_changed(original, modified);
    let value_changed = serde.is_value_changed(original, modified);
    Ok(WriteOps {
        del_key: key_changed.then(|| serde.serialize_key(original)),
        put_kv: if key_changed || value_changed {
            Some((
                serde.serialize_key(modified),
                serde.serialize_value(modified)?,
            ))
        } else {
            None
        },
    })
}

/// Plan `(original, modified)` and stage the result into `txn`
pub fn plan_write<E, S: Serde<E>>(
    serde: &S,
    txn: &mut Transaction,
    cf: ColumnFamily,
    original: Option<&E>,
    modified: Option<&E>,
) -> Result<()> {
    let ops = write_ops(serde, original, modified)?;
    if let Some(key) = ops.del_key {
        txn.delete(cf, key)?;
    }
    if let Some((key, value)) = ops.put_kv {
        txn.put(cf, key, value)?;
    }
    Ok(())
}
