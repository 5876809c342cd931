//! Store abstraction consumed by the transaction engine
//!
//! `KvStore` and `KvSnapshot` are the seams that keep the engine independent
//! of the embedded store. Implementations must guarantee:
//! - snapshots are stable against writes applied after their creation
//! - `apply` is atomic across column families and durable on return
//! - range scans return values in ascending key order

use rocketfs_core::Result;

use crate::column_family::ColumnFamily;

/// One staged mutation inside a [`WriteBatch`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOp {
    /// Target column family
    pub cf: ColumnFamily,
    /// Encoded key
    pub key: Vec<u8>,
    /// `Some` puts, `None` deletes
    pub value: Option<Vec<u8>>,
}

/// An ordered set of puts and deletes applied as one atomic unit
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    /// Create an empty batch
    pub fn new() -> Self {
        WriteBatch::default()
    }

    /// Stage a put
    pub fn put(&mut self, cf: ColumnFamily, key: Vec<u8>, value: Vec<u8>) {
        self.ops.push(WriteOp {
            cf,
            key,
            value: Some(value),
        });
    }

    /// Stage a delete
    pub fn delete(&mut self, cf: ColumnFamily, key: Vec<u8>) {
        self.ops.push(WriteOp {
            cf,
            key,
            value: None,
        });
    }

    /// Whether the batch stages nothing
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Number of staged operations
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Iterate the staged operations in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &WriteOp> {
        self.ops.iter()
    }
}

impl IntoIterator for WriteBatch {
    type Item = WriteOp;
    type IntoIter = std::vec::IntoIter<WriteOp>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.into_iter()
    }
}

/// A consistent point-in-time view of the store
pub trait KvSnapshot: Send + Sync {
    /// Point lookup; `None` when the key is absent
    fn get(&self, cf: ColumnFamily, key: &[u8]) -> Result<Option<Vec<u8>>>;

    /// Values of keys in `[start, end)`, ascending, at most `limit`
    fn range(
        &self,
        cf: ColumnFamily,
        start: &[u8],
        end: &[u8],
        limit: usize,
    ) -> Result<Vec<Vec<u8>>>;
}

/// The embedded store behind the transaction engine
pub trait KvStore: Send + Sync {
    /// Create a read snapshot stable against subsequent writes
    fn snapshot(&self) -> Result<Box<dyn KvSnapshot>>;

    /// Apply `batch` atomically and durably
    fn apply(&self, batch: WriteBatch) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_preserves_insertion_order() {
        let mut batch = WriteBatch::new();
        batch.put(ColumnFamily::Inode, vec![1], vec![10]);
        batch.delete(ColumnFamily::DEnt, vec![2]);
        batch.put(ColumnFamily::MTime, vec![3], vec![30]);

        let ops: Vec<_> = batch.iter().collect();
        assert_eq!(ops.len(), 3);
        assert_eq!(ops[0].cf, ColumnFamily::Inode);
        assert_eq!(ops[1].value, None);
        assert_eq!(ops[2].key, vec![3]);
    }

    #[test]
    fn test_empty_batch() {
        let batch = WriteBatch::new();
        assert!(batch.is_empty());
        assert_eq!(batch.len(), 0);
    }
}
