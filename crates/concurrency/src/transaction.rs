//! Transaction: snapshot reads plus buffered writes
//!
//! Reads check the transaction's own write set first (read-your-writes),
//! then fall through to the snapshot and record what was observed. Writes
//! only ever touch the write set; a later put or delete on the same key
//! replaces the earlier staged operation.
//!
//! Range scans read the snapshot only; staged writes are not overlaid onto
//! scan results. The namespace operations write strictly after their reads,
//! so nothing observes the difference.

use rocketfs_core::{Result, Status};
use rocketfs_storage::{ColumnFamily, KvSnapshot, WriteBatch};
use rustc_hash::FxHashMap;

/// Observed values above this size are recorded as [`Expected::PresentAny`]
/// so large records do not bloat the read set. Conflict checking is
/// key-based; retained bytes are diagnostic only.
pub const READ_SET_VALUE_RETENTION_BOUND: usize = 4096;

const CF_COUNT: usize = ColumnFamily::ALL.len();

/// What a point read observed, for validation bookkeeping
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expected {
    /// The key was absent
    Absent,
    /// The key was present; bytes not retained
    PresentAny,
    /// The key was present with these bytes
    Present(Vec<u8>),
}

/// One recorded range read, `[start, end)` within a column family
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeRead {
    /// Scanned column family
    pub cf: ColumnFamily,
    /// Inclusive lower bound
    pub start: Vec<u8>,
    /// Exclusive upper bound
    pub end: Vec<u8>,
}

/// Transaction lifecycle
///
/// Only `Open → Committing` is caller-driven; the engine drives the rest.
/// Reads and writes fail in any state but `Open`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxnState {
    /// Accepting reads and writes
    Open,
    /// Handed to the commit pipeline
    Committing,
    /// Write set applied
    Committed,
    /// Discarded (conflict or caller abandonment)
    Aborted,
}

/// An open transaction: one snapshot, one read set, one write set
pub struct Transaction {
    start_version: u64,
    snapshot: Box<dyn KvSnapshot>,
    read_set: [FxHashMap<Vec<u8>, Expected>; CF_COUNT],
    read_ranges: Vec<RangeRead>,
    write_set: [FxHashMap<Vec<u8>, Option<Vec<u8>>>; CF_COUNT],
    state: TxnState,
}

impl Transaction {
    /// Called by the engine; use `TxnStore::begin` to start transactions
    pub(crate) fn new(start_version: u64, snapshot: Box<dyn KvSnapshot>) -> Self {
        Transaction {
            start_version,
            snapshot,
            read_set: Default::default(),
            read_ranges: Vec::new(),
            write_set: Default::default(),
            state: TxnState::Open,
        }
    }

    /// Version assigned when this transaction started
    pub fn start_version(&self) -> u64 {
        self.start_version
    }

    /// Current lifecycle state
    pub fn state(&self) -> TxnState {
        self.state
    }

    /// Whether the write set is empty
    pub fn is_read_only(&self) -> bool {
        self.write_set.iter().all(|m| m.is_empty())
    }

    fn ensure_open(&self) -> Result<()> {
        if self.state != TxnState::Open {
            return Err(Status::invalid_argument(format!(
                "transaction is {:?}, not open",
                self.state
            )));
        }
        Ok(())
    }

    /// Point read with read-set recording
    pub fn get(&mut self, cf: ColumnFamily, key: &[u8]) -> Result<Option<Vec<u8>>> {
        self.get_inner(cf, key, false)
    }

    /// Point read excluded from conflict detection
    pub fn get_excluded(&mut self, cf: ColumnFamily, key: &[u8]) -> Result<Option<Vec<u8>>> {
        self.get_inner(cf, key, true)
    }

    fn get_inner(
        &mut self,
        cf: ColumnFamily,
        key: &[u8],
        exclude_from_read_conflict: bool,
    ) -> Result<Option<Vec<u8>>> {
        self.ensure_open()?;
        if let Some(staged) = self.write_set[cf as usize].get(key) {
            // Pending value, visible to this transaction only; no read-set
            // entry, since commit validation already covers own writes.
            return Ok(staged.clone());
        }
        let value = self.snapshot.get(cf, key)?;
        if !exclude_from_read_conflict {
            let expected = match &value {
                None => Expected::Absent,
                Some(bytes) if bytes.len() > READ_SET_VALUE_RETENTION_BOUND => Expected::PresentAny,
                Some(bytes) => Expected::Present(bytes.clone()),
            };
            self.read_set[cf as usize].insert(key.to_vec(), expected);
        }
        Ok(value)
    }

    /// Ordered scan of `[start, end)` with a recorded range conflict entry
    pub fn range(
        &mut self,
        cf: ColumnFamily,
        start: &[u8],
        end: &[u8],
        limit: usize,
    ) -> Result<Vec<Vec<u8>>> {
        self.range_inner(cf, start, end, limit, false)
    }

    /// Ordered scan excluded from conflict detection
    pub fn range_excluded(
        &mut self,
        cf: ColumnFamily,
        start: &[u8],
        end: &[u8],
        limit: usize,
    ) -> Result<Vec<Vec<u8>>> {
        self.range_inner(cf, start, end, limit, true)
    }

    fn range_inner(
        &mut self,
        cf: ColumnFamily,
        start: &[u8],
        end: &[u8],
        limit: usize,
        exclude_from_read_conflict: bool,
    ) -> Result<Vec<Vec<u8>>> {
        self.ensure_open()?;
        let values = self.snapshot.range(cf, start, end, limit)?;
        if !exclude_from_read_conflict {
            self.read_ranges.push(RangeRead {
                cf,
                start: start.to_vec(),
                end: end.to_vec(),
            });
        }
        Ok(values)
    }

    /// Stage a put; replaces any earlier staged operation on the key
    pub fn put(&mut self, cf: ColumnFamily, key: Vec<u8>, value: Vec<u8>) -> Result<()> {
        self.ensure_open()?;
        self.write_set[cf as usize].insert(key, Some(value));
        Ok(())
    }

    /// Stage a delete; replaces any earlier staged operation on the key
    pub fn delete(&mut self, cf: ColumnFamily, key: Vec<u8>) -> Result<()> {
        self.ensure_open()?;
        self.write_set[cf as usize].insert(key, None);
        Ok(())
    }

    /// Whether this transaction's read set covers `key` (point or range)
    pub fn reads_key(&self, cf: ColumnFamily, key: &[u8]) -> bool {
        if self.read_set[cf as usize].contains_key(key) {
            return true;
        }
        self.read_ranges
            .iter()
            .any(|r| r.cf == cf && r.start.as_slice() <= key && key < r.end.as_slice())
    }

    /// Number of point reads recorded
    pub fn read_set_len(&self) -> usize {
        self.read_set.iter().map(|m| m.len()).sum()
    }

    /// Number of staged writes across all column families
    pub fn write_set_len(&self) -> usize {
        self.write_set.iter().map(|m| m.len()).sum()
    }

    /// The staged operation on `key`, if any: `Some(Some(_))` is a pending
    /// put, `Some(None)` a pending delete
    pub fn staged_write(&self, cf: ColumnFamily, key: &[u8]) -> Option<Option<&[u8]>> {
        self.write_set[cf as usize]
            .get(key)
            .map(|v| v.as_deref())
    }

    /// Transition `Open → Committing`
    pub(crate) fn begin_commit(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.state = TxnState::Committing;
        Ok(())
    }

    pub(crate) fn mark_committed(&mut self) {
        debug_assert_eq!(self.state, TxnState::Committing);
        self.state = TxnState::Committed;
    }

    pub(crate) fn mark_aborted(&mut self) {
        self.state = TxnState::Aborted;
    }

    /// Drain the write set into an atomic batch plus the ledger key list
    pub(crate) fn drain_writes(&mut self) -> (WriteBatch, Vec<(ColumnFamily, Vec<u8>)>) {
        let mut batch = WriteBatch::new();
        let mut keys = Vec::new();
        for cf in ColumnFamily::ALL {
            for (key, value) in self.write_set[cf as usize].drain() {
                keys.push((cf, key.clone()));
                match value {
                    Some(value) => batch.put(cf, key, value),
                    None => batch.delete(cf, key),
                }
            }
        }
        (batch, keys)
    }

    #[cfg(test)]
    pub(crate) fn expected_for(&self, cf: ColumnFamily, key: &[u8]) -> Option<&Expected> {
        self.read_set[cf as usize].get(key)
    }
}
