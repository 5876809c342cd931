//! Conflict detector: the committed-transaction ledger
//!
//! The ledger maps commit version → the keys that transaction wrote. A
//! committing transaction scans every entry in the open interval
//! `(start_version, commit_version)` and conflicts iff any of those wrote a
//! key its read set covers.
//!
//! The ledger sits behind an async mutex: commit is the sole global
//! serialization point, and acquiring it is a suspension point rather than a
//! blocked thread. `purge_to` bounds ledger growth; transactions older than
//! the purge horizon can no longer be validated and must abort.

use std::collections::BTreeMap;
use std::ops::Bound::Excluded;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

use rocketfs_storage::ColumnFamily;

use crate::transaction::Transaction;

/// Write-set keys of one committed transaction
#[derive(Debug, Clone)]
pub struct CommittedTxn {
    write_keys: Vec<(ColumnFamily, Vec<u8>)>,
}

impl CommittedTxn {
    /// Record a committed transaction's write keys
    pub fn new(write_keys: Vec<(ColumnFamily, Vec<u8>)>) -> Self {
        CommittedTxn { write_keys }
    }

    fn conflicts_with(&self, txn: &Transaction) -> bool {
        self.write_keys
            .iter()
            .any(|(cf, key)| txn.reads_key(*cf, key))
    }
}

#[derive(Debug, Default)]
struct Ledger {
    committed: BTreeMap<u64, CommittedTxn>,
    latest_purged_version: u64,
}

/// Serialization point of the commit pipeline
#[derive(Debug, Default)]
pub struct ConflictDetector {
    ledger: Arc<Mutex<Ledger>>,
}

/// Outcome of a validation pass
pub(crate) enum Validation {
    /// No concurrent committed transaction wrote into the read set; the
    /// guard keeps the ledger locked until the commit is recorded
    ConflictFree(ValidationGuard),
    /// The transaction must abort
    Conflict(&'static str),
}

/// Holds the ledger lock between validation and recording so the write
/// batch applies inside the serialization point
pub(crate) struct ValidationGuard {
    guard: OwnedMutexGuard<Ledger>,
}

impl ValidationGuard {
    /// Insert the committed transaction and release the ledger
    pub(crate) fn record(mut self, commit_version: u64, committed: CommittedTxn) {
        self.guard.committed.insert(commit_version, committed);
    }
}

impl ConflictDetector {
    /// Create an empty detector
    pub fn new() -> Self {
        ConflictDetector::default()
    }

    /// Validate `txn` for commit at `commit_version`
    ///
    /// On success the returned guard keeps the ledger locked; the caller
    /// applies the write batch and then records the commit, so no other
    /// transaction can interleave between validation and application.
    pub(crate) async fn validate(&self, txn: &Transaction, commit_version: u64) -> Validation {
        let guard = Arc::clone(&self.ledger).lock_owned().await;
        debug_assert!(txn.start_version() < commit_version);

        if txn.start_version() < guard.latest_purged_version {
            return Validation::Conflict("snapshot is older than the purged ledger horizon");
        }

        let conflict = guard
            .committed
            .range((Excluded(txn.start_version()), Excluded(commit_version)))
            .any(|(_, committed)| committed.conflicts_with(txn));
        if conflict {
            return Validation::Conflict("a concurrent commit wrote a key in the read set");
        }
        Validation::ConflictFree(ValidationGuard { guard })
    }

    /// Drop ledger entries with `commit_version ≤ version` and raise the
    /// purge horizon
    ///
    /// Transactions that started at or before the new horizon will abort at
    /// commit. Nothing purges automatically; GC cadence is the caller's
    /// policy.
    pub async fn purge_to(&self, version: u64) {
        let mut guard = self.ledger.lock().await;
        let retained = guard.committed.split_off(&(version + 1));
        let dropped = guard.committed.len();
        guard.committed = retained;
        if version > guard.latest_purged_version {
            guard.latest_purged_version = version;
        }
        debug!(version, dropped, "purged committed-transaction ledger");
    }

    /// Number of ledger entries (diagnostics)
    pub async fn ledger_len(&self) -> usize {
        self.ledger.lock().await.committed.len()
    }
}
