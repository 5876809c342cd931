//! TxnStore: the engine façade tying snapshots, versions, and the detector
//!
//! Owns the KV driver handle, the global version counter, and the conflict
//! detector. `begin` is synchronous (snapshot + version); `commit` is async
//! because it takes the detector's mutex.
//!
//! Inside the detector lock the pipeline is: validate the read set, apply
//! the write batch, record the commit in the ledger. Applying inside the
//! lock is what keeps a freshly started transaction from snapshotting
//! between a concurrent commit's validation and its batch landing.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::debug;

use rocketfs_core::{Result, Status};
use rocketfs_storage::KvStore;

use crate::conflict::{CommittedTxn, ConflictDetector, Validation};
use crate::transaction::Transaction;

/// Transactional façade over the KV driver
pub struct TxnStore {
    kv: Arc<dyn KvStore>,
    version: AtomicU64,
    detector: ConflictDetector,
}

impl TxnStore {
    /// Wrap a KV store; versions start at 1
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        TxnStore {
            kv,
            version: AtomicU64::new(1),
            detector: ConflictDetector::new(),
        }
    }

    /// Current value of the version counter (the next version to assign)
    pub fn current_version(&self) -> u64 {
        self.version.load(Ordering::SeqCst)
    }

    fn allocate_version(&self) -> u64 {
        self.version
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |v| v.checked_add(1))
            .expect("version counter overflow: u64::MAX reached")
    }

    /// Start a transaction: fresh snapshot plus a start version
    pub fn begin(&self) -> Result<Transaction> {
        let start_version = self.allocate_version();
        let snapshot = self.kv.snapshot()?;
        Ok(Transaction::new(start_version, snapshot))
    }

    /// Commit a transaction
    ///
    /// Returns the commit version. On conflict all staged state is
    /// discarded and the error kind is `Conflict`; the caller may retry
    /// with a fresh transaction. KV failures are fatal system errors.
    pub async fn commit(&self, mut txn: Transaction) -> Result<u64> {
        txn.begin_commit()?;
        let commit_version = self.allocate_version();

        match self.detector.validate(&txn, commit_version).await {
            Validation::Conflict(reason) => {
                txn.mark_aborted();
                debug!(
                    start_version = txn.start_version(),
                    commit_version, reason, "transaction aborted by conflict detection"
                );
                Err(Status::conflict(format!(
                    "transaction {commit_version} aborted: {reason}"
                )))
            }
            Validation::ConflictFree(ledger) => {
                let (batch, write_keys) = txn.drain_writes();
                if !batch.is_empty() {
                    self.kv.apply(batch)?;
                }
                ledger.record(commit_version, CommittedTxn::new(write_keys));
                txn.mark_committed();
                debug!(
                    start_version = txn.start_version(),
                    commit_version, "transaction committed"
                );
                Ok(commit_version)
            }
        }
    }

    /// Garbage-collect the committed ledger up to `version`
    pub async fn purge_to(&self, version: u64) {
        self.detector.purge_to(version).await;
    }

    /// Ledger size (diagnostics)
    pub async fn ledger_len(&self) -> usize {
        self.detector.ledger_len().await
    }
}
