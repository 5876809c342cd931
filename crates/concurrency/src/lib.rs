//! Serializable optimistic concurrency control over the KV driver
//!
//! A transaction reads through a stable snapshot while recording what it
//! observed (point keys and scan ranges) and buffers every mutation in a
//! write set. Nothing touches the store until commit. At commit time the
//! conflict detector checks the read set against every transaction that
//! committed concurrently; if none of them wrote a key this transaction
//! read, the write set is applied as one atomic batch.
//!
//! The scheme is the FoundationDB one:
//! 1. assign a read version when the transaction starts;
//! 2. assign a commit version at commit;
//! 3. the transaction is conflict-free iff no key it read was written
//!    between those two versions.
//!
//! Ensuring no cycles in the direct serialization graph guarantees
//! serializability; see Adya's "Weak Consistency: A Generalized Theory and
//! Optimistic Implementations for Distributed Transactions".

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod conflict;
pub mod store;
pub mod transaction;

pub use conflict::{CommittedTxn, ConflictDetector};
pub use store::TxnStore;
pub use transaction::{Expected, RangeRead, Transaction, TxnState};
