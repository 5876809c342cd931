//! Column-family KV driver
//!
//! This crate wraps the embedded store behind the narrow contract the
//! transaction engine needs:
//! - open with a fixed, ordered list of column families
//! - create a consistent read snapshot
//! - point get and ordered `[start, end)` range scan against a snapshot
//! - atomically apply a mixed put/delete batch
//!
//! Snapshots are stable against subsequent writes; batch application is
//! durable and atomic. Store-level errors surface as system status; a
//! missing key is `None`, never an error.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod column_family;
pub mod kv;
pub mod redb_store;

pub use column_family::ColumnFamily;
pub use kv::{KvSnapshot, KvStore, WriteBatch, WriteOp};
pub use redb_store::RedbKvStore;
