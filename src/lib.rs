//! RocketFS: a distributed filesystem prototype
//!
//! This crate re-exports the namenode metadata core: the transactional
//! column-family store, the namespace tables, and the client-namenode
//! service. The `namenode` binary in this package is the server
//! entrypoint.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub use rocketfs_concurrency::{Transaction, TxnStore};
pub use rocketfs_core::{Acl, Config, InodeId, Status, StatusKind, User};
pub use rocketfs_metadata::{DentView, Dir, DirTable, File, FileTable, HardLink, HardLinkTable};
pub use rocketfs_service::{dispatch, serve, Client, NameNodeContext, Request, Response};
pub use rocketfs_storage::{ColumnFamily, KvSnapshot, KvStore, RedbKvStore};
