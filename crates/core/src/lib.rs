//! Core types for the RocketFS namenode
//!
//! This crate defines the foundational pieces shared by every layer of the
//! metadata service:
//! - `InodeId` and the time-ordered inode ID generator
//! - `Acl`/`User` and the POSIX permission check
//! - Entry-name validation rules
//! - `Status`: the error-chain type every fallible call returns
//! - `Clock`: wall-clock abstraction so tests can pin time
//! - `Config`: process configuration with environment overrides
//! - `RequestArena`: per-request bump allocation for encode/decode scratch

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod acl;
pub mod arena;
pub mod config;
pub mod id;
pub mod name;
pub mod status;
pub mod time;

pub use acl::{check_permission, Acl, User};
pub use arena::RequestArena;
pub use config::Config;
pub use id::{unpack, IdParts, InodeId, InodeIdGen, TickerHandle};
pub use name::{validate_name, NameError, MAX_NAME_BYTES};
pub use status::{Result, Status, StatusKind};
pub use time::{Clock, FixedClock, SystemClock, SEC_TO_NS};
