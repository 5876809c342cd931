//! Metadata schema: entities, encodings, and domain tables
//!
//! One entity can span several column families. A directory, for example,
//! lives in four: its record in `Inode`, its modification and access times
//! in `MTime`/`ATime`, and its `(parent, name)` entry in `DEnt`. Each
//! (column family, entity) pair has a serde that knows its key and value
//! encodings and can tell whether a mutation changed them; the write planner
//! turns an `(original, modified)` pair into at most one delete and one put
//! per family.
//!
//! Tables sit on top: `DirTable`, `FileTable`, and `HardLinkTable` read
//! whole entities (assembling across families) and route writes through
//! every serde the entity touches. `DentView` unifies directory and
//! hard-link rows into the single listable `(parent, name) → entry` view.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod entity;
pub mod record;
pub mod serde;
pub mod tables;

pub use entity::{BlockId, Dir, File, HardLink};
pub use serde::{plan_write, ATimeSerde, DentSerde, InodeSerde, MTimeSerde, Serde};
pub use tables::{DentEntry, DentView, DirDent, DirTable, FileTable, HardLinkTable};
