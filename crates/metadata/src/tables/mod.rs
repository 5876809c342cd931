//! Domain tables over the transaction engine
//!
//! Tables read whole entities (assembling the column families an entity
//! spans) and write through the planner so each family stages at most one
//! delete and one put. All reads return `Result<Option<_>>`: a missing row
//! is `None`, never an error.
//!
//! Tables are stateless; every call takes the transaction and the request
//! arena explicitly, which keeps the borrows visible at the call site.

mod dent_view;
mod dir;
mod file;
mod hard_link;

pub use dent_view::{DentEntry, DentView, DirDent};
pub use dir::DirTable;
pub use file::FileTable;
pub use hard_link::HardLinkTable;
