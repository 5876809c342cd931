//! Client-namenode service
//!
//! The unary RPC surface of the namenode: wire messages, the per-request
//! handler context (arena + transaction + tables), the operation bodies,
//! and the TCP server loop that frames bincode messages with a u32 length
//! prefix.
//!
//! Every response carries `error_code`/`error_msg`; handlers translate the
//! tip of a status chain into the wire code and render the chain into the
//! message. Clients see exactly one status per request.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod context;
pub mod handler;
pub mod ops;
pub mod server;
pub mod wire;

pub use client::Client;
pub use context::NameNodeContext;
pub use handler::HandlerContext;
pub use server::{dispatch, serve, serve_with_listener};
pub use wire::{Dent, InodeReply, ListDirResponse, PingPongResponse, Request, Response, Stat};
