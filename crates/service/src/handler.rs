//! Per-request handler context
//!
//! Construction allocates the request arena and starts a transaction;
//! dropping the context without committing discards all staged state, so a
//! cancelled or failed request can never leak partial writes. Commit
//! consumes the context.

use rocketfs_concurrency::Transaction;
use rocketfs_core::{RequestArena, Result};

use crate::context::NameNodeContext;

/// Arena + transaction scoped to one request
pub struct HandlerContext<'ctx> {
    ctx: &'ctx NameNodeContext,
    arena: RequestArena,
    txn: Transaction,
}

impl<'ctx> HandlerContext<'ctx> {
    /// Start a request: fresh arena, fresh transaction
    pub fn new(ctx: &'ctx NameNodeContext) -> Result<Self> {
        let arena = RequestArena::with_prealloc(ctx.config().request_arena_prealloc_bytes);
        let txn = ctx.store().begin()?;
        Ok(HandlerContext { ctx, arena, txn })
    }

    /// Split borrows for table calls: the transaction and the arena
    pub fn parts(&mut self) -> (&mut Transaction, &RequestArena) {
        (&mut self.txn, &self.arena)
    }

    /// Commit the request's transaction
    pub async fn commit(self) -> Result<u64> {
        self.ctx.store().commit(self.txn).await
    }
}
