//! GetInode: directory attributes by inode ID
//!
//! An ID that resolves to a regular file is not-a-directory rather than
//! not-found; only the directory surface of this method is persisted.

use rocketfs_core::{InodeId, Result, Status};

use crate::context::NameNodeContext;
use crate::handler::HandlerContext;
use crate::ops::{log_failure, resolve_dir, DirLookup};
use crate::wire::{GetInodeRequest, InodeReply, Stat};

/// Run the operation and translate failures onto the wire
pub async fn run(ctx: &NameNodeContext, request: &GetInodeRequest) -> InodeReply {
    match get_inode(ctx, request).await {
        Ok(reply) => reply,
        Err(status) => {
            log_failure("get_inode", &status);
            InodeReply::from_status(&status)
        }
    }
}

async fn get_inode(ctx: &NameNodeContext, request: &GetInodeRequest) -> Result<InodeReply> {
    let mut hctx = HandlerContext::new(ctx)?;
    let (txn, arena) = hctx.parts();

    let id = InodeId(request.id);
    match resolve_dir(txn, arena, id)? {
        DirLookup::Found(dir) => Ok(InodeReply::ok(dir.id, Stat::of_dir(&dir))),
        DirLookup::IsFile => Err(Status::not_dir(format!(
            "inode {id} is a regular file, not a directory"
        ))),
        DirLookup::Missing => Err(Status::not_found(format!("inode {id} not found"))),
    }
}
