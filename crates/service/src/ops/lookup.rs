//! Lookup: resolve one name within a parent directory
//!
//! Requires execute (search) permission on the parent. A directory entry
//! resolves to a full directory stat; a hard link resolves through the file
//! table to a file stat.

use rocketfs_core::acl::S_IXOTH;
use rocketfs_core::{check_permission, InodeId, Result, Status, User};
use rocketfs_metadata::{DentEntry, DentView, DirTable, FileTable};

use crate::context::NameNodeContext;
use crate::handler::HandlerContext;
use crate::ops::{log_failure, read_parent_dir};
use crate::wire::{InodeReply, LookupRequest, Stat};

/// Run the operation and translate failures onto the wire
pub async fn run(ctx: &NameNodeContext, request: &LookupRequest) -> InodeReply {
    match lookup(ctx, request).await {
        Ok(reply) => reply,
        Err(status) => {
            log_failure("lookup", &status);
            InodeReply::from_status(&status)
        }
    }
}

async fn lookup(ctx: &NameNodeContext, request: &LookupRequest) -> Result<InodeReply> {
    let mut hctx = HandlerContext::new(ctx)?;
    let (txn, arena) = hctx.parts();

    let parent_id = InodeId(request.parent_id);
    let parent = read_parent_dir(txn, arena, parent_id)?;
    let user = User {
        uid: request.uid,
        gid: request.gid,
    };
    check_permission(&parent.acl, &user, S_IXOTH)
        .map_err(|e| Status::permission(format!("search denied on inode {parent_id}")).caused_by(e))?;

    match DentView::read(txn, arena, parent_id, &request.name)? {
        DentEntry::Absent => Err(Status::not_found(format!(
            "no entry named {:?} under parent inode {parent_id}",
            request.name
        ))),
        DentEntry::Dir(dent) => {
            let dir = DirTable::read(txn, arena, dent.id)?.ok_or_else(|| {
                Status::system(format!(
                    "dir entry {:?} points at missing inode {}",
                    request.name, dent.id
                ))
            })?;
            Ok(InodeReply::ok(dir.id, Stat::of_dir(&dir)))
        }
        DentEntry::HardLink(link) => {
            let file = FileTable::read(txn, arena, link.id)?.ok_or_else(|| {
                Status::system(format!(
                    "hard link {:?} points at missing file inode {}",
                    request.name, link.id
                ))
            })?;
            Ok(InodeReply::ok(link.id, Stat::of_file(link.id, &file)))
        }
    }
}
