//! Mkdirs: create a directory
//!
//! Requires write permission on the parent. The probe of `(parent, name)`
//! lands in the transaction's read set, so two concurrent creates of the
//! same name race at commit and exactly one wins; the loser surfaces the
//! conflict code and may retry.

use rocketfs_core::acl::{ALLPERMS, S_ISGID, S_IWOTH};
use rocketfs_core::{check_permission, validate_name, Acl, InodeId, Result, Status, User};
use rocketfs_metadata::{DentView, Dir, DirTable};

use crate::context::NameNodeContext;
use crate::handler::HandlerContext;
use crate::ops::{log_failure, read_parent_dir};
use crate::wire::{InodeReply, MkdirsRequest, Stat};

/// Run the operation and translate failures onto the wire
pub async fn run(ctx: &NameNodeContext, request: &MkdirsRequest) -> InodeReply {
    match mkdirs(ctx, request).await {
        Ok(reply) => reply,
        Err(status) => {
            log_failure("mkdirs", &status);
            InodeReply::from_status(&status)
        }
    }
}

async fn mkdirs(ctx: &NameNodeContext, request: &MkdirsRequest) -> Result<InodeReply> {
    validate_name(&request.name)
        .map_err(|e| Status::invalid_argument(format!("bad directory name: {e}")))?;

    let mut hctx = HandlerContext::new(ctx)?;
    let (txn, arena) = hctx.parts();

    let parent_id = InodeId(request.parent_id);
    let parent = read_parent_dir(txn, arena, parent_id)?;
    let user = User {
        uid: request.uid,
        gid: request.gid,
    };
    check_permission(&parent.acl, &user, S_IWOTH)
        .map_err(|e| Status::permission(format!("write denied on inode {parent_id}")).caused_by(e))?;

    if !DentView::read(txn, arena, parent_id, &request.name)?.is_absent() {
        return Err(Status::already_exists(format!(
            "entry {:?} already exists under parent inode {parent_id}",
            request.name
        )));
    }

    let id = ctx.id_gen().next();
    let mut acl = Acl {
        uid: request.uid,
        gid: request.gid,
        perm: request.mode & ALLPERMS,
    };
    if parent.acl.perm & S_ISGID != 0 {
        // Setgid directories propagate their group and the bit itself.
        acl.gid = parent.acl.gid;
        acl.perm |= S_ISGID;
    }
    let now_ns = ctx.clock().now_ns();
    let dir = Dir {
        parent_id,
        name: request.name.clone(),
        id,
        acl,
        ctime_ns: now_ns,
        mtime_ns: now_ns,
        atime_ns: now_ns,
    };
    DirTable::write(txn, None, Some(&dir))?;
    hctx.commit().await?;
    Ok(InodeReply::ok(dir.id, Stat::of_dir(&dir)))
}
