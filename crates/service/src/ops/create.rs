//! Create: make a regular file
//!
//! Same gate as mkdirs (parent exists, write permission, name free), plus
//! the mode's type field must be empty or `S_IFREG`. Writes the file row
//! and its first hard link in the same transaction, so the file and its
//! directory entry appear atomically.

use rocketfs_core::acl::{ALLPERMS, S_IFMT, S_IFREG, S_ISGID, S_IWOTH};
use rocketfs_core::{check_permission, validate_name, Acl, InodeId, Result, Status, User};
use rocketfs_metadata::{DentView, File, FileTable, HardLink, HardLinkTable};

use crate::context::NameNodeContext;
use crate::handler::HandlerContext;
use crate::ops::{log_failure, read_parent_dir};
use crate::wire::{CreateRequest, InodeReply, Stat};

/// Block size assigned to new files
const DEFAULT_BLOCK_SIZE: u32 = 4096;

/// Run the operation and translate failures onto the wire
pub async fn run(ctx: &NameNodeContext, request: &CreateRequest) -> InodeReply {
    match create(ctx, request).await {
        Ok(reply) => reply,
        Err(status) => {
            log_failure("create", &status);
            InodeReply::from_status(&status)
        }
    }
}

async fn create(ctx: &NameNodeContext, request: &CreateRequest) -> Result<InodeReply> {
    validate_name(&request.name)
        .map_err(|e| Status::invalid_argument(format!("bad file name: {e}")))?;
    let type_bits = request.mode & S_IFMT;
    if type_bits != 0 && type_bits != S_IFREG {
        return Err(Status::invalid_argument(format!(
            "create only makes regular files, got type bits {type_bits:o}"
        )));
    }

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
        // Files inherit the group from a setgid parent but not the bit.
        acl.gid = parent.acl.gid;
    }
    let now_ns = ctx.clock().now_ns();
    let file = File {
        id,
        acl,
        nlink: 1,
        len: 0,
        block_size: DEFAULT_BLOCK_SIZE,
        blocks: Vec::new(),
        ctime_ns: now_ns,
        mtime_ns: now_ns,
        atime_ns: now_ns,
    };
    let hard_link = HardLink {
        parent_id,
        name: request.name.clone(),
        id,
    };
    FileTable::write(txn, None, Some(&file))?;
    HardLinkTable::write(txn, None, Some(&hard_link))?;
    hctx.commit().await?;
    Ok(InodeReply::ok(id, Stat::of_file(id, &file)))
}
