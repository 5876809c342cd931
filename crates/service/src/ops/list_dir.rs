//! ListDir: page through a directory's entries
//!
//! Requires read permission on the directory. The first page (empty
//! `start_after`) synthesizes `.` and `..`; `..` points at the grandparent
//! when the directory is not the root and the grandparent still exists.
//! `has_more` compares against the effective limit, which is the
//! configured default whenever the request's limit is not positive.

use rocketfs_core::acl::{S_IFDIR, S_IFREG, S_IROTH};
use rocketfs_core::{check_permission, InodeId, Result, Status, User};
use rocketfs_metadata::{DentEntry, DentView, DirTable};

use crate::context::NameNodeContext;
use crate::handler::HandlerContext;
use crate::ops::{log_failure, resolve_dir, DirLookup};
use crate::wire::{Dent, ListDirRequest, ListDirResponse};

/// Run the operation and translate failures onto the wire
pub async fn run(ctx: &NameNodeContext, request: &ListDirRequest) -> ListDirResponse {
    match list_dir(ctx, request).await {
        Ok(response) => response,
        Err(status) => {
            log_failure("list_dir", &status);
            ListDirResponse::from_status(&status)
        }
    }
}

async fn list_dir(ctx: &NameNodeContext, request: &ListDirRequest) -> Result<ListDirResponse> {
    let mut hctx = HandlerContext::new(ctx)?;
    let (txn, arena) = hctx.parts();

    let parent_id = InodeId(request.id);
    // The listed inode is the target itself: a file here is
    // not-a-directory, not a parent-level failure.
    let parent = match resolve_dir(txn, arena, parent_id)? {
        DirLookup::Found(dir) => dir,
        DirLookup::IsFile => {
            return Err(Status::not_dir(format!(
                "inode {parent_id} is a regular file, not a directory"
            )))
        }
        DirLookup::Missing => {
            return Err(Status::parent_not_found(format!(
                "parent inode {parent_id} not found"
            )))
        }
    };
    let user = User {
        uid: request.uid,
        gid: request.gid,
    };
    check_permission(&parent.acl, &user, S_IROTH)
        .map_err(|e| Status::permission(format!("read denied on inode {parent_id}")).caused_by(e))?;

    let mut response = ListDirResponse::default();
    let is_first_page = request.start_after.is_empty();
    if is_first_page {
        response.self_dent = Some(Dent {
            id: parent_id.0,
            name: ".".to_string(),
            kind: S_IFDIR,
        });
        if parent_id == InodeId::ROOT {
            response.parent_dent = Some(Dent {
                id: parent_id.0,
                name: "..".to_string(),
                kind: S_IFDIR,
            });
        } else {
            // The grandparent may have vanished under a concurrent remove;
            // in that case the `..` entry is simply omitted.
            let grandparent_id = parent.parent_id;
            if DirTable::read(txn, arena, grandparent_id)?.is_some() {
                response.parent_dent = Some(Dent {
                    id: grandparent_id.0,
                    name: "..".to_string(),
                    kind: S_IFDIR,
                });
            }
        }
    }

    let effective_limit = if request.limit > 0 {
        request.limit as usize
    } else {
        ctx.config().list_dir_default_limit
    };
    let entries = DentView::list(txn, arena, parent_id, &request.start_after, effective_limit)?;
    response.has_more = entries.len() == effective_limit;
    response.ents = entries
        .into_iter()
        .filter_map(|entry| match entry {
            DentEntry::Dir(dent) => Some(Dent {
                id: dent.id.0,
                name: dent.name,
                kind: S_IFDIR,
            }),
            DentEntry::HardLink(link) => Some(Dent {
                id: link.id.0,
                name: link.name,
                kind: S_IFREG,
            }),
            DentEntry::Absent => None,
        })
        .collect();
    Ok(response)
}
