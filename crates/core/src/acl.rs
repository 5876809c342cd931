//! Access control and the POSIX permission check
//!
//! POSIX permissions consist of two parts:
//!
//! 1. Classes. An inode has three classes: user, group, and others. When a
//!    request carries a `uid` and `gid`:
//!    - if `uid` matches the inode's `uid`, user-class permissions apply;
//!    - if `gid` matches the inode's `gid`, group-class permissions apply;
//!    - otherwise others-class permissions apply.
//! 2. Permissions. Each class has read, write, and execute bits. For
//!    directories these are commonly misread: read lists entry names only;
//!    write modifies entries (create, delete, rename) and is meaningless
//!    without execute; execute is the "search" permission granting access to
//!    an entry's metadata when its name is already known.
//!
//! Callers express the requested bits in the others-class positions
//! (`S_IROTH`/`S_IWOTH`/`S_IXOTH`); [`check_permission`] shifts them into the
//! class selected by the requesting user.

use serde::{Deserialize, Serialize};

use crate::status::Status;

/// File-type mask of the mode word
pub const S_IFMT: u32 = 0o170000;
/// Directory file type
pub const S_IFDIR: u32 = 0o040000;
/// Regular-file file type
pub const S_IFREG: u32 = 0o100000;

/// Set-group-ID bit
pub const S_ISGID: u32 = 0o2000;
/// All permission bits including setuid/setgid/sticky
pub const ALLPERMS: u32 = 0o7777;

/// Others-class read bit
pub const S_IROTH: u32 = 0o4;
/// Others-class write bit
pub const S_IWOTH: u32 = 0o2;
/// Others-class execute (search) bit
pub const S_IXOTH: u32 = 0o1;

/// Ownership and mode bits of an inode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acl {
    /// Owning user
    pub uid: u32,
    /// Owning group
    pub gid: u32,
    /// Mode bits (within [`ALLPERMS`])
    pub perm: u32,
}

/// The requesting identity carried by each RPC
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct User {
    /// Requesting user
    pub uid: u32,
    /// Requesting group
    pub gid: u32,
}

/// Check whether `user` holds the requested others-class bits against `acl`
///
/// Root (`uid == 0`) is permitted unconditionally. Otherwise the requested
/// bits shift into the user class (×64) or group class (×8) as selected by
/// the ACL's ownership, and the check passes iff every requested bit is set.
pub fn check_permission(acl: &Acl, user: &User, perm: u32) -> Result<(), Status> {
    let needed = if user.uid == 0 {
        0
    } else if user.uid == acl.uid {
        perm << 6
    } else if user.gid == acl.gid {
        perm << 3
    } else {
        perm
    };
    if acl.perm & needed != needed {
        return Err(Status::permission(format!(
            "user {{uid: {}, gid: {}}} lacks {:o} on acl {{uid: {}, gid: {}, perm: {:04o}}}",
            user.uid, user.gid, perm, acl.uid, acl.gid, acl.perm
        )));
    }
    Ok(())
}
