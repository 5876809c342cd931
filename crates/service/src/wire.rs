//! Wire messages of the unary RPC surface
//!
//! Messages are bincode-encoded; the transport frames each one with a
//! big-endian u32 length prefix. Success means `error_code == 0`; any
//! failure carries the wire code of the status tip plus the rendered chain
//! in `error_msg`.

use serde::{Deserialize, Serialize};

use rocketfs_core::acl::{S_IFDIR, S_IFREG};
use rocketfs_core::{InodeId, Status};
use rocketfs_metadata::{Dir, File};

/// Inode attributes as reported to clients
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stat {
    /// Inode ID
    pub id: u64,
    /// File type plus permission bits
    pub mode: u32,
    /// Hard-link count
    pub nlink: u32,
    /// Owning user
    pub uid: u32,
    /// Owning group
    pub gid: u32,
    /// Size in bytes (zero for directories)
    pub size: u64,
    /// Access time, nanoseconds since the Unix epoch
    pub atime_ns: i64,
    /// Modification time
    pub mtime_ns: i64,
    /// Status-change time
    pub ctime_ns: i64,
    /// Block size in bytes (zero for directories)
    pub block_size: u32,
    /// Number of data blocks
    pub block_num: u64,
}

impl Stat {
    /// Stat of a directory
    pub fn of_dir(dir: &Dir) -> Self {
        Stat {
            id: dir.id.0,
            mode: S_IFDIR | dir.acl.perm,
            nlink: 1,
            uid: dir.acl.uid,
            gid: dir.acl.gid,
            size: 0,
            atime_ns: dir.atime_ns,
            mtime_ns: dir.mtime_ns,
            ctime_ns: dir.ctime_ns,
            block_size: 0,
            block_num: 0,
        }
    }

    /// Stat of a regular file, reported under `id` (the hard link's target)
    pub fn of_file(id: InodeId, file: &File) -> Self {
        Stat {
            id: id.0,
            mode: S_IFREG | file.acl.perm,
            nlink: file.nlink,
            uid: file.acl.uid,
            gid: file.acl.gid,
            size: file.len,
            atime_ns: file.atime_ns,
            mtime_ns: file.mtime_ns,
            ctime_ns: file.ctime_ns,
            block_size: file.block_size,
            block_num: file.blocks.len() as u64,
        }
    }
}

/// One directory entry in a listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dent {
    /// Inode ID the entry resolves to
    pub id: u64,
    /// Entry name
    pub name: String,
    /// POSIX file-type field: `S_IFDIR` or `S_IFREG`
    pub kind: u32,
}

/// Liveness probe
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PingPongRequest {}

/// Liveness reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PingPongResponse {
    /// Always `"pong"`
    pub pong: String,
}

/// Fetch a directory's attributes by inode ID
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetInodeRequest {
    /// Inode to stat
    pub id: u64,
}

/// Resolve one name within a parent directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupRequest {
    /// Parent directory
    pub parent_id: u64,
    /// Entry name
    pub name: String,
    /// Requesting user
    pub uid: u32,
    /// Requesting group
    pub gid: u32,
}

/// Page through a directory's entries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListDirRequest {
    /// Directory to list
    pub id: u64,
    /// Resume strictly after this name; empty for the first page
    pub start_after: String,
    /// Page size; values ≤ 0 use the configured default
    pub limit: i32,
    /// Requesting user
    pub uid: u32,
    /// Requesting group
    pub gid: u32,
}

/// Create a directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MkdirsRequest {
    /// Parent directory
    pub parent_id: u64,
    /// New directory's name
    pub name: String,
    /// Requested mode bits
    pub mode: u32,
    /// Requesting user
    pub uid: u32,
    /// Requesting group
    pub gid: u32,
}

/// Create a regular file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRequest {
    /// Parent directory
    pub parent_id: u64,
    /// New file's name
    pub name: String,
    /// Requested mode bits; the type field must be absent or `S_IFREG`
    pub mode: u32,
    /// Requesting user
    pub uid: u32,
    /// Requesting group
    pub gid: u32,
}

/// Reply shared by the inode-producing methods
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InodeReply {
    /// Inode ID on success
    pub id: u64,
    /// Attributes on success
    pub stat: Option<Stat>,
    /// Zero on success
    pub error_code: i16,
    /// Rendered status chain on failure
    pub error_msg: String,
}

impl InodeReply {
    /// Successful reply
    pub fn ok(id: InodeId, stat: Stat) -> Self {
        InodeReply {
            id: id.0,
            stat: Some(stat),
            error_code: 0,
            error_msg: String::new(),
        }
    }

    /// Failed reply carrying `status`
    pub fn from_status(status: &Status) -> Self {
        InodeReply {
            id: InodeId::INVALID.0,
            stat: None,
            error_code: status.code(),
            error_msg: status.render(),
        }
    }
}

/// Reply to [`ListDirRequest`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListDirResponse {
    /// `.` entry, present on the first page
    pub self_dent: Option<Dent>,
    /// `..` entry, present on the first page when the grandparent exists
    pub parent_dent: Option<Dent>,
    /// Entries in name order
    pub ents: Vec<Dent>,
    /// Whether another page may exist
    pub has_more: bool,
    /// Zero on success
    pub error_code: i16,
    /// Rendered status chain on failure
    pub error_msg: String,
}

impl ListDirResponse {
    /// Failed reply carrying `status`
    pub fn from_status(status: &Status) -> Self {
        ListDirResponse {
            error_code: status.code(),
            error_msg: status.render(),
            ..ListDirResponse::default()
        }
    }
}

/// A framed request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Request {
    /// Liveness probe
    PingPong(PingPongRequest),
    /// Directory stat by ID
    GetInode(GetInodeRequest),
    /// Name resolution within a parent
    Lookup(LookupRequest),
    /// Directory listing page
    ListDir(ListDirRequest),
    /// Directory creation
    Mkdirs(MkdirsRequest),
    /// Regular-file creation
    Create(CreateRequest),
}

/// A framed response, one per request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Response {
    /// Reply to [`Request::PingPong`]
    PingPong(PingPongResponse),
    /// Reply to [`Request::GetInode`]
    GetInode(InodeReply),
    /// Reply to [`Request::Lookup`]
    Lookup(InodeReply),
    /// Reply to [`Request::ListDir`]
    ListDir(ListDirResponse),
    /// Reply to [`Request::Mkdirs`]
    Mkdirs(InodeReply),
    /// Reply to [`Request::Create`]
    Create(InodeReply),
}

/// Encode a wire message
pub fn encode<T: Serialize>(message: &T) -> Result<Vec<u8>, Status> {
    bincode::serialize(message)
        .map_err(|e| Status::system(format!("failed to encode wire message: {e}")))
}

/// Decode a wire message
pub fn decode<'a, T: Deserialize<'a>>(bytes: &'a [u8]) -> Result<T, Status> {
    bincode::deserialize(bytes)
        .map_err(|e| Status::system(format!("failed to decode wire message: {e}")))
}
