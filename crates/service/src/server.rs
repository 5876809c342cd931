//! TCP server loop and request dispatch
//!
//! One task per connection; each frame is a big-endian u32 length followed
//! by a bincode message, one response per request. A malformed frame closes
//! the connection, since the transport has no way to know which method a
//! garbled request meant, so there is nothing useful to reply.

use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

use rocketfs_core::{Result, Status};

use crate::context::NameNodeContext;
use crate::ops;
use crate::wire::{self, Request, Response};

/// Upper bound on a single frame; anything larger is a protocol error
pub const MAX_FRAME_BYTES: u32 = 16 * 1024 * 1024;

/// Route one request to its operation
pub async fn dispatch(ctx: &NameNodeContext, request: Request) -> Response {
    match request {
        Request::PingPong(_) => Response::PingPong(ops::ping_pong::run()),
        Request::GetInode(req) => Response::GetInode(ops::get_inode::run(ctx, &req).await),
        Request::Lookup(req) => Response::Lookup(ops::lookup::run(ctx, &req).await),
        Request::ListDir(req) => Response::ListDir(ops::list_dir::run(ctx, &req).await),
        Request::Mkdirs(req) => Response::Mkdirs(ops::mkdirs::run(ctx, &req).await),
        Request::Create(req) => Response::Create(ops::create::run(ctx, &req).await),
    }
}

/// Bind the configured listen address and serve until the listener fails
///
/// A bind failure propagates out so the binary can exit nonzero.
pub async fn serve(ctx: Arc<NameNodeContext>) -> Result<()> {
    let address = ctx.config().listen_address.clone();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|e| Status::system(format!("failed to bind {address}: {e}")))?;
    serve_with_listener(ctx, listener).await
}

/// Serve on an already-bound listener (tests bind port 0 through this)
pub async fn serve_with_listener(ctx: Arc<NameNodeContext>, listener: TcpListener) -> Result<()> {
    let address = listener
        .local_addr()
        .map_err(|e| Status::system(format!("listener has no local address: {e}")))?;
    info!(%address, "client-namenode service listening");

    loop {
        let (stream, peer) = listener
            .accept()
            .await
            .map_err(|e| Status::system(format!("accept failed on {address}: {e}")))?;
        debug!(%peer, "client connected");
        let ctx = Arc::clone(&ctx);
        tokio::spawn(async move {
            if let Err(status) = handle_connection(&ctx, stream).await {
                warn!(%peer, status = %status, "connection closed on error");
            }
            debug!(%peer, "client disconnected");
        });
    }
}

async fn handle_connection(ctx: &NameNodeContext, mut stream: TcpStream) -> Result<()> {
    loop {
        let frame = match read_frame(&mut stream).await? {
            Some(frame) => frame,
            None => return Ok(()), // clean EOF between frames
        };
        let request: Request = wire::decode(&frame)
            .map_err(|e| Status::invalid_argument("unparseable request frame").caused_by(e))?;
        let response = dispatch(ctx, request).await;
        write_frame(&mut stream, &wire::encode(&response)?).await?;
    }
}

/// Read one length-prefixed frame; `None` on EOF at a frame boundary
pub async fn read_frame(stream: &mut TcpStream) -> Result<Option<Vec<u8>>> {
    let len = match stream.read_u32().await {
        Ok(len) => len,
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(Status::system(format!("failed to read frame length: {e}"))),
    };
    if len > MAX_FRAME_BYTES {
        return Err(Status::invalid_argument(format!(
            "frame of {len} bytes exceeds the {MAX_FRAME_BYTES}-byte bound"
        )));
    }
    let mut frame = vec![0u8; len as usize];
    stream
        .read_exact(&mut frame)
        .await
        .map_err(|e| Status::system(format!("failed to read frame body: {e}")))?;
    Ok(Some(frame))
}

/// Write one length-prefixed frame
pub async fn write_frame(stream: &mut TcpStream, bytes: &[u8]) -> Result<()> {
    let len = u32::try_from(bytes.len())
        .map_err(|_| Status::system("response frame exceeds u32 length"))?;
    stream
        .write_u32(len)
        .await
        .map_err(|e| Status::system(format!("failed to write frame length: {e}")))?;
    stream
        .write_all(bytes)
        .await
        .map_err(|e| Status::system(format!("failed to write frame body: {e}")))?;
    Ok(())
}
