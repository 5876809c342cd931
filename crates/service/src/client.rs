//! Minimal RPC client
//!
//! One connection, one in-flight request at a time. Used by the FUSE
//! adapter's proxy and by integration tests.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use rocketfs_core::{Result, Status};

use crate::server::MAX_FRAME_BYTES;
use crate::wire::{self, Request, Response};

/// A connected client
pub struct Client {
    stream: TcpStream,
}

impl Client {
    /// Connect to a namenode
    pub async fn connect(address: &str) -> Result<Self> {
        let stream = TcpStream::connect(address)
            .await
            .map_err(|e| Status::system(format!("failed to connect to {address}: {e}")))?;
        Ok(Client { stream })
    }

    /// Send one request and wait for its response
    pub async fn call(&mut self, request: &Request) -> Result<Response> {
        let bytes = wire::encode(request)?;
        let len = u32::try_from(bytes.len())
            .map_err(|_| Status::system("request frame exceeds u32 length"))?;
        self.stream
            .write_u32(len)
            .await
            .map_err(|e| Status::system(format!("failed to send frame length: {e}")))?;
        self.stream
            .write_all(&bytes)
            .await
            .map_err(|e| Status::system(format!("failed to send frame body: {e}")))?;

        let len = self
            .stream
            .read_u32()
            .await
            .map_err(|e| Status::system(format!("failed to read response length: {e}")))?;
        if len > MAX_FRAME_BYTES {
            return Err(Status::system(format!(
                "response frame of {len} bytes exceeds the {MAX_FRAME_BYTES}-byte bound"
            )));
        }
        let mut frame = vec![0u8; len as usize];
        self.stream
            .read_exact(&mut frame)
            .await
            .map_err(|e| Status::system(format!("failed to read response body: {e}")))?;
        wire::decode(&frame)
    }
}
