//! Liveness probe; no transaction, no permission check

use crate::wire::PingPongResponse;

/// Answer a ping
pub fn run() -> PingPongResponse {
    PingPongResponse {
        pong: "pong".to_string(),
    }
}
