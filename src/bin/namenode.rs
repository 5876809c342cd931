//! Namenode server entrypoint
//!
//! Reads configuration from the environment, opens the metadata store,
//! and serves the client-namenode RPC surface. Exits nonzero when
//! bootstrap fails (store open, port bind).

use std::process::ExitCode;
use std::sync::Arc;

use tracing::error;
use tracing_subscriber::EnvFilter;

use rocketfs_core::Config;
use rocketfs_service::{serve, NameNodeContext};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = Config::from_env();
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %e, "failed to start the async runtime");
            return ExitCode::FAILURE;
        }
    };

    let ctx = match NameNodeContext::start(config) {
        Ok(ctx) => ctx,
        Err(status) => {
            error!(status = %status, "namenode bootstrap failed");
            return ExitCode::FAILURE;
        }
    };

    let result = runtime.block_on(serve(Arc::clone(&ctx)));
    ctx.stop();
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(status) => {
            error!(status = %status, "namenode service failed");
            ExitCode::FAILURE
        }
    }
}
