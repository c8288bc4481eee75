//! # Process Query Runtime
//!
//! Runs the query projection and audit log against the engine event bus.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration from `PQ_*` environment variables
//! 2. Initialize tracing
//! 3. Build the bus, stores and subsystems
//! 4. Start the consumers and replay `PQ_REPLAY_FILE` (if set)
//! 5. Run until Ctrl+C, then shut down gracefully

use anyhow::{anyhow, Context, Result};
use query_runtime::{QueryRuntime, RuntimeConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Install the global `fmt` subscriber filtered by `directive`.
fn init_tracing(directive: &str) -> Result<()> {
    let filter = EnvFilter::try_new(directive)
        .with_context(|| format!("Invalid log filter {directive:?}"))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .try_init()
        .map_err(|e| anyhow!("{e}"))
        .context("Failed to install tracing subscriber")
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = RuntimeConfig::from_env().context("Failed to load configuration")?;

    init_tracing(&config.log_level)?;

    let mut runtime = QueryRuntime::new(config).context("Failed to build runtime")?;
    let replayed = runtime.start().await.context("Failed to start runtime")?;
    if replayed > 0 {
        info!("Replayed {} batches at startup", replayed);
    }

    info!("Query runtime is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl+C")?;

    runtime.shutdown().await;

    Ok(())
}
