//! Thumbnail Worker - Main Entry Point
//! Long-polls an SQS queue and writes originals and thumbnails to disk

mod config;
mod logging;
mod telemetry;

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use config::{LoggingConfig, WorkerConfig};
use thumbnailer_core::application::{
    shutdown_channel, LifecycleController, PollLoop, RetryPolicy, WorkUnitProcessor,
};
use thumbnailer_core::port::{ArtifactStore, QueueClient};
use thumbnailer_infra_sqs::{create_client, SqsQueueClient};
use thumbnailer_infra_system::{FsArtifactStore, HttpImageFetcher, ImageThumbnailGenerator};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize logging
    let logging = logging::init_logging(&LoggingConfig::from_env())?;

    info!("Thumbnail worker v{} starting...", VERSION);
    if logging.telemetry_enabled {
        info!("OpenTelemetry initialized");
    }

    // 2. Load configuration
    let config = WorkerConfig::from_env().context("Invalid configuration")?;
    info!(
        queue = %config.queue_name,
        dead_letter_queue = %config.dead_letter_queue_name,
        max_receive_count = config.max_receive_count,
        "Configuration loaded"
    );

    // 3. Prepare artifact directories
    let store = Arc::new(FsArtifactStore::new(
        config.originals_dir.clone(),
        config.resized_dir.clone(),
    ));
    store
        .ensure_layout()
        .await
        .context("Failed to create artifact directories")?;

    // 4. Connect to SQS and resolve the source queue
    let client = create_client(&config.sqs).await;
    let queue: Arc<dyn QueueClient> = Arc::new(SqsQueueClient::new(client));
    let source_queue_url = queue
        .resolve_queue_url(&config.queue_name)
        .await
        .with_context(|| format!("Failed to resolve queue {}", config.queue_name))?;
    info!(queue_url = %source_queue_url, "Source queue resolved");

    // 5. Setup dependencies (DI wiring)
    let fetcher = Arc::new(
        HttpImageFetcher::new(config.fetch_timeout).context("Failed to build HTTP client")?,
    );
    let generator = Arc::new(ImageThumbnailGenerator::new());
    let processor = Arc::new(WorkUnitProcessor::new(
        fetcher,
        generator,
        store,
        config.bounds,
    ));
    let controller = Arc::new(LifecycleController::new(
        queue.clone(),
        processor,
        RetryPolicy::new(config.max_receive_count),
        source_queue_url,
        config.dead_letter_queue_name.clone(),
    ));
    let poll_loop = PollLoop::new(queue, controller, config.poll);

    // 6. Start the poll loop
    let (shutdown_tx, shutdown_rx) = shutdown_channel();
    let mut worker_handle = tokio::spawn(async move { poll_loop.run(shutdown_rx).await });

    info!("✅ Worker ready. Waiting for messages...");

    // 7. Wait for shutdown signal
    tokio::select! {
        signal = wait_for_signal() => {
            signal?;
            info!("Shutdown signal received. Exiting gracefully...");
        }
        _ = &mut worker_handle => {
            warn!("Poll loop exited before a shutdown signal");
            return Ok(());
        }
    }

    // 8. Graceful shutdown: an in-flight message is finished first
    shutdown_tx.shutdown();
    if tokio::time::timeout(SHUTDOWN_GRACE, worker_handle)
        .await
        .is_err()
    {
        warn!(
            grace_secs = SHUTDOWN_GRACE.as_secs(),
            "Poll loop did not stop in time"
        );
    }

    info!("Shutdown complete.");

    Ok(())
}

#[cfg(unix)]
async fn wait_for_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result,
        _ = terminate.recv() => Ok(()),
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}
