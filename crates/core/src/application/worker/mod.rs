// Worker - Queue poll loop

pub mod constants;
mod shutdown;

use constants::*;
pub use shutdown::{shutdown_channel, ShutdownSender, ShutdownToken};

use crate::application::lifecycle::{Disposition, LifecycleController};
use crate::domain::QueueMessage;
use crate::port::{QueueClient, QueueError};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info};

/// Poll loop timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    /// Long-poll wait passed to each receive call
    pub wait_time: Duration,
    /// Sleep when a receive returns nothing
    pub idle_sleep: Duration,
    /// Sleep after a queue error
    pub error_recovery_sleep: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            wait_time: DEFAULT_WAIT_TIME,
            idle_sleep: IDLE_SLEEP_DURATION,
            error_recovery_sleep: ERROR_RECOVERY_SLEEP_DURATION,
        }
    }
}

/// Single-consumer poll loop: one message at a time, in delivery order
pub struct PollLoop {
    queue: Arc<dyn QueueClient>,
    controller: Arc<LifecycleController>,
    settings: PollSettings,
}

impl PollLoop {
    pub fn new(
        queue: Arc<dyn QueueClient>,
        controller: Arc<LifecycleController>,
        settings: PollSettings,
    ) -> Self {
        Self {
            queue,
            controller,
            settings,
        }
    }

    /// Run until shutdown is requested
    ///
    /// Queue errors are logged and polling resumes after
    /// `error_recovery_sleep`; they never end the loop. A message already
    /// received is always handled to completion before shutdown is observed.
    pub async fn run(&self, mut shutdown: ShutdownToken) {
        let queue_url = self.controller.source_queue_url().to_string();
        info!(queue_url = %queue_url, "Poll loop started");
        loop {
            if shutdown.is_shutdown() {
                info!("Poll loop shutting down");
                break;
            }

            let received = tokio::select! {
                received = self.receive_next() => received,
                _ = shutdown.wait() => {
                    info!("Poll loop interrupted while waiting for messages");
                    break;
                }
            };

            let outcome = match received {
                Ok(Some(message)) => self.controller.handle(&message).await.map(Some),
                Ok(None) => Ok(None),
                Err(e) => Err(e),
            };

            match outcome {
                Ok(Some(disposition)) => {
                    debug!(disposition = %disposition, "Message handled");
                }
                Ok(None) => {
                    info!("No messages received, waiting...");
                    tokio::select! {
                        _ = sleep(self.settings.idle_sleep) => {},
                        _ = shutdown.wait() => {
                            info!("Poll loop interrupted during idle");
                            break;
                        }
                    }
                }
                Err(e) => {
                    error!(error = %e, "Queue error");
                    tokio::select! {
                        _ = sleep(self.settings.error_recovery_sleep) => {},
                        _ = shutdown.wait() => {
                            info!("Poll loop interrupted during error recovery");
                            break;
                        }
                    }
                }
            }
        }
        info!(queue_url = %queue_url, "Poll loop stopped");
    }

    /// Receive and handle at most one message
    ///
    /// Returns `None` when the queue had nothing within the wait window.
    pub async fn poll_once(&self) -> Result<Option<Disposition>, QueueError> {
        match self.receive_next().await? {
            Some(message) => self.controller.handle(&message).await.map(Some),
            None => Ok(None),
        }
    }

    async fn receive_next(&self) -> Result<Option<QueueMessage>, QueueError> {
        self.queue
            .receive_message(self.controller.source_queue_url(), self.settings.wait_time)
            .await
    }
}
