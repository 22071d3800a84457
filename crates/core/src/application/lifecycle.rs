// Message Lifecycle Controller
//
// Received -> process
//   ok                               -> delete (Acknowledged)
//   err, receive_count <  threshold  -> nothing (LeftForRedelivery)
//   err, receive_count >= threshold  -> send body to DLQ, delete (DeadLettered)
use crate::application::processor::WorkUnitProcessor;
use crate::application::retry::{RetryDecision, RetryPolicy};
use crate::domain::{ProcessedArtifact, QueueMessage, QueueUrl};
use crate::error::ProcessingError;
use crate::port::{QueueClient, QueueError};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{error, info, warn};

/// Fate of one delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Processed and deleted from the source queue
    Acknowledged,
    /// Failed; left for the queue to redeliver
    LeftForRedelivery,
    /// Failed too often; copied to the dead-letter queue and deleted
    DeadLettered,
}

impl std::fmt::Display for Disposition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Disposition::Acknowledged => write!(f, "ACKNOWLEDGED"),
            Disposition::LeftForRedelivery => write!(f, "LEFT_FOR_REDELIVERY"),
            Disposition::DeadLettered => write!(f, "DEAD_LETTERED"),
        }
    }
}

/// Decides what happens to each delivered message
pub struct LifecycleController {
    queue: Arc<dyn QueueClient>,
    processor: Arc<WorkUnitProcessor>,
    retry_policy: RetryPolicy,
    source_queue_url: QueueUrl,
    dead_letter_queue_name: String,
    // Resolved on first dead-lettering
    dead_letter_queue_url: OnceCell<QueueUrl>,
}

impl LifecycleController {
    /// Create a new controller
    ///
    /// # Arguments
    /// * `queue` - Queue client shared with the poll loop
    /// * `processor` - Work unit processor
    /// * `retry_policy` - Dead-letter threshold
    /// * `source_queue_url` - Resolved URL of the queue messages come from
    /// * `dead_letter_queue_name` - Name of the DLQ, resolved lazily
    pub fn new(
        queue: Arc<dyn QueueClient>,
        processor: Arc<WorkUnitProcessor>,
        retry_policy: RetryPolicy,
        source_queue_url: impl Into<String>,
        dead_letter_queue_name: impl Into<String>,
    ) -> Self {
        Self {
            queue,
            processor,
            retry_policy,
            source_queue_url: source_queue_url.into(),
            dead_letter_queue_name: dead_letter_queue_name.into(),
            dead_letter_queue_url: OnceCell::new(),
        }
    }

    pub fn source_queue_url(&self) -> &str {
        &self.source_queue_url
    }

    /// Handle one delivery
    ///
    /// Processing failures of any kind are converted into a disposition and
    /// never returned.
    ///
    /// # Errors
    /// - QueueError if a delete, send or DLQ resolution call fails
    pub async fn handle(&self, message: &QueueMessage) -> Result<Disposition, QueueError> {
        match self.run_isolated(message).await {
            Ok(artifact) => {
                self.queue
                    .delete_message(&self.source_queue_url, &message.receipt_handle)
                    .await?;
                info!(
                    message_id = %message.message_id,
                    image_id = %artifact.image_id,
                    receive_count = message.receive_count,
                    "Processed message"
                );
                Ok(Disposition::Acknowledged)
            }
            Err(e) => {
                error!(
                    message_id = %message.message_id,
                    receive_count = message.receive_count,
                    error_kind = e.kind(),
                    error = %e,
                    "Error processing message"
                );
                match self.retry_policy.should_retry(message) {
                    RetryDecision::LeaveForRedelivery => Ok(Disposition::LeftForRedelivery),
                    RetryDecision::DeadLetter => {
                        self.dead_letter(message).await?;
                        Ok(Disposition::DeadLettered)
                    }
                }
            }
        }
    }

    /// Run the processor on its own task so a panic becomes a failure
    async fn run_isolated(
        &self,
        message: &QueueMessage,
    ) -> Result<ProcessedArtifact, ProcessingError> {
        let processor = Arc::clone(&self.processor);
        let body = message.body.clone();

        let handle = tokio::task::spawn(async move { processor.process_body(&body).await });

        match handle.await {
            Ok(result) => result,
            Err(join_err) if join_err.is_panic() => {
                let panic = join_err.into_panic();
                let msg = if let Some(s) = panic.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "Unknown panic".to_string()
                };
                Err(ProcessingError::Panicked(msg))
            }
            Err(join_err) => Err(ProcessingError::Panicked(join_err.to_string())),
        }
    }

    /// Copy the body verbatim to the DLQ, then delete the original
    async fn dead_letter(&self, message: &QueueMessage) -> Result<(), QueueError> {
        let dead_letter_queue_url = self
            .dead_letter_queue_url
            .get_or_try_init(|| self.queue.resolve_queue_url(&self.dead_letter_queue_name))
            .await?;

        self.queue
            .send_message(dead_letter_queue_url, &message.body)
            .await?;
        self.queue
            .delete_message(&self.source_queue_url, &message.receipt_handle)
            .await?;

        warn!(
            message_id = %message.message_id,
            receive_count = message.receive_count,
            dead_letter_queue = %self.dead_letter_queue_name,
            "Message moved to dead letter queue and deleted from source queue"
        );
        Ok(())
    }
}
