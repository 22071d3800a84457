// Queue Client Port
// Abstraction over the message queue (SQS in production, in-memory in tests)

use crate::domain::{QueueMessage, QueueUrl};
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Queue call errors
///
/// These are never turned into a retry/dead-letter decision; they propagate
/// to the poll loop.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    #[error("Queue not found: {0}")]
    QueueNotFound(String),

    #[error("Failed to resolve queue '{name}': {reason}")]
    Resolve { name: String, reason: String },

    #[error("Receive failed: {0}")]
    Receive(String),

    #[error("Delete failed: {0}")]
    Delete(String),

    #[error("Send failed: {0}")]
    Send(String),

    #[error("Malformed message from queue: {0}")]
    MalformedMessage(String),
}

/// Queue Client trait
///
/// Implementations:
/// - SqsQueueClient: AWS SQS
/// - mocks::InMemoryQueueClient: call-recording fake for tests
#[async_trait]
pub trait QueueClient: Send + Sync {
    /// Resolve a logical queue name to its addressable URL
    ///
    /// # Errors
    /// - QueueError::QueueNotFound if no queue has that name
    /// - QueueError::Resolve for any other failure
    async fn resolve_queue_url(&self, queue_name: &str) -> Result<QueueUrl, QueueError>;

    /// Receive at most one message, waiting up to `wait` for one to arrive
    ///
    /// The returned message carries its approximate receive count.
    async fn receive_message(
        &self,
        queue_url: &str,
        wait: Duration,
    ) -> Result<Option<QueueMessage>, QueueError>;

    /// Delete one delivery identified by its receipt handle
    async fn delete_message(&self, queue_url: &str, receipt_handle: &str)
        -> Result<(), QueueError>;

    /// Publish a new message with the given body
    async fn send_message(&self, queue_url: &str, body: &str) -> Result<(), QueueError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;

    /// A queue call as observed by the fake
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum QueueCall {
        Resolve { queue_name: String },
        Receive { queue_url: String },
        Delete { queue_url: String, receipt_handle: String },
        Send { queue_url: String, body: String },
    }

    /// Which calls should fail
    #[derive(Debug, Clone, Default)]
    pub struct FailureInjection {
        pub receive: Option<String>,
        pub delete: Option<String>,
        pub send: Option<String>,
    }

    #[derive(Default)]
    struct State {
        queues: HashMap<QueueUrl, VecDeque<QueueMessage>>,
        // received but not yet deleted, keyed by receipt handle
        in_flight: HashMap<String, (QueueUrl, QueueMessage)>,
        calls: Vec<QueueCall>,
        failures: FailureInjection,
    }

    /// In-memory queue fake
    ///
    /// Queue URLs are `memory://{name}`. Received messages stay in flight
    /// until deleted; `redeliver_in_flight` plays the role of the visibility
    /// timeout by putting them back with an incremented receive count.
    #[derive(Default)]
    pub struct InMemoryQueueClient {
        state: Mutex<State>,
    }

    impl InMemoryQueueClient {
        pub fn new() -> Self {
            Self::default()
        }

        /// Create a fake that knows the given queue names
        pub fn with_queues(names: &[&str]) -> Self {
            let client = Self::new();
            for name in names {
                client.create_queue(name);
            }
            client
        }

        pub fn queue_url(name: &str) -> QueueUrl {
            format!("memory://{}", name)
        }

        pub fn create_queue(&self, name: &str) -> QueueUrl {
            let url = Self::queue_url(name);
            self.state
                .lock()
                .unwrap()
                .queues
                .entry(url.clone())
                .or_default();
            url
        }

        /// Push an already-built delivery onto a queue
        pub fn push(&self, queue_name: &str, message: QueueMessage) {
            let url = self.create_queue(queue_name);
            self.state
                .lock()
                .unwrap()
                .queues
                .entry(url)
                .or_default()
                .push_back(message);
        }

        /// Push a body with a fresh id and receipt handle
        pub fn push_body(&self, queue_name: &str, body: &str, receive_count: u32) -> QueueMessage {
            let message = QueueMessage::new(
                uuid::Uuid::new_v4().to_string(),
                body,
                uuid::Uuid::new_v4().to_string(),
                receive_count,
            );
            self.push(queue_name, message.clone());
            message
        }

        /// Messages currently waiting on a queue (not in flight)
        pub fn messages(&self, queue_name: &str) -> Vec<QueueMessage> {
            let url = Self::queue_url(queue_name);
            self.state
                .lock()
                .unwrap()
                .queues
                .get(&url)
                .map(|q| q.iter().cloned().collect())
                .unwrap_or_default()
        }

        pub fn in_flight_count(&self) -> usize {
            self.state.lock().unwrap().in_flight.len()
        }

        /// Return every undeleted delivery to its queue with receive_count + 1
        pub fn redeliver_in_flight(&self) -> usize {
            let mut state = self.state.lock().unwrap();
            let in_flight: Vec<_> = state.in_flight.drain().map(|(_, v)| v).collect();
            let count = in_flight.len();
            for (url, mut message) in in_flight {
                message.receive_count += 1;
                message.receipt_handle = uuid::Uuid::new_v4().to_string();
                state.queues.entry(url).or_default().push_back(message);
            }
            count
        }

        pub fn set_failures(&self, failures: FailureInjection) {
            self.state.lock().unwrap().failures = failures;
        }

        pub fn calls(&self) -> Vec<QueueCall> {
            self.state.lock().unwrap().calls.clone()
        }

        pub fn delete_calls(&self) -> Vec<QueueCall> {
            self.calls()
                .into_iter()
                .filter(|c| matches!(c, QueueCall::Delete { .. }))
                .collect()
        }

        pub fn send_calls(&self) -> Vec<QueueCall> {
            self.calls()
                .into_iter()
                .filter(|c| matches!(c, QueueCall::Send { .. }))
                .collect()
        }

        pub fn resolve_calls(&self) -> Vec<QueueCall> {
            self.calls()
                .into_iter()
                .filter(|c| matches!(c, QueueCall::Resolve { .. }))
                .collect()
        }
    }

    #[async_trait]
    impl QueueClient for InMemoryQueueClient {
        async fn resolve_queue_url(&self, queue_name: &str) -> Result<QueueUrl, QueueError> {
            let mut state = self.state.lock().unwrap();
            state.calls.push(QueueCall::Resolve {
                queue_name: queue_name.to_string(),
            });
            let url = Self::queue_url(queue_name);
            if state.queues.contains_key(&url) {
                Ok(url)
            } else {
                Err(QueueError::QueueNotFound(queue_name.to_string()))
            }
        }

        async fn receive_message(
            &self,
            queue_url: &str,
            _wait: Duration,
        ) -> Result<Option<QueueMessage>, QueueError> {
            let mut state = self.state.lock().unwrap();
            state.calls.push(QueueCall::Receive {
                queue_url: queue_url.to_string(),
            });
            if let Some(reason) = state.failures.receive.clone() {
                return Err(QueueError::Receive(reason));
            }
            let message = match state.queues.get_mut(queue_url) {
                Some(queue) => queue.pop_front(),
                None => return Err(QueueError::QueueNotFound(queue_url.to_string())),
            };
            if let Some(message) = &message {
                state.in_flight.insert(
                    message.receipt_handle.clone(),
                    (queue_url.to_string(), message.clone()),
                );
            }
            Ok(message)
        }

        async fn delete_message(
            &self,
            queue_url: &str,
            receipt_handle: &str,
        ) -> Result<(), QueueError> {
            let mut state = self.state.lock().unwrap();
            state.calls.push(QueueCall::Delete {
                queue_url: queue_url.to_string(),
                receipt_handle: receipt_handle.to_string(),
            });
            if let Some(reason) = state.failures.delete.clone() {
                return Err(QueueError::Delete(reason));
            }
            state.in_flight.remove(receipt_handle);
            Ok(())
        }

        async fn send_message(&self, queue_url: &str, body: &str) -> Result<(), QueueError> {
            let mut state = self.state.lock().unwrap();
            state.calls.push(QueueCall::Send {
                queue_url: queue_url.to_string(),
                body: body.to_string(),
            });
            if let Some(reason) = state.failures.send.clone() {
                return Err(QueueError::Send(reason));
            }
            let queue = state
                .queues
                .get_mut(queue_url)
                .ok_or_else(|| QueueError::QueueNotFound(queue_url.to_string()))?;
            queue.push_back(QueueMessage::new(
                uuid::Uuid::new_v4().to_string(),
                body,
                uuid::Uuid::new_v4().to_string(),
                1,
            ));
            Ok(())
        }
    }
}
