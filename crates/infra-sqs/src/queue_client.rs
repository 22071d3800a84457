// SQS QueueClient Implementation

use async_trait::async_trait;
use aws_sdk_sqs::error::SdkError;
use aws_sdk_sqs::types::{Message, MessageSystemAttributeName};
use std::fmt::Write as _;
use std::time::Duration;
use thumbnailer_core::application::worker::constants::MAX_WAIT_TIME;
use thumbnailer_core::domain::{QueueMessage, QueueUrl};
use thumbnailer_core::port::{QueueClient, QueueError};
use tracing::{debug, warn};

// Flatten an SDK error and its source chain into one line
fn describe_sdk_error<E>(err: &SdkError<E>) -> String
where
    E: std::error::Error + 'static,
{
    let mut message = String::new();
    let mut current: Option<&(dyn std::error::Error + 'static)> =
        Some(err as &(dyn std::error::Error + 'static));
    while let Some(e) = current {
        if !message.is_empty() {
            message.push_str(": ");
        }
        let _ = write!(message, "{}", e);
        current = e.source();
    }
    message
}

/// Convert one SQS delivery into the domain message
///
/// # Errors
/// - QueueError::MalformedMessage if the id or receipt handle is missing
pub(crate) fn to_queue_message(message: Message) -> Result<QueueMessage, QueueError> {
    let receive_count = QueueMessage::parse_receive_count(
        message
            .attributes
            .as_ref()
            .and_then(|attrs| attrs.get(&MessageSystemAttributeName::ApproximateReceiveCount))
            .map(String::as_str),
    );

    let message_id = message
        .message_id
        .ok_or_else(|| QueueError::MalformedMessage("missing MessageId".to_string()))?;
    let receipt_handle = message.receipt_handle.ok_or_else(|| {
        QueueError::MalformedMessage(format!("missing ReceiptHandle for {}", message_id))
    })?;

    Ok(QueueMessage {
        message_id,
        // An absent body is handed on as empty and fails descriptor decoding
        body: message.body.unwrap_or_default(),
        receipt_handle,
        receive_count,
    })
}

fn wait_time_seconds(wait: Duration) -> i32 {
    wait.min(MAX_WAIT_TIME).as_secs() as i32
}

pub struct SqsQueueClient {
    client: aws_sdk_sqs::Client,
}

impl SqsQueueClient {
    pub fn new(client: aws_sdk_sqs::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl QueueClient for SqsQueueClient {
    async fn resolve_queue_url(&self, queue_name: &str) -> Result<QueueUrl, QueueError> {
        let output = self
            .client
            .get_queue_url()
            .queue_name(queue_name)
            .send()
            .await
            .map_err(|err| {
                let not_found = err
                    .as_service_error()
                    .map(|e| e.is_queue_does_not_exist())
                    .unwrap_or(false);
                if not_found {
                    QueueError::QueueNotFound(queue_name.to_string())
                } else {
                    QueueError::Resolve {
                        name: queue_name.to_string(),
                        reason: describe_sdk_error(&err),
                    }
                }
            })?;

        output.queue_url.ok_or_else(|| QueueError::Resolve {
            name: queue_name.to_string(),
            reason: "response carried no QueueUrl".to_string(),
        })
    }

    async fn receive_message(
        &self,
        queue_url: &str,
        wait: Duration,
    ) -> Result<Option<QueueMessage>, QueueError> {
        let output = self
            .client
            .receive_message()
            .queue_url(queue_url)
            .max_number_of_messages(1)
            .wait_time_seconds(wait_time_seconds(wait))
            .message_system_attribute_names(MessageSystemAttributeName::ApproximateReceiveCount)
            .send()
            .await
            .map_err(|err| QueueError::Receive(describe_sdk_error(&err)))?;

        let mut messages = output.messages.unwrap_or_default().into_iter();
        let Some(message) = messages.next() else {
            return Ok(None);
        };
        if messages.next().is_some() {
            warn!("Received more than one message despite MaxNumberOfMessages=1");
        }

        let message = to_queue_message(message)?;
        debug!(
            message_id = %message.message_id,
            receive_count = message.receive_count,
            "Received message"
        );
        Ok(Some(message))
    }

    async fn delete_message(
        &self,
        queue_url: &str,
        receipt_handle: &str,
    ) -> Result<(), QueueError> {
        self.client
            .delete_message()
            .queue_url(queue_url)
            .receipt_handle(receipt_handle)
            .send()
            .await
            .map_err(|err| QueueError::Delete(describe_sdk_error(&err)))?;
        Ok(())
    }

    async fn send_message(&self, queue_url: &str, body: &str) -> Result<(), QueueError> {
        let output = self
            .client
            .send_message()
            .queue_url(queue_url)
            .message_body(body)
            .send()
            .await
            .map_err(|err| QueueError::Send(describe_sdk_error(&err)))?;
        debug!(message_id = ?output.message_id, queue_url = %queue_url, "Sent message");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_queue_message_reads_receive_count() {
        let message = Message::builder()
            .message_id("m-1")
            .receipt_handle("r-1")
            .body(r#"{"id":"a1","image_url":"http://x/y.png"}"#)
            .attributes(MessageSystemAttributeName::ApproximateReceiveCount, "11")
            .build();

        let converted = to_queue_message(message).unwrap();

        assert_eq!(converted.message_id, "m-1");
        assert_eq!(converted.receipt_handle, "r-1");
        assert_eq!(converted.body, r#"{"id":"a1","image_url":"http://x/y.png"}"#);
        assert_eq!(converted.receive_count, 11);
    }

    #[test]
    fn test_to_queue_message_defaults_missing_count() {
        let message = Message::builder()
            .message_id("m-2")
            .receipt_handle("r-2")
            .body("{}")
            .build();

        assert_eq!(to_queue_message(message).unwrap().receive_count, 1);
    }

    #[test]
    fn test_to_queue_message_missing_receipt_handle() {
        let message = Message::builder().message_id("m-3").body("{}").build();

        let err = to_queue_message(message).unwrap_err();
        assert!(matches!(err, QueueError::MalformedMessage(_)));
    }

    #[test]
    fn test_to_queue_message_missing_body_is_empty() {
        let message = Message::builder()
            .message_id("m-4")
            .receipt_handle("r-4")
            .build();

        assert_eq!(to_queue_message(message).unwrap().body, "");
    }

    #[test]
    fn test_wait_time_is_capped() {
        assert_eq!(wait_time_seconds(Duration::from_secs(10)), 10);
        assert_eq!(wait_time_seconds(Duration::from_secs(60)), 20);
        assert_eq!(wait_time_seconds(Duration::from_millis(500)), 0);
    }
}
