// Queue Message Domain Model

use serde::{Deserialize, Serialize};

/// Addressable queue identity (an SQS queue URL in production)
pub type QueueUrl = String;

/// Queue-assigned message identifier
pub type MessageId = String;

/// Per-delivery credential required to delete a specific delivery
pub type ReceiptHandle = String;

/// One delivery of a queue message
///
/// The body is opaque at this level; it is decoded into a
/// [`WorkDescriptor`](super::WorkDescriptor) by the processor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueMessage {
    pub message_id: MessageId,
    pub body: String,
    pub receipt_handle: ReceiptHandle,
    /// Approximate number of times this message has been received,
    /// maintained by the queue (1 on first delivery).
    pub receive_count: u32,
}

impl QueueMessage {
    pub fn new(
        message_id: impl Into<String>,
        body: impl Into<String>,
        receipt_handle: impl Into<String>,
        receive_count: u32,
    ) -> Self {
        Self {
            message_id: message_id.into(),
            body: body.into(),
            receipt_handle: receipt_handle.into(),
            receive_count,
        }
    }

    /// Interpret the raw `ApproximateReceiveCount` attribute.
    ///
    /// A missing or unparsable value counts as a first delivery.
    pub fn parse_receive_count(raw: Option<&str>) -> u32 {
        raw.and_then(|v| v.trim().parse::<u32>().ok())
            .filter(|count| *count > 0)
            .unwrap_or(1)
    }
}
