// Thumbnailer Infrastructure - SQS Adapter
// Implements: QueueClient

mod connection;
mod queue_client;

pub use connection::{create_client, SqsSettings, StaticCredentials};
pub use queue_client::SqsQueueClient;
