// Domain Layer - Pure business logic and entities

pub mod artifact;
pub mod descriptor;
pub mod error;
pub mod message;

// Re-exports
pub use artifact::{ArtifactKind, ProcessedArtifact, ThumbnailBounds, DEFAULT_THUMBNAIL_EDGE};
pub use descriptor::WorkDescriptor;
pub use error::{DescriptorError, DomainError};
pub use message::{MessageId, QueueMessage, QueueUrl, ReceiptHandle};
