// Port Layer - Interfaces for external dependencies

pub mod artifact_store;
pub mod image_fetcher;
pub mod queue_client;
pub mod thumbnail_generator;

// Re-exports
pub use artifact_store::{ArtifactStore, StorageError};
pub use image_fetcher::{FetchError, ImageFetcher};
pub use queue_client::{QueueClient, QueueError};
pub use thumbnail_generator::{DecodeError, ThumbnailGenerator};
