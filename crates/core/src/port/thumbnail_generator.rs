// Thumbnail Generator Port

use crate::domain::ThumbnailBounds;
use async_trait::async_trait;
use thiserror::Error;

/// Thumbnail generation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Cannot decode image: {0}")]
    Decode(String),

    #[error("Cannot encode thumbnail: {0}")]
    Encode(String),

    #[error("Resize worker failed: {0}")]
    Worker(String),
}

/// Thumbnail Generator trait
#[async_trait]
pub trait ThumbnailGenerator: Send + Sync {
    /// Scale `source` to fit within `bounds`, preserving aspect ratio
    ///
    /// The result is encoded in the same format as the source.
    ///
    /// # Errors
    /// - DecodeError::Decode if `source` is not a decodable image
    async fn resize(&self, source: Vec<u8>, bounds: ThumbnailBounds)
        -> Result<Vec<u8>, DecodeError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::Mutex;

    /// Mock Thumbnail Generator
    ///
    /// Returns the source bytes unchanged unless configured to fail.
    pub struct MockThumbnailGenerator {
        failure: Option<String>,
        calls: Mutex<Vec<(usize, ThumbnailBounds)>>,
    }

    impl MockThumbnailGenerator {
        pub fn new_passthrough() -> Self {
            Self {
                failure: None,
                calls: Mutex::new(Vec::new()),
            }
        }
        pub fn new_fail(message: impl Into<String>) -> Self {
            Self {
                failure: Some(message.into()),
                calls: Mutex::new(Vec::new()),
            }
        }
        /// (source length, bounds) per call
        pub fn calls(&self) -> Vec<(usize, ThumbnailBounds)> {
            self.calls.lock().unwrap().clone()
        }
        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ThumbnailGenerator for MockThumbnailGenerator {
        async fn resize(
            &self,
            source: Vec<u8>,
            bounds: ThumbnailBounds,
        ) -> Result<Vec<u8>, DecodeError> {
            self.calls.lock().unwrap().push((source.len(), bounds));
            match &self.failure {
                Some(message) => Err(DecodeError::Decode(message.clone())),
                None => Ok(source),
            }
        }
    }
}
