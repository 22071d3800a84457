// Central Error Types for the Application

use crate::domain::DescriptorError;
use crate::port::{DecodeError, FetchError, StorageError};
use thiserror::Error;

/// Failure anywhere on the processing path of one message
///
/// Every variant takes the same retry / dead-letter branch in the lifecycle
/// controller; the distinction only matters for logs.
#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("Descriptor error: {0}")]
    Descriptor(#[from] DescriptorError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Processing panicked: {0}")]
    Panicked(String),
}

impl ProcessingError {
    /// Short label for structured logs
    pub fn kind(&self) -> &'static str {
        match self {
            ProcessingError::Descriptor(_) => "descriptor",
            ProcessingError::Fetch(FetchError::Status { .. }) => "fetch_status",
            ProcessingError::Fetch(FetchError::Transport { .. }) => "fetch_transport",
            ProcessingError::Decode(_) => "decode",
            ProcessingError::Storage(_) => "storage",
            ProcessingError::Panicked(_) => "panic",
        }
    }
}
