// Image Fetcher Port

use async_trait::async_trait;
use thiserror::Error;

/// Fetch failures
///
/// A non-success response is an ordinary outcome and is reported as
/// `Status`; network-level faults are reported as `Transport`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Invalid URL: {url} {status} {reason}")]
    Status {
        url: String,
        status: u16,
        reason: String,
    },

    #[error("Transport failure for {url}: {message}")]
    Transport { url: String, message: String },
}

impl FetchError {
    pub fn is_transport(&self) -> bool {
        matches!(self, FetchError::Transport { .. })
    }
}

/// Image Fetcher trait
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    /// Retrieve the bytes behind `url`
    ///
    /// # Errors
    /// - FetchError::Status on a non-2xx response
    /// - FetchError::Transport on timeout, DNS, connection or body read failure
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::Mutex;

    /// Mock fetcher behavior
    #[derive(Debug, Clone)]
    pub enum MockFetchBehavior {
        /// Return these bytes
        Bytes(Vec<u8>),
        /// Non-success HTTP response
        Status(u16, String),
        /// Network fault
        Transport(String),
        /// Panic (for panic isolation testing)
        Panic(String),
    }

    /// Mock Image Fetcher for testing
    pub struct MockImageFetcher {
        behavior: Mutex<MockFetchBehavior>,
        requested: Mutex<Vec<String>>,
    }

    impl MockImageFetcher {
        pub fn new(behavior: MockFetchBehavior) -> Self {
            Self {
                behavior: Mutex::new(behavior),
                requested: Mutex::new(Vec::new()),
            }
        }
        pub fn new_bytes(bytes: impl Into<Vec<u8>>) -> Self {
            Self::new(MockFetchBehavior::Bytes(bytes.into()))
        }
        pub fn new_status(status: u16, reason: impl Into<String>) -> Self {
            Self::new(MockFetchBehavior::Status(status, reason.into()))
        }
        pub fn new_transport(message: impl Into<String>) -> Self {
            Self::new(MockFetchBehavior::Transport(message.into()))
        }
        pub fn set_behavior(&self, behavior: MockFetchBehavior) {
            *self.behavior.lock().unwrap() = behavior;
        }
        pub fn requested_urls(&self) -> Vec<String> {
            self.requested.lock().unwrap().clone()
        }
        pub fn call_count(&self) -> usize {
            self.requested.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ImageFetcher for MockImageFetcher {
        async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
            self.requested.lock().unwrap().push(url.to_string());

            let behavior = self.behavior.lock().unwrap().clone();

            match behavior {
                MockFetchBehavior::Bytes(bytes) => Ok(bytes),
                MockFetchBehavior::Status(status, reason) => Err(FetchError::Status {
                    url: url.to_string(),
                    status,
                    reason,
                }),
                MockFetchBehavior::Transport(message) => Err(FetchError::Transport {
                    url: url.to_string(),
                    message,
                }),
                MockFetchBehavior::Panic(message) => {
                    panic!("{}", message);
                }
            }
        }
    }
}
