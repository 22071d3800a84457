// Artifact Store Port
// The originals/ and resized/ locations on disk

use crate::domain::ArtifactKind;
use async_trait::async_trait;
use thiserror::Error;

/// Artifact storage errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("Cannot prepare directory {path}: {message}")]
    Layout { path: String, message: String },

    #[error("Cannot write {path}: {message}")]
    Write { path: String, message: String },

    #[error("Cannot read {path}: {message}")]
    Read { path: String, message: String },
}

/// Artifact Store trait
///
/// Artifacts are addressed by kind and `{id}.{extension}` name. Writing an
/// existing name replaces it.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Create the storage locations if absent
    async fn ensure_layout(&self) -> Result<(), StorageError>;

    /// Write an artifact; either the full content lands or nothing does
    ///
    /// Returns the location written, for logging.
    async fn write(
        &self,
        kind: ArtifactKind,
        name: &str,
        bytes: &[u8],
    ) -> Result<String, StorageError>;

    /// Read an artifact back
    async fn read(&self, kind: ArtifactKind, name: &str) -> Result<Vec<u8>, StorageError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory artifact store
    #[derive(Default)]
    pub struct InMemoryArtifactStore {
        artifacts: Mutex<HashMap<(ArtifactKind, String), Vec<u8>>>,
        fail_writes: Mutex<Option<ArtifactKind>>,
        writes: Mutex<usize>,
    }

    impl InMemoryArtifactStore {
        pub fn new() -> Self {
            Self::default()
        }
        /// Make every write of `kind` fail
        pub fn fail_writes_of(&self, kind: ArtifactKind) {
            *self.fail_writes.lock().unwrap() = Some(kind);
        }
        pub fn get(&self, kind: ArtifactKind, name: &str) -> Option<Vec<u8>> {
            self.artifacts
                .lock()
                .unwrap()
                .get(&(kind, name.to_string()))
                .cloned()
        }
        pub fn contains(&self, kind: ArtifactKind, name: &str) -> bool {
            self.get(kind, name).is_some()
        }
        pub fn write_count(&self) -> usize {
            *self.writes.lock().unwrap()
        }
        fn location(kind: ArtifactKind, name: &str) -> String {
            format!("memory://{}/{}", kind, name)
        }
    }

    #[async_trait]
    impl ArtifactStore for InMemoryArtifactStore {
        async fn ensure_layout(&self) -> Result<(), StorageError> {
            Ok(())
        }

        async fn write(
            &self,
            kind: ArtifactKind,
            name: &str,
            bytes: &[u8],
        ) -> Result<String, StorageError> {
            let location = Self::location(kind, name);
            if *self.fail_writes.lock().unwrap() == Some(kind) {
                return Err(StorageError::Write {
                    path: location,
                    message: "injected write failure".to_string(),
                });
            }
            *self.writes.lock().unwrap() += 1;
            self.artifacts
                .lock()
                .unwrap()
                .insert((kind, name.to_string()), bytes.to_vec());
            Ok(location)
        }

        async fn read(&self, kind: ArtifactKind, name: &str) -> Result<Vec<u8>, StorageError> {
            self.get(kind, name).ok_or_else(|| StorageError::Read {
                path: Self::location(kind, name),
                message: "not found".to_string(),
            })
        }
    }
}
