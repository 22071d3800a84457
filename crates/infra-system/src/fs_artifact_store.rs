// Filesystem ArtifactStore
// originals/{id}.{ext} and resized/{id}.{ext}
use async_trait::async_trait;
use std::io::Write;
use std::path::{Path, PathBuf};
use thumbnailer_core::domain::ArtifactKind;
use thumbnailer_core::port::{ArtifactStore, StorageError};
use tracing::{debug, info};

/// Artifact store backed by two local directories
pub struct FsArtifactStore {
    originals_dir: PathBuf,
    resized_dir: PathBuf,
}

impl FsArtifactStore {
    pub fn new(originals_dir: impl Into<PathBuf>, resized_dir: impl Into<PathBuf>) -> Self {
        Self {
            originals_dir: originals_dir.into(),
            resized_dir: resized_dir.into(),
        }
    }

    pub fn dir(&self, kind: ArtifactKind) -> &Path {
        match kind {
            ArtifactKind::Original => &self.originals_dir,
            ArtifactKind::Resized => &self.resized_dir,
        }
    }

    pub fn path(&self, kind: ArtifactKind, name: &str) -> PathBuf {
        self.dir(kind).join(name)
    }
}

// Write into a temp file beside the target, then rename over it. A failed
// write leaves the previous artifact (if any) untouched and no temp file.
fn write_atomically(dir: &Path, target: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(target).map_err(|e| e.error)?;
    Ok(())
}

#[async_trait]
impl ArtifactStore for FsArtifactStore {
    async fn ensure_layout(&self) -> Result<(), StorageError> {
        for dir in [&self.originals_dir, &self.resized_dir] {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| StorageError::Layout {
                    path: dir.display().to_string(),
                    message: e.to_string(),
                })?;
        }
        info!(
            originals = %self.originals_dir.display(),
            resized = %self.resized_dir.display(),
            "Artifact directories ready"
        );
        Ok(())
    }

    async fn write(
        &self,
        kind: ArtifactKind,
        name: &str,
        bytes: &[u8],
    ) -> Result<String, StorageError> {
        let dir = self.dir(kind).to_path_buf();
        let target = self.path(kind, name);
        let location = target.display().to_string();
        let bytes = bytes.to_vec();

        let write_target = target.clone();
        tokio::task::spawn_blocking(move || write_atomically(&dir, &write_target, &bytes))
            .await
            .map_err(|e| StorageError::Write {
                path: location.clone(),
                message: e.to_string(),
            })?
            .map_err(|e| StorageError::Write {
                path: location.clone(),
                message: e.to_string(),
            })?;

        debug!(kind = %kind, path = %location, "Wrote artifact");
        Ok(location)
    }

    async fn read(&self, kind: ArtifactKind, name: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.path(kind, name);
        tokio::fs::read(&path)
            .await
            .map_err(|e| StorageError::Read {
                path: path.display().to_string(),
                message: e.to_string(),
            })
    }
}
