// Work Unit Processor
// fetch -> originals/{id}.{ext} -> resize -> resized/{id}.{ext}
use crate::domain::{ArtifactKind, ProcessedArtifact, ThumbnailBounds, WorkDescriptor};
use crate::error::ProcessingError;
use crate::port::{ArtifactStore, ImageFetcher, ThumbnailGenerator};
use std::sync::Arc;
use tracing::{debug, info};

/// Runs one unit of work for a work descriptor
///
/// Not transactional: if resizing fails the downloaded original stays in
/// place. Every write replaces the previous artifact of the same name, so
/// reprocessing the same id after a partial failure is safe.
pub struct WorkUnitProcessor {
    fetcher: Arc<dyn ImageFetcher>,
    generator: Arc<dyn ThumbnailGenerator>,
    store: Arc<dyn ArtifactStore>,
    bounds: ThumbnailBounds,
}

impl WorkUnitProcessor {
    pub fn new(
        fetcher: Arc<dyn ImageFetcher>,
        generator: Arc<dyn ThumbnailGenerator>,
        store: Arc<dyn ArtifactStore>,
        bounds: ThumbnailBounds,
    ) -> Self {
        Self {
            fetcher,
            generator,
            store,
            bounds,
        }
    }

    pub fn bounds(&self) -> ThumbnailBounds {
        self.bounds
    }

    /// Decode a message body and process it
    ///
    /// A malformed body fails like any other step.
    pub async fn process_body(&self, body: &str) -> Result<ProcessedArtifact, ProcessingError> {
        let descriptor = WorkDescriptor::from_body(body)?;
        self.process(&descriptor).await
    }

    /// Process a decoded descriptor
    ///
    /// # Errors
    /// - ProcessingError::Fetch if the download fails
    /// - ProcessingError::Storage if an artifact cannot be written or read
    /// - ProcessingError::Decode if the original is not a decodable image
    pub async fn process(
        &self,
        descriptor: &WorkDescriptor,
    ) -> Result<ProcessedArtifact, ProcessingError> {
        let name = descriptor.artifact_name();

        debug!(image_id = %descriptor.id, url = %descriptor.image_url, "Fetching original");
        let downloaded = self.fetcher.fetch(&descriptor.image_url).await?;
        let original_location = self
            .store
            .write(ArtifactKind::Original, &name, &downloaded)
            .await?;
        let original_bytes = downloaded.len();
        drop(downloaded);

        // Resize from the stored original
        let original = self.store.read(ArtifactKind::Original, &name).await?;
        let resized = self.generator.resize(original, self.bounds).await?;
        let resized_location = self
            .store
            .write(ArtifactKind::Resized, &name, &resized)
            .await?;

        info!(
            image_id = %descriptor.id,
            original = %original_location,
            resized = %resized_location,
            original_bytes,
            resized_bytes = resized.len(),
            "Thumbnail generated"
        );

        Ok(ProcessedArtifact {
            image_id: descriptor.id.clone(),
            name,
            original_location,
            resized_location,
            original_bytes,
            resized_bytes: resized.len(),
        })
    }
}
