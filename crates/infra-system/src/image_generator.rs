// Thumbnail generation with the `image` crate
// Decode/encode is CPU-bound and runs on the blocking pool
use async_trait::async_trait;
use image::imageops::FilterType;
use std::io::Cursor;
use thumbnailer_core::domain::ThumbnailBounds;
use thumbnailer_core::port::{DecodeError, ThumbnailGenerator};
use tracing::debug;

/// Fit-within-box thumbnail generator
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageThumbnailGenerator;

impl ImageThumbnailGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Synchronous resize, encoding the result in the source format
    pub fn resize_blocking(
        &self,
        source: &[u8],
        bounds: ThumbnailBounds,
    ) -> Result<Vec<u8>, DecodeError> {
        let format = image::guess_format(source).map_err(|e| DecodeError::Decode(e.to_string()))?;
        let img = image::load_from_memory_with_format(source, format)
            .map_err(|e| DecodeError::Decode(e.to_string()))?;

        let (width, height) = (img.width(), img.height());
        let (target_width, target_height) = bounds.fit(width, height);
        let thumbnail = if (target_width, target_height) == (width, height) {
            img
        } else {
            img.resize_exact(target_width, target_height, FilterType::Lanczos3)
        };

        let mut encoded = Cursor::new(Vec::new());
        thumbnail
            .write_to(&mut encoded, format)
            .map_err(|e| DecodeError::Encode(e.to_string()))?;

        debug!(
            format = ?format,
            from = %format!("{}x{}", width, height),
            to = %format!("{}x{}", target_width, target_height),
            "Resized image"
        );
        Ok(encoded.into_inner())
    }
}

#[async_trait]
impl ThumbnailGenerator for ImageThumbnailGenerator {
    async fn resize(
        &self,
        source: Vec<u8>,
        bounds: ThumbnailBounds,
    ) -> Result<Vec<u8>, DecodeError> {
        let generator = *self;
        tokio::task::spawn_blocking(move || generator.resize_blocking(&source, bounds))
            .await
            .map_err(|e| DecodeError::Worker(e.to_string()))?
    }
}
