// Image Artifact Domain Model

use super::error::{DomainError, Result};
use serde::{Deserialize, Serialize};

/// Default thumbnail bounding box edge (256x256)
pub const DEFAULT_THUMBNAIL_EDGE: u32 = 256;

/// Where an artifact lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// Downloaded source image
    Original,
    /// Generated thumbnail
    Resized,
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArtifactKind::Original => write!(f, "original"),
            ArtifactKind::Resized => write!(f, "resized"),
        }
    }
}

/// Bounding box a thumbnail must fit within
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThumbnailBounds {
    pub max_width: u32,
    pub max_height: u32,
}

impl Default for ThumbnailBounds {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_THUMBNAIL_EDGE,
            max_height: DEFAULT_THUMBNAIL_EDGE,
        }
    }
}

impl ThumbnailBounds {
    pub fn new(max_width: u32, max_height: u32) -> Result<Self> {
        if max_width == 0 || max_height == 0 {
            return Err(DomainError::ValidationError(format!(
                "Thumbnail bounds must be positive, got {}x{}",
                max_width, max_height
            )));
        }
        Ok(Self {
            max_width,
            max_height,
        })
    }

    /// Target dimensions for an image of `width` x `height`
    ///
    /// Scales down uniformly so that neither edge exceeds the box. Images that
    /// already fit are left at their size. Each edge is at least 1px.
    pub fn fit(&self, width: u32, height: u32) -> (u32, u32) {
        if width == 0 || height == 0 {
            return (width, height);
        }
        if width <= self.max_width && height <= self.max_height {
            return (width, height);
        }

        let scale = f64::min(
            self.max_width as f64 / width as f64,
            self.max_height as f64 / height as f64,
        );
        let target_width = ((width as f64 * scale).round() as u32).clamp(1, self.max_width);
        let target_height = ((height as f64 * scale).round() as u32).clamp(1, self.max_height);

        (target_width, target_height)
    }
}

/// Outcome of one successful unit of work
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedArtifact {
    pub image_id: String,
    /// `{id}.{extension}`, shared by both artifacts
    pub name: String,
    pub original_location: String,
    pub resized_location: String,
    pub original_bytes: usize,
    pub resized_bytes: usize,
}
