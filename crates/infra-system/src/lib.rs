// Thumbnailer Infrastructure - System Adapters
// Implements: ImageFetcher, ThumbnailGenerator, ArtifactStore

pub mod fs_artifact_store;
pub mod http_fetcher;
pub mod image_generator;

pub use fs_artifact_store::FsArtifactStore;
pub use http_fetcher::HttpImageFetcher;
pub use image_generator::ImageThumbnailGenerator;
