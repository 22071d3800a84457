//! Shared fixtures: in-memory queue, real filesystem store, real resizer

#![allow(dead_code)]

use image::{DynamicImage, ImageFormat, RgbImage};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use thumbnailer_core::application::{
    LifecycleController, PollLoop, PollSettings, RetryPolicy, WorkUnitProcessor,
};
use thumbnailer_core::domain::ThumbnailBounds;
use thumbnailer_core::port::image_fetcher::mocks::MockImageFetcher;
use thumbnailer_core::port::queue_client::mocks::InMemoryQueueClient;
use thumbnailer_core::port::{ArtifactStore, ImageFetcher};
use thumbnailer_infra_system::{FsArtifactStore, ImageThumbnailGenerator};

pub const SOURCE_QUEUE: &str = "images";
pub const DEAD_LETTER_QUEUE: &str = "images-dlq";

pub fn encode(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    }));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, format).unwrap();
    out.into_inner()
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
    encode(width, height, ImageFormat::Png)
}

pub fn dimensions(bytes: &[u8]) -> (u32, u32) {
    let img = image::load_from_memory(bytes).unwrap();
    (img.width(), img.height())
}

pub fn body(id: &str, image_url: &str) -> String {
    serde_json::json!({ "id": id, "image_url": image_url }).to_string()
}

/// Fast settings so idle and error sleeps don't slow tests down
pub fn fast_settings() -> PollSettings {
    PollSettings {
        wait_time: Duration::ZERO,
        idle_sleep: Duration::from_millis(10),
        error_recovery_sleep: Duration::from_millis(10),
    }
}

/// One worker wired against fakes and a temp directory
pub struct Harness {
    pub queue: Arc<InMemoryQueueClient>,
    pub controller: Arc<LifecycleController>,
    pub root: TempDir,
}

impl Harness {
    pub async fn new(fetcher: Arc<MockImageFetcher>) -> Self {
        Self::with_fetcher(fetcher).await
    }

    pub async fn with_fetcher(fetcher: Arc<dyn ImageFetcher>) -> Self {
        let root = tempfile::tempdir().unwrap();
        let store = Arc::new(FsArtifactStore::new(
            root.path().join("originals"),
            root.path().join("resized"),
        ));
        store.ensure_layout().await.unwrap();

        let queue = Arc::new(InMemoryQueueClient::with_queues(&[
            SOURCE_QUEUE,
            DEAD_LETTER_QUEUE,
        ]));
        let processor = Arc::new(WorkUnitProcessor::new(
            fetcher,
            Arc::new(ImageThumbnailGenerator::new()),
            store,
            ThumbnailBounds::default(),
        ));
        let controller = Arc::new(LifecycleController::new(
            queue.clone(),
            processor,
            RetryPolicy::default(),
            InMemoryQueueClient::queue_url(SOURCE_QUEUE),
            DEAD_LETTER_QUEUE,
        ));

        Self {
            queue,
            controller,
            root,
        }
    }

    pub fn poll_loop(&self) -> PollLoop {
        PollLoop::new(self.queue.clone(), self.controller.clone(), fast_settings())
    }

    pub fn originals(&self) -> PathBuf {
        self.root.path().join("originals")
    }

    pub fn resized(&self) -> PathBuf {
        self.root.path().join("resized")
    }
}

pub fn entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
