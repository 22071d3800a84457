//! Message Lifecycle Tests
//!
//! One delivery at a time through the real filesystem store and the real
//! resizer, with the queue and the HTTP fetch faked.

mod common;

use common::*;
use image::ImageFormat;
use std::sync::Arc;
use thumbnailer_core::application::Disposition;
use thumbnailer_core::port::image_fetcher::mocks::{MockFetchBehavior, MockImageFetcher};
use thumbnailer_core::port::queue_client::mocks::{InMemoryQueueClient, QueueCall};

/// A good message is stored, resized and deleted
#[tokio::test]
async fn test_successful_message_is_stored_resized_and_deleted() {
    let source = png(800, 600);
    let fetcher = Arc::new(MockImageFetcher::new_bytes(source.clone()));
    let harness = Harness::new(fetcher.clone()).await;
    let pushed = harness
        .queue
        .push_body(SOURCE_QUEUE, &body("a1", "http://x/y.png"), 1);

    let disposition = harness.poll_loop().poll_once().await.unwrap();

    assert_eq!(disposition, Some(Disposition::Acknowledged));
    assert_eq!(fetcher.requested_urls(), vec!["http://x/y.png".to_string()]);

    let original = std::fs::read(harness.originals().join("a1.png")).unwrap();
    assert_eq!(original, source);
    let resized = std::fs::read(harness.resized().join("a1.png")).unwrap();
    assert_eq!(image::guess_format(&resized).unwrap(), ImageFormat::Png);
    assert_eq!(dimensions(&resized), (256, 192));

    assert_eq!(
        harness.queue.delete_calls(),
        vec![QueueCall::Delete {
            queue_url: InMemoryQueueClient::queue_url(SOURCE_QUEUE),
            receipt_handle: pushed.receipt_handle,
        }]
    );
    assert!(harness.queue.send_calls().is_empty());
    assert_eq!(harness.queue.in_flight_count(), 0);
    assert!(harness.queue.messages(SOURCE_QUEUE).is_empty());

    println!("✅ a1 stored in originals/ and resized/, message deleted");
}

/// Receive count doesn't matter once processing succeeds
#[tokio::test]
async fn test_success_after_many_deliveries_is_still_deleted() {
    let fetcher = Arc::new(MockImageFetcher::new_bytes(png(300, 300)));
    let harness = Harness::new(fetcher).await;
    harness
        .queue
        .push_body(SOURCE_QUEUE, &body("late", "http://x/late.png"), 25);

    let disposition = harness.poll_loop().poll_once().await.unwrap();

    assert_eq!(disposition, Some(Disposition::Acknowledged));
    assert_eq!(harness.queue.delete_calls().len(), 1);
    assert!(harness.queue.send_calls().is_empty());
    assert!(harness.queue.messages(DEAD_LETTER_QUEUE).is_empty());
}

/// 404 below the threshold: no queue action, no files
#[tokio::test]
async fn test_not_found_below_threshold_is_left_for_redelivery() {
    let fetcher = Arc::new(MockImageFetcher::new_status(404, "Not Found"));
    let harness = Harness::new(fetcher).await;
    harness
        .queue
        .push_body(SOURCE_QUEUE, &body("a2", "http://x/missing.png"), 3);

    let disposition = harness.poll_loop().poll_once().await.unwrap();

    assert_eq!(disposition, Some(Disposition::LeftForRedelivery));
    assert_eq!(
        harness.queue.calls(),
        vec![QueueCall::Receive {
            queue_url: InMemoryQueueClient::queue_url(SOURCE_QUEUE),
        }]
    );
    assert_eq!(harness.queue.in_flight_count(), 1);
    assert!(entries(&harness.originals()).is_empty());
    assert!(entries(&harness.resized()).is_empty());

    println!("✅ 404 at receive count 3 left for redelivery");
}

/// Transport failure past the threshold: body copied verbatim to DLQ, then deleted
#[tokio::test]
async fn test_transport_failure_past_threshold_is_dead_lettered() {
    let fetcher = Arc::new(MockImageFetcher::new_transport("connection refused"));
    let harness = Harness::new(fetcher).await;
    // Unusual spacing and key order must survive untouched
    let raw = r#"{ "image_url" : "http://down/y.png",  "id":"a3" }"#;
    let pushed = harness.queue.push_body(SOURCE_QUEUE, raw, 11);

    let disposition = harness.poll_loop().poll_once().await.unwrap();

    assert_eq!(disposition, Some(Disposition::DeadLettered));
    assert_eq!(
        harness.queue.calls(),
        vec![
            QueueCall::Receive {
                queue_url: InMemoryQueueClient::queue_url(SOURCE_QUEUE),
            },
            QueueCall::Resolve {
                queue_name: DEAD_LETTER_QUEUE.to_string(),
            },
            QueueCall::Send {
                queue_url: InMemoryQueueClient::queue_url(DEAD_LETTER_QUEUE),
                body: raw.to_string(),
            },
            QueueCall::Delete {
                queue_url: InMemoryQueueClient::queue_url(SOURCE_QUEUE),
                receipt_handle: pushed.receipt_handle,
            },
        ]
    );

    let dead = harness.queue.messages(DEAD_LETTER_QUEUE);
    assert_eq!(dead.len(), 1);
    assert_eq!(dead[0].body, raw);
    assert_eq!(harness.queue.in_flight_count(), 0);

    println!("✅ Transport failure at receive count 11 dead-lettered verbatim");
}

/// Malformed bodies are failures like any other and eventually dead-lettered
#[tokio::test]
async fn test_malformed_body_is_dead_lettered_at_threshold() {
    let fetcher = Arc::new(MockImageFetcher::new_bytes(png(10, 10)));
    let harness = Harness::new(fetcher.clone()).await;
    harness.queue.push_body(SOURCE_QUEUE, "not json at all", 1);
    harness.queue.push_body(SOURCE_QUEUE, "not json at all", 10);
    let poll_loop = harness.poll_loop();

    assert_eq!(
        poll_loop.poll_once().await.unwrap(),
        Some(Disposition::LeftForRedelivery)
    );
    assert_eq!(
        poll_loop.poll_once().await.unwrap(),
        Some(Disposition::DeadLettered)
    );

    assert_eq!(fetcher.call_count(), 0);
    let dead = harness.queue.messages(DEAD_LETTER_QUEUE);
    assert_eq!(dead.len(), 1);
    assert_eq!(dead[0].body, "not json at all");
}

/// A descriptor trying to escape the artifact directory is rejected
#[tokio::test]
async fn test_path_traversal_id_writes_nothing() {
    let fetcher = Arc::new(MockImageFetcher::new_bytes(png(10, 10)));
    let harness = Harness::new(fetcher.clone()).await;
    harness
        .queue
        .push_body(SOURCE_QUEUE, &body("../escape", "http://x/y.png"), 1);

    let disposition = harness.poll_loop().poll_once().await.unwrap();

    assert_eq!(disposition, Some(Disposition::LeftForRedelivery));
    assert_eq!(fetcher.call_count(), 0);
    assert!(entries(&harness.originals()).is_empty());
    assert!(!harness.root.path().join("escape.png").exists());
}

/// Undecodable bytes: the original is kept, no thumbnail is written
#[tokio::test]
async fn test_corrupt_image_keeps_original_without_thumbnail() {
    let fetcher = Arc::new(MockImageFetcher::new_bytes(b"Fake image content".to_vec()));
    let harness = Harness::new(fetcher).await;
    harness
        .queue
        .push_body(SOURCE_QUEUE, &body("a4", "http://x/y.jpg"), 1);

    let disposition = harness.poll_loop().poll_once().await.unwrap();

    assert_eq!(disposition, Some(Disposition::LeftForRedelivery));
    assert_eq!(entries(&harness.originals()), vec!["a4.jpg"]);
    assert!(entries(&harness.resized()).is_empty());
    assert!(harness.queue.delete_calls().is_empty());
}

/// Reprocessing the same id overwrites both artifacts
#[tokio::test]
async fn test_reprocessing_overwrites_existing_artifacts() {
    let fetcher = Arc::new(MockImageFetcher::new_bytes(png(640, 480)));
    let harness = Harness::new(fetcher.clone()).await;
    std::fs::write(harness.originals().join("a1.png"), b"stale original").unwrap();
    std::fs::write(harness.resized().join("a1.png"), b"stale thumbnail").unwrap();

    harness
        .queue
        .push_body(SOURCE_QUEUE, &body("a1", "http://x/y.png"), 1);
    harness
        .queue
        .push_body(SOURCE_QUEUE, &body("a1", "http://x/y.png"), 1);
    let poll_loop = harness.poll_loop();

    assert_eq!(
        poll_loop.poll_once().await.unwrap(),
        Some(Disposition::Acknowledged)
    );
    fetcher.set_behavior(MockFetchBehavior::Bytes(png(1024, 256)));
    assert_eq!(
        poll_loop.poll_once().await.unwrap(),
        Some(Disposition::Acknowledged)
    );

    assert_eq!(entries(&harness.originals()), vec!["a1.png"]);
    assert_eq!(entries(&harness.resized()), vec!["a1.png"]);
    assert_eq!(
        std::fs::read(harness.originals().join("a1.png")).unwrap(),
        png(1024, 256)
    );
    assert_eq!(
        dimensions(&std::fs::read(harness.resized().join("a1.png")).unwrap()),
        (256, 64)
    );
    assert_eq!(harness.queue.delete_calls().len(), 2);

    println!("✅ Reprocessing a1 overwrote both artifacts");
}

/// Thumbnails fit the box and keep their aspect ratio across formats
#[tokio::test]
async fn test_thumbnails_fit_bounds_for_various_shapes() {
    let fetcher = Arc::new(MockImageFetcher::new_bytes(Vec::new()));
    let harness = Harness::new(fetcher.clone()).await;
    let poll_loop = harness.poll_loop();

    let cases = [
        ("wide", ImageFormat::Png, "png", (1000, 250), (256, 64)),
        ("tall", ImageFormat::Jpeg, "jpg", (300, 900), (85, 256)),
        ("square", ImageFormat::Png, "png", (512, 512), (256, 256)),
        ("tiny", ImageFormat::Jpeg, "jpeg", (40, 30), (40, 30)),
    ];

    for (id, format, ext, (w, h), expected) in cases {
        fetcher.set_behavior(MockFetchBehavior::Bytes(encode(w, h, format)));
        harness.queue.push_body(
            SOURCE_QUEUE,
            &body(id, &format!("http://x/{}.{}", id, ext)),
            1,
        );

        assert_eq!(
            poll_loop.poll_once().await.unwrap(),
            Some(Disposition::Acknowledged)
        );

        let resized =
            std::fs::read(harness.resized().join(format!("{}.{}", id, ext))).unwrap();
        assert_eq!(image::guess_format(&resized).unwrap(), format);
        assert_eq!(dimensions(&resized), expected, "{} {}x{}", id, w, h);
    }
}
