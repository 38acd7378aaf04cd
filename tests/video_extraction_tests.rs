/// Extraction pipeline tests against canned episode pages

mod common;

use anichin_scraper::metrics::MetricsTracker;
use anichin_scraper::models::{ExtractionFailure, StreamDescriptor, StreamKind};
use anichin_scraper::video::VideoExtractor;
use common::{encode, episode_page, iframe, StaticFetcher};
use std::sync::Arc;

fn extractor(fetcher: StaticFetcher) -> (VideoExtractor, Arc<MetricsTracker>) {
    let metrics = Arc::new(MetricsTracker::new());
    let extractor = VideoExtractor::new(Arc::new(fetcher), Arc::clone(&metrics));
    (extractor, metrics)
}

#[tokio::test]
async fn test_end_to_end_example() {
    let payload_a = iframe("https://host/videoembed/abc");
    let page = episode_page(&[("Server A", &payload_a), ("Server B", "")]);
    let (extractor, _) = extractor(StaticFetcher::new().with_page("episode-1", page));

    let result = extractor.extract("episode-1").await;

    assert_eq!(
        result.descriptors(),
        &[StreamDescriptor {
            label: "Server A".to_string(),
            url: "https://host/video/abc".to_string(),
            kind: StreamKind::Iframe,
        }]
    );
    assert_eq!(result.error_message(), None);
}

#[tokio::test]
async fn test_only_decodable_mirrors_are_kept_in_order() {
    let ok1 = iframe("https://ok.ru/videoembed/1");
    let ok2 = iframe("https://www.dailymotion.com/embed/video/x2");
    let ok3 = encode(r#"<embed src="https://player.example/e/3">"#);
    let no_embed = encode("<div>server sedang maintenance</div>");
    let no_src = encode(r#"<iframe frameborder="0"></iframe>"#);

    let page = episode_page(&[
        ("OK.ru", &ok1),
        ("Broken", "@@not base64@@"),
        ("Dailymotion", &ok2),
        ("Maintenance", &no_embed),
        ("No Source", &no_src),
        ("Player", &ok3),
    ]);
    let (extractor, metrics) = extractor(StaticFetcher::new().with_page("ep", page));

    let result = extractor.extract("ep").await;
    let labels: Vec<&str> = result.descriptors().iter().map(|d| d.label.as_str()).collect();
    let urls: Vec<&str> = result.descriptors().iter().map(|d| d.url.as_str()).collect();

    assert_eq!(labels, vec!["OK.ru", "Dailymotion", "Player"]);
    assert_eq!(
        urls,
        vec![
            "https://ok.ru/video/1",
            "https://www.dailymotion.com/embed/video/x2",
            "https://player.example/e/3",
        ]
    );
    assert!(result.error_message().is_none());

    let snapshot = metrics.snapshot();
    assert_eq!(snapshot.mirrors_decoded, 3);
    // three broken mirrors plus the placeholder option
    assert_eq!(snapshot.mirrors_dropped, 4);
}

#[tokio::test]
async fn test_labels_are_trimmed() {
    let payload = iframe("https://host/v/1");
    let page = episode_page(&[("\n   Server   A \t", &payload)]);
    let (extractor, _) = extractor(StaticFetcher::new().with_page("ep", page));

    let result = extractor.extract("ep").await;
    assert_eq!(result.descriptors()[0].label, "Server   A");
}

#[tokio::test]
async fn test_page_without_mirror_control() {
    let page = "<html><body><div class=\"entry-content\">Coming soon</div></body></html>";
    let (extractor, _) = extractor(StaticFetcher::new().with_page("ep", page));

    let result = extractor.extract("ep").await;
    assert!(result.descriptors().is_empty());
    assert_eq!(result.failure(), Some(ExtractionFailure::NoVideoServers));
    assert_eq!(result.error_message().as_deref(), Some("no video servers found"));
}

#[tokio::test]
async fn test_garbage_payloads_yield_no_valid_links() {
    let page = episode_page(&[
        ("Server A", "%%%%"),
        ("Server B", "not-valid-base64!!!"),
        ("Server C", "//4="),
    ]);
    let (extractor, metrics) = extractor(StaticFetcher::new().with_page("ep", page));

    let result = extractor.extract("ep").await;
    assert!(result.descriptors().is_empty());
    assert_eq!(
        result.error_message().as_deref(),
        Some("no valid video links found")
    );
    assert_eq!(metrics.snapshot().no_valid_links, 1);
}

#[tokio::test]
async fn test_fetch_failure_is_page_not_found() {
    let (extractor, metrics) = extractor(StaticFetcher::new());

    let result = extractor.extract("missing-episode").await;
    assert!(result.descriptors().is_empty());
    assert_eq!(result.error_message().as_deref(), Some("page not found"));
    assert_eq!(metrics.snapshot().page_not_found, 1);
}

#[tokio::test]
async fn test_blank_slug_does_not_fetch() {
    let fetcher = Arc::new(StaticFetcher::new());
    let metrics = Arc::new(MetricsTracker::new());
    let extractor = VideoExtractor::new(fetcher.clone(), metrics.clone());

    let result = extractor.extract("  ").await;
    assert_eq!(result.failure(), Some(ExtractionFailure::PageNotFound));
    assert_eq!(fetcher.calls(), 0);

    let snapshot = metrics.snapshot();
    assert_eq!(snapshot.total_requests, 1);
    assert_eq!(snapshot.page_not_found, 1);
}

#[tokio::test]
async fn test_each_call_fetches_once() {
    let payload = iframe("https://host/v/1");
    let fetcher = Arc::new(StaticFetcher::new().with_page("ep", episode_page(&[("A", &payload)])));
    let extractor = VideoExtractor::new(fetcher.clone(), Arc::new(MetricsTracker::new()));

    let first = extractor.extract("ep").await;
    let second = extractor.extract("ep").await;

    assert_eq!(first, second);
    assert_eq!(fetcher.calls(), 2);
}
