//! Search lifecycle integration tests.
//!
//! These tests drive the debounced controller over the real fallback
//! orchestrator with mock providers:
//! idle -> pending -> searching -> settled

use std::sync::Arc;
use std::time::Duration;

use nutrisearch_core::{
    controller::{SearchController, SearchPhase},
    providers::ProviderError,
    search::{BarcodeOutcome, FallbackSearcher},
    testing::{fixtures, MockProvider},
    FoodSource,
};

/// Test helper holding both mock providers and the controller under test.
struct TestHarness {
    off: Arc<MockProvider>,
    usda: Arc<MockProvider>,
    controller: SearchController,
}

impl TestHarness {
    fn new() -> Self {
        let off = Arc::new(MockProvider::open_food_facts());
        let usda = Arc::new(MockProvider::usda());
        let searcher = FallbackSearcher::new(off.clone(), Some(usda.clone()), off.clone());
        let controller = SearchController::new(Arc::new(searcher), Duration::from_millis(200));

        Self {
            off,
            usda,
            controller,
        }
    }
}

async fn sleep_ms(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

#[tokio::test(start_paused = true)]
async fn test_typing_settles_on_primary_results() {
    let mut h = TestHarness::new();
    h.off
        .set_items(vec![
            fixtures::off_food("1", "Havremjölk"),
            fixtures::off_food("2", "Mjölkchoklad"),
            fixtures::off_food("3", "Mjölk"),
        ])
        .await;

    assert_eq!(h.controller.snapshot().phase, SearchPhase::Idle);

    for text in ["m", "mj", "mjö", "mjöl", "mjölk"] {
        h.controller.on_query_changed(text);
        sleep_ms(30).await;
    }
    assert_eq!(h.controller.snapshot().phase, SearchPhase::Pending);

    sleep_ms(300).await;

    let snapshot = h.controller.snapshot();
    assert_eq!(snapshot.phase, SearchPhase::Settled);
    assert_eq!(snapshot.answered_by, Some(FoodSource::OpenFoodFacts));
    let names: Vec<&str> = snapshot.results.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["Mjölk", "Mjölkchoklad", "Havremjölk"]);

    assert_eq!(h.off.recorded_searches().await, vec!["mjölk"]);
    assert_eq!(h.usda.search_count().await, 0);
}

#[tokio::test(start_paused = true)]
async fn test_primary_failure_falls_back_with_provenance() {
    let mut h = TestHarness::new();
    h.off.push_error(ProviderError::Timeout).await;
    h.usda
        .set_items(vec![fixtures::usda_food("171287", "Egg, whole, raw")])
        .await;

    h.controller.on_query_changed("egg");
    sleep_ms(300).await;

    let snapshot = h.controller.snapshot();
    assert_eq!(snapshot.phase, SearchPhase::Settled);
    assert_eq!(snapshot.answered_by, Some(FoodSource::Usda));
    assert_eq!(snapshot.results.len(), 1);
    assert!(snapshot.results.iter().all(|i| i.source == FoodSource::Usda));
}

#[tokio::test(start_paused = true)]
async fn test_in_flight_provider_call_is_cancelled() {
    let mut h = TestHarness::new();
    h.off.set_items(vec![fixtures::off_food("1", "Ost")]).await;
    h.off.set_delay(Duration::from_millis(500)).await;

    h.controller.on_query_changed("o");
    sleep_ms(300).await;
    assert_eq!(h.controller.snapshot().phase, SearchPhase::Searching);

    h.controller.on_query_changed("os");
    sleep_ms(1000).await;

    let snapshot = h.controller.snapshot();
    assert_eq!(snapshot.query, "os");
    assert_eq!(snapshot.phase, SearchPhase::Settled);
    // "o" reached the provider but its result was never published
    assert_eq!(h.off.recorded_searches().await, vec!["o", "os"]);
    // no fallback either: the cancelled search never got that far
    assert_eq!(h.usda.search_count().await, 0);
}

#[tokio::test(start_paused = true)]
async fn test_everything_empty_settles_with_no_provider() {
    let mut h = TestHarness::new();

    h.controller.on_query_changed("xyzzy");
    sleep_ms(300).await;

    let snapshot = h.controller.snapshot();
    assert_eq!(snapshot.phase, SearchPhase::Settled);
    assert!(snapshot.results.is_empty());
    assert_eq!(snapshot.answered_by, None);
    assert_eq!(h.off.search_count().await, 1);
    assert_eq!(h.usda.search_count().await, 1);
}

#[tokio::test(start_paused = true)]
async fn test_barcode_scan_flow() {
    let mut h = TestHarness::new();
    h.off
        .add_barcode(
            "7310865004703",
            fixtures::off_food("7310865004703", "Mellanmjölk"),
        )
        .await;

    h.controller.on_query_changed("mellan");
    h.controller.on_barcode_scanned("7310865004703");
    assert!(h.controller.snapshot().loading);

    sleep_ms(300).await;

    let snapshot = h.controller.snapshot();
    assert_eq!(snapshot.phase, SearchPhase::Settled);
    assert_eq!(snapshot.results[0].name, "Mellanmjölk");
    assert!(matches!(
        snapshot.barcode.and_then(|b| b.outcome),
        Some(BarcodeOutcome::Found { .. })
    ));
    assert_eq!(h.off.search_count().await, 0);

    h.off.push_error(ProviderError::Timeout).await;
    h.controller.on_barcode_scanned("7310865004703");
    sleep_ms(10).await;
    assert!(matches!(
        h.controller.snapshot().barcode.and_then(|b| b.outcome),
        Some(BarcodeOutcome::Unavailable { .. })
    ));
}
