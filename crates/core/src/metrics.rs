//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Provider clients (requests, latency)
//! - Search orchestration (answering provider, fallbacks, cache hits)
//! - Barcode lookups
//! - The debounced controller (superseded searches)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Provider Metrics
// =============================================================================

/// Provider requests total.
pub static PROVIDER_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "nutrisearch_provider_requests_total",
            "Total requests sent to food providers",
        ),
        &["provider", "operation", "result"], // result: "success", "not_found", or an error kind
    )
    .unwrap()
});

/// Provider request duration in seconds.
pub static PROVIDER_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "nutrisearch_provider_request_duration_seconds",
            "Duration of food provider calls",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        &["provider", "operation"],
    )
    .unwrap()
});

/// Normalized records returned per provider search.
pub static PROVIDER_RESULTS: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "nutrisearch_provider_results",
            "Number of normalized records returned per provider search",
        )
        .buckets(vec![0.0, 1.0, 5.0, 10.0, 25.0, 50.0, 100.0, 200.0]),
        &["provider"],
    )
    .unwrap()
});

// =============================================================================
// Search Metrics
// =============================================================================

/// Orchestrated searches total by answering provider.
pub static SEARCHES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("nutrisearch_searches_total", "Total orchestrated searches"),
        &["answered_by"], // provider tag, or "none" when every provider came up empty
    )
    .unwrap()
});

/// Fallbacks to the secondary provider.
pub static FALLBACKS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "nutrisearch_fallbacks_total",
            "Total fallbacks from the primary provider",
        ),
        &["reason"], // "error", "empty"
    )
    .unwrap()
});

/// Search outcomes served from the cache.
pub static SEARCH_CACHE_HITS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "nutrisearch_search_cache_hits_total",
        "Total searches answered from the outcome cache",
    )
    .unwrap()
});

/// Barcode lookups total by outcome.
pub static BARCODE_LOOKUPS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("nutrisearch_barcode_lookups_total", "Total barcode lookups"),
        &["outcome"], // "found", "not_found", "unavailable"
    )
    .unwrap()
});

// =============================================================================
// Controller Metrics
// =============================================================================

/// Searches discarded because a newer query superseded them.
pub static SEARCHES_SUPERSEDED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "nutrisearch_searches_superseded_total",
        "Total searches cancelled or discarded as stale",
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Providers
        Box::new(PROVIDER_REQUESTS.clone()),
        Box::new(PROVIDER_REQUEST_DURATION.clone()),
        Box::new(PROVIDER_RESULTS.clone()),
        // Search
        Box::new(SEARCHES_TOTAL.clone()),
        Box::new(FALLBACKS_TOTAL.clone()),
        Box::new(SEARCH_CACHE_HITS.clone()),
        Box::new(BARCODE_LOOKUPS.clone()),
        // Controller
        Box::new(SEARCHES_SUPERSEDED.clone()),
    ]
}
