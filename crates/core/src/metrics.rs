//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Resolution pipeline (resolutions, queries, candidates, streams)
//! - Index access (searches, extractions)
//! - Result cache and metadata lookups

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts};

// =============================================================================
// Resolution pipeline
// =============================================================================

/// Resolutions total by media type.
pub static RESOLUTIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("pramen_resolutions_total", "Total stream resolutions"),
        &["media_type"],
    )
    .unwrap()
});

/// Resolution duration in seconds.
pub static RESOLUTION_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "pramen_resolution_duration_seconds",
            "Duration of stream resolutions",
        )
        .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]),
        &["media_type"],
    )
    .unwrap()
});

/// Queries generated per resolution.
pub static QUERIES_GENERATED: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "pramen_queries_generated",
            "Number of search queries generated per resolution",
        )
        .buckets(vec![1.0, 2.0, 3.0, 5.0, 10.0, 20.0]),
        &[],
    )
    .unwrap()
});

/// Candidate pool size per resolution, after merging and capping.
pub static CANDIDATES_FOUND: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "pramen_candidates_found",
            "Number of candidates found per resolution",
        )
        .buckets(vec![0.0, 1.0, 5.0, 10.0, 25.0, 50.0, 100.0, 150.0]),
        &[],
    )
    .unwrap()
});

/// Streams returned per resolution.
pub static STREAMS_RETURNED: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "pramen_streams_returned",
            "Number of streams returned per resolution",
        )
        .buckets(vec![0.0, 1.0, 5.0, 10.0, 20.0, 40.0, 60.0]),
        &[],
    )
    .unwrap()
});

// =============================================================================
// Index access
// =============================================================================

/// Index searches total by outcome ("ok", "error").
pub static SEARCHES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("pramen_searches_total", "Total index search requests"),
        &["outcome"],
    )
    .unwrap()
});

/// Detail page extractions by outcome ("ok", "none", "error").
pub static EXTRACTIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("pramen_extractions_total", "Total playback URL extractions"),
        &["outcome"],
    )
    .unwrap()
});

// =============================================================================
// Cache and metadata
// =============================================================================

/// Result cache lookups by kind ("search", "stream") and outcome ("hit", "miss").
pub static CACHE_LOOKUPS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("pramen_cache_lookups_total", "Total result cache lookups"),
        &["kind", "outcome"],
    )
    .unwrap()
});

/// Metadata lookups by status ("ok", "error").
pub static METADATA_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("pramen_metadata_requests_total", "Total metadata lookups"),
        &["status"],
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Pipeline
        Box::new(RESOLUTIONS_TOTAL.clone()),
        Box::new(RESOLUTION_DURATION.clone()),
        Box::new(QUERIES_GENERATED.clone()),
        Box::new(CANDIDATES_FOUND.clone()),
        Box::new(STREAMS_RETURNED.clone()),
        // Index access
        Box::new(SEARCHES_TOTAL.clone()),
        Box::new(EXTRACTIONS_TOTAL.clone()),
        // Cache and metadata
        Box::new(CACHE_LOOKUPS.clone()),
        Box::new(METADATA_REQUESTS.clone()),
    ]
}
