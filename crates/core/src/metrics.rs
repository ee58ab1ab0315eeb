//! Prometheus metrics for the conversion workflow.
//!
//! The library only records; hosts register [`all_metrics`] in their own
//! registry and expose it however they like.

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts};

// =============================================================================
// Conversion Metrics
// =============================================================================

/// Conversions total by category, target format and result.
pub static CONVERSIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("mediaconv_conversions_total", "Total file conversions"),
        &["category", "format", "result"], // result: "success", "failed", "superseded"
    )
    .unwrap()
});

/// Conversion requests that were skipped, by reason.
pub static CONVERSIONS_SKIPPED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "mediaconv_conversions_skipped_total",
            "Convert requests ignored without invoking the transcoder",
        ),
        &["reason"], // "missing_input", "in_flight", "not_selecting"
    )
    .unwrap()
});

/// Conversion duration in seconds.
pub static CONVERSION_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "mediaconv_conversion_duration_seconds",
            "Duration of file conversions",
        )
        .buckets(vec![0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 300.0, 1800.0]),
        &["category"],
    )
    .unwrap()
});

// =============================================================================
// Download Metrics
// =============================================================================

/// Downloads total by result.
pub static DOWNLOADS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("mediaconv_downloads_total", "Total artifact downloads"),
        &["result"], // "exposed", "delivered", "failed", "unavailable"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(CONVERSIONS_TOTAL.clone()),
        Box::new(CONVERSIONS_SKIPPED.clone()),
        Box::new(CONVERSION_DURATION.clone()),
        Box::new(DOWNLOADS_TOTAL.clone()),
    ]
}
