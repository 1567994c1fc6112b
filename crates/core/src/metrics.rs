//! Prometheus metrics for a collection run.
//!
//! - Model queries (count by stage/result, duration, tokens)
//! - Cache hits per stage
//! - Detail files written and cost breakdowns that could not be computed

use once_cell::sync::Lazy;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};

/// Registry holding every collector metric.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    for metric in all_metrics() {
        if let Err(e) = registry.register(metric) {
            tracing::warn!("Failed to register metric: {}", e);
        }
    }
    registry
});

/// Model queries by stage and result.
pub static MODEL_QUERIES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("carscout_model_queries_total", "Total model queries"),
        &["stage", "result"], // result: "ok", "query_error", "unparseable"
    )
    .unwrap()
});

/// Model query duration in seconds.
pub static MODEL_QUERY_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "carscout_model_query_duration_seconds",
            "Duration of model queries",
        )
        .buckets(vec![0.5, 1.0, 2.5, 5.0, 10.0, 20.0, 30.0, 60.0, 120.0]),
        &["stage"],
    )
    .unwrap()
});

/// Tokens consumed.
pub static LLM_TOKENS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("carscout_llm_tokens_total", "Total LLM tokens used"),
        &["provider", "direction"], // direction: "input", "output"
    )
    .unwrap()
});

/// Units of work satisfied from the cache.
pub static CACHE_HITS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("carscout_cache_hits_total", "Units of work already cached"),
        &["stage"],
    )
    .unwrap()
});

/// Units of work skipped under the skip failure policy.
pub static UNITS_SKIPPED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("carscout_units_skipped_total", "Failed units left for the next run"),
        &["stage"],
    )
    .unwrap()
});

pub static DETAIL_FILES_WRITTEN: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "carscout_detail_files_written_total",
        "Model-year detail files written",
    )
    .unwrap()
});

pub static COST_FAILURES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "carscout_cost_failures_total",
        "Badge records whose cost breakdown could not be computed",
    )
    .unwrap()
});

pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(MODEL_QUERIES.clone()),
        Box::new(MODEL_QUERY_DURATION.clone()),
        Box::new(LLM_TOKENS.clone()),
        Box::new(CACHE_HITS.clone()),
        Box::new(UNITS_SKIPPED.clone()),
        Box::new(DETAIL_FILES_WRITTEN.clone()),
        Box::new(COST_FAILURES.clone()),
    ]
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&REGISTRY.gather(), &mut buffer) {
        tracing::warn!("Failed to encode metrics: {}", e);
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
