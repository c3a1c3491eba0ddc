// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Metrics instrumentation for pii-vault.
//!
//! Uses the `metrics` crate for backend-agnostic metrics collection.
//! The embedding application is responsible for choosing the exporter
//! (Prometheus, OTEL, etc.)
//!
//! # Metric Naming Convention
//! - `pii_vault_` prefix for all metrics
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Labels
//! - `tier`: memory, external, file
//! - `operation`: get, put
//! - `status`: hit, miss, success, error

use metrics::{counter, histogram};
use std::time::{Duration, Instant};

/// Record a store tier operation outcome.
pub fn record_store_operation(tier: &str, operation: &str, status: &str) {
    counter!(
        "pii_vault_store_operations_total",
        "tier" => tier.to_string(),
        "operation" => operation.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record a detected span by engine and entity type.
pub fn record_span_detected(engine: &str, entity_type: &str) {
    counter!(
        "pii_vault_spans_detected_total",
        "engine" => engine.to_string(),
        "entity_type" => entity_type.to_string()
    )
    .increment(1);
}

/// Record a per-call fallback from the model-backed detector to patterns.
pub fn record_detect_fallback() {
    counter!("pii_vault_detect_fallback_total").increment(1);
}

/// Record a decode failure left fail-open (token kept in output).
pub fn record_decode_failure(reason: &str) {
    counter!(
        "pii_vault_decode_failures_total",
        "reason" => reason.to_string()
    )
    .increment(1);
}

/// Record encode/decode pipeline latency.
pub fn record_pipeline_latency(operation: &str, duration: Duration) {
    histogram!(
        "pii_vault_pipeline_seconds",
        "operation" => operation.to_string()
    )
    .record(duration.as_secs_f64());
}

/// RAII timer that records pipeline latency on drop.
pub struct LatencyTimer {
    operation: &'static str,
    start: Instant,
}

impl LatencyTimer {
    #[must_use]
    pub fn new(operation: &'static str) -> Self {
        Self { operation, start: Instant::now() }
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        record_pipeline_latency(self.operation, self.start.elapsed());
    }
}
