// SPDX-FileCopyrightText: 2026 Remindr Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric registration and recording helpers.
//!
//! Uses the metrics-rs facade; without an installed recorder every call is a no-op.

use std::time::Duration;

use metrics::{describe_counter, describe_histogram};

/// Register all remindr metric descriptions.
///
/// Called once at startup after the recorder is installed.
pub fn register_metrics() {
    describe_counter!(
        "remindr_attempts_total",
        "Delivery provider calls by kind (probe, send) and outcome"
    );
    describe_counter!(
        "remindr_cache_lookups_total",
        "Capability cache lookups by result (hit, stale, miss, error)"
    );
    describe_counter!(
        "remindr_cache_writes_total",
        "Capability cache writes by result (cached, unavailable)"
    );
    describe_counter!(
        "remindr_sessions_total",
        "Reminder session lifecycle events"
    );
    describe_counter!(
        "remindr_migration_items_total",
        "Title migration items by outcome"
    );
    describe_histogram!(
        "remindr_attempt_latency_seconds",
        "Delivery provider call latency in seconds"
    );
}

/// Record one provider call. `kind` is `probe` or `send`; `outcome` is
/// `delivered`, `capable`, `incapable` or `indeterminate`.
pub fn record_attempt(kind: &'static str, outcome: &'static str, latency: Duration) {
    metrics::counter!("remindr_attempts_total", "kind" => kind, "outcome" => outcome).increment(1);
    metrics::histogram!("remindr_attempt_latency_seconds", "kind" => kind)
        .record(latency.as_secs_f64());
}

pub fn record_cache_lookup(result: &'static str) {
    metrics::counter!("remindr_cache_lookups_total", "result" => result).increment(1);
}

pub fn record_cache_write(result: &'static str) {
    metrics::counter!("remindr_cache_writes_total", "result" => result).increment(1);
}

/// Record a session event: `created`, `drained` or `summary_sent`.
pub fn record_session_event(event: &'static str) {
    metrics::counter!("remindr_sessions_total", "event" => event).increment(1);
}

/// Record one migration item: `migrated`, `skipped` or `failed`.
pub fn record_migration_item(outcome: &'static str) {
    metrics::counter!("remindr_migration_items_total", "outcome" => outcome).increment(1);
}
