// SPDX-FileCopyrightText: 2026 Remindr Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prometheus metrics for the remindr reminder engine.
//!
//! Uses the metrics-rs facade with the Prometheus exporter. The rendered
//! text is served by the gateway's `/metrics` endpoint.

pub mod recording;

use async_trait::async_trait;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use remindr_core::types::{AdapterType, HealthStatus};
use remindr_core::{PluginAdapter, RemindrError};

pub use recording::{
    record_attempt, record_cache_lookup, record_cache_write, record_migration_item,
    record_session_event,
};

/// Prometheus metrics adapter.
///
/// Installs the Prometheus recorder globally and keeps the handle used to
/// render the exposition text.
pub struct PrometheusAdapter {
    handle: PrometheusHandle,
}

impl PrometheusAdapter {
    /// Installs the recorder. Only one recorder can exist per process; a
    /// second call fails.
    pub fn new() -> Result<Self, RemindrError> {
        let handle = PrometheusBuilder::new().install_recorder().map_err(|e| {
            RemindrError::Internal(format!("failed to install Prometheus recorder: {e}"))
        })?;

        recording::register_metrics();
        tracing::info!("prometheus metrics recorder installed");

        Ok(Self { handle })
    }

    pub fn handle(&self) -> &PrometheusHandle {
        &self.handle
    }

    /// Render all collected metrics in Prometheus text format.
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

#[async_trait]
impl PluginAdapter for PrometheusAdapter {
    fn name(&self) -> &str {
        "prometheus"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Observability
    }

    async fn health_check(&self) -> Result<HealthStatus, RemindrError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), RemindrError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    // The global recorder can be installed once per process, so these tests
    // record into a local one.
    fn render_with(f: impl FnOnce()) -> String {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        metrics::with_local_recorder(&recorder, f);
        handle.render()
    }

    #[test]
    fn attempts_are_labelled_by_kind_and_outcome() {
        let text = render_with(|| {
            record_attempt("send", "delivered", Duration::from_millis(120));
            record_attempt("send", "delivered", Duration::from_millis(80));
            record_attempt("probe", "incapable", Duration::from_millis(30));
        });
        assert!(text.contains(r#"remindr_attempts_total{kind="send",outcome="delivered"} 2"#));
        assert!(text.contains(r#"remindr_attempts_total{kind="probe",outcome="incapable"} 1"#));
        assert!(text.contains("remindr_attempt_latency_seconds"));
    }

    #[test]
    fn cache_session_and_migration_counters() {
        let text = render_with(|| {
            record_cache_lookup("hit");
            record_cache_write("unavailable");
            record_session_event("created");
            record_migration_item("failed");
        });
        assert!(text.contains(r#"remindr_cache_lookups_total{result="hit"} 1"#));
        assert!(text.contains(r#"remindr_cache_writes_total{result="unavailable"} 1"#));
        assert!(text.contains(r#"remindr_sessions_total{event="created"} 1"#));
        assert!(text.contains(r#"remindr_migration_items_total{outcome="failed"} 1"#));
    }
}
