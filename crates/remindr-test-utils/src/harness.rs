// SPDX-FileCopyrightText: 2026 Remindr Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` wires a temp SQLite store, a mock calendar and a mock
//! delivery provider into a real orchestrator and title migrator.

use std::sync::Arc;
use std::time::Duration;

use remindr_config::model::StorageConfig;
use remindr_config::BackoffKind;
use remindr_core::types::CalendarEvent;
use remindr_core::RemindrError;
use remindr_delivery::{Executor, VerificationCache};
use remindr_engine::{
    Orchestrator, OrchestratorConfig, RetryPolicy, SummaryNotifier, TitleMigrator,
};
use remindr_phone::Region;
use remindr_storage::SqliteStore;

use crate::mock_calendar::MockCalendar;
use crate::mock_delivery::MockDeliveryProvider;

/// Template used by harness sessions.
pub const TEST_TEMPLATE: &str = "Bonjour {client_name}, rappel {service} le {date} a {time}.";

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    events: Vec<CalendarEvent>,
    batch_size: usize,
    summary_recipient: Option<String>,
    use_cache: bool,
    attempt_timeout: Duration,
    inter_attempt_delay: Duration,
    migration_attempts: u32,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            events: Vec::new(),
            batch_size: 3,
            summary_recipient: None,
            use_cache: true,
            attempt_timeout: Duration::from_secs(2),
            inter_attempt_delay: Duration::ZERO,
            migration_attempts: 3,
        }
    }

    /// Seed the mock calendar.
    pub fn with_events(mut self, events: Vec<CalendarEvent>) -> Self {
        self.events = events;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Enable the completion summary to `recipient` (canonical form).
    pub fn with_summary_to(mut self, recipient: &str) -> Self {
        self.summary_recipient = Some(recipient.to_string());
        self
    }

    pub fn without_cache(mut self) -> Self {
        self.use_cache = false;
        self
    }

    /// Timeout applied to delivery calls and title updates.
    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    /// Pause between consecutive sends of a batch.
    pub fn with_inter_attempt_delay(mut self, delay: Duration) -> Self {
        self.inter_attempt_delay = delay;
        self
    }

    pub fn with_migration_attempts(mut self, attempts: u32) -> Self {
        self.migration_attempts = attempts;
        self
    }

    /// Build the test harness, creating all required subsystems.
    pub async fn build(self) -> Result<TestHarness, RemindrError> {
        let temp_dir =
            tempfile::TempDir::new().map_err(|e| RemindrError::Storage { source: e.into() })?;
        let db_path = temp_dir.path().join("test.db");

        let store = Arc::new(
            SqliteStore::open(StorageConfig {
                database_path: db_path.to_string_lossy().to_string(),
                wal_mode: true,
            })
            .await?,
        );

        let provider = Arc::new(MockDeliveryProvider::new());
        let calendar = Arc::new(MockCalendar::with_events(self.events));
        let home = Region::from_code("FR")
            .ok_or_else(|| RemindrError::Config("unknown home region FR".into()))?;

        let executor = Executor::new(
            provider.clone(),
            VerificationCache::new(store.clone(), 7),
            self.attempt_timeout,
            "131026",
        );
        let summary = self
            .summary_recipient
            .map(|recipient| SummaryNotifier::new(executor.clone(), recipient, true));

        let orchestrator = Orchestrator::new(
            store.clone(),
            calendar.clone(),
            executor,
            home,
            OrchestratorConfig {
                batch_size: self.batch_size,
                inter_attempt_delay: self.inter_attempt_delay,
                days_ahead: 1,
                business_name: "Salon Test".to_string(),
                message_template: TEST_TEMPLATE.to_string(),
                use_cache: self.use_cache,
            },
        )
        .with_summary(summary);

        let migrator = TitleMigrator::new(
            calendar.clone(),
            RetryPolicy {
                max_attempts: self.migration_attempts,
                base_delay: Duration::from_millis(1),
                backoff: BackoffKind::Linear,
                attempt_timeout: self.attempt_timeout,
            },
            50,
        );

        Ok(TestHarness {
            provider,
            calendar,
            store,
            orchestrator: Arc::new(orchestrator),
            migrator: Arc::new(migrator),
            _temp_dir: temp_dir,
        })
    }
}

/// A complete test environment with mock collaborators and temp storage.
pub struct TestHarness {
    pub provider: Arc<MockDeliveryProvider>,
    pub calendar: Arc<MockCalendar>,
    /// SQLite store (temp DB, cleaned up on drop). Also backs the cache.
    pub store: Arc<SqliteStore>,
    pub orchestrator: Arc<Orchestrator>,
    pub migrator: Arc<TitleMigrator>,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn harness_builds_with_empty_calendar() {
        let harness = TestHarness::builder().build().await.unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        let prepared = harness.orchestrator.prepare(Some(date)).await.unwrap();
        assert!(prepared.completed);
        assert!(prepared.session_id.is_none());
    }

    #[tokio::test]
    async fn harness_seeds_calendar() {
        let harness = TestHarness::builder()
            .with_events(vec![MockCalendar::event(
                "e1",
                "Coupe | Alice",
                Some("06 12 34 56 78"),
                "2026-03-14T09:00:00+01:00",
            )])
            .build()
            .await
            .unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        let prepared = harness.orchestrator.prepare(Some(date)).await.unwrap();
        assert_eq!(prepared.total_clients, 1);
    }
}
