// SPDX-FileCopyrightText: 2026 Remindr Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Calendar title migration job.
//!
//! Pages through calendar events and rewrites legacy titles to the current
//! format. Each rewrite is retried a bounded number of times with a pause
//! between attempts and a hard timeout per attempt. An item that exhausts
//! its retries is reported and the job moves on. Already migrated titles are
//! skipped, so the job can be re-run from any offset.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};

use remindr_config::model::MigrationConfig;
use remindr_config::BackoffKind;
use remindr_core::{CalendarProvider, RemindrError};
use remindr_prometheus::recording::record_migration_item;

use crate::title::migrate_title;

/// Bounded retry schedule for one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub backoff: BackoffKind,
    pub attempt_timeout: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &MigrationConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: Duration::from_millis(config.backoff_ms),
            backoff: config.backoff,
            attempt_timeout: Duration::from_secs(config.attempt_timeout_secs),
        }
    }

    /// Pause after failed attempt number `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = match self.backoff {
            BackoffKind::Linear => attempt,
            BackoffKind::Exponential => 2u32.saturating_pow(attempt.saturating_sub(1)),
        };
        self.base_delay.saturating_mul(factor)
    }
}

/// An item that could not be migrated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedItem {
    pub event_id: String,
    pub title: String,
    pub attempts: u32,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    pub scanned: u32,
    pub migrated: u32,
    pub skipped: u32,
    pub failed: Vec<FailedItem>,
    /// Offset to resume from.
    pub next_offset: usize,
    pub has_more: bool,
}

pub struct TitleMigrator {
    calendar: Arc<dyn CalendarProvider>,
    policy: RetryPolicy,
    page_size: usize,
}

impl TitleMigrator {
    pub fn new(calendar: Arc<dyn CalendarProvider>, policy: RetryPolicy, page_size: usize) -> Self {
        Self {
            calendar,
            policy,
            page_size: page_size.max(1),
        }
    }

    pub fn from_config(calendar: Arc<dyn CalendarProvider>, config: &MigrationConfig) -> Self {
        Self::new(calendar, RetryPolicy::from_config(config), config.page_size)
    }

    /// Migrates one page of events starting at `offset`.
    ///
    /// `limit` overrides the configured page size. A failed listing is
    /// returned as an error; per-item failures land in the report.
    pub async fn run(
        &self,
        offset: usize,
        limit: Option<usize>,
    ) -> Result<MigrationReport, RemindrError> {
        let limit = match limit {
            Some(0) => return Err(RemindrError::InvalidInput("limit must be at least 1".into())),
            Some(n) => n,
            None => self.page_size,
        };
        let page = self.calendar.list_events(offset, limit).await?;

        let mut report = MigrationReport {
            next_offset: offset + page.events.len(),
            has_more: page.has_more,
            ..MigrationReport::default()
        };

        for event in &page.events {
            report.scanned += 1;
            let Some(new_title) = migrate_title(&event.title) else {
                debug!(event_id = %event.id, "title already current");
                report.skipped += 1;
                record_migration_item("skipped");
                continue;
            };

            match self.update_with_retry(&event.id, &new_title).await {
                Ok(()) => {
                    report.migrated += 1;
                    record_migration_item("migrated");
                }
                Err((attempts, error)) => {
                    warn!(event_id = %event.id, attempts, %error, "title migration failed");
                    record_migration_item("failed");
                    report.failed.push(FailedItem {
                        event_id: event.id.clone(),
                        title: event.title.clone(),
                        attempts,
                        error: error.to_string(),
                    });
                }
            }
        }

        info!(
            offset,
            scanned = report.scanned,
            migrated = report.migrated,
            skipped = report.skipped,
            failed = report.failed.len(),
            has_more = report.has_more,
            "title migration page done"
        );
        Ok(report)
    }

    async fn update_with_retry(
        &self,
        event_id: &str,
        title: &str,
    ) -> Result<(), (u32, RemindrError)> {
        let mut attempt = 1;
        loop {
            let result = match tokio::time::timeout(
                self.policy.attempt_timeout,
                self.calendar.update_title(event_id, title),
            )
            .await
            {
                Ok(result) => result,
                Err(_) => Err(RemindrError::Timeout {
                    duration: self.policy.attempt_timeout,
                }),
            };

            match result {
                Ok(()) => return Ok(()),
                Err(e) if attempt >= self.policy.max_attempts => return Err((attempt, e)),
                Err(e) => {
                    let delay = self.policy.delay_for(attempt);
                    debug!(event_id, attempt, ?delay, error = %e, "retrying title update");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
