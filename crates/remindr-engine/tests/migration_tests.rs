// SPDX-FileCopyrightText: 2026 Remindr Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Title migration job against the mock calendar.

use std::time::Duration;

use remindr_core::RemindrError;
use remindr_test_utils::{MockCalendar, TestHarness};

fn seeded() -> Vec<remindr_core::types::CalendarEvent> {
    vec![
        MockCalendar::event("e1", "Alice - Coupe", None, "2026-03-14T09:00:00+01:00"),
        MockCalendar::event("e2", "Soin | Bob", None, "2026-03-14T10:00:00+01:00"),
        MockCalendar::event("e3", "Chloe - Couleur", None, "2026-03-14T11:00:00+01:00"),
        MockCalendar::event("e4", "Fermeture", None, "2026-03-14T12:00:00+01:00"),
    ]
}

#[tokio::test]
async fn legacy_titles_are_rewritten_and_rerun_is_a_no_op() {
    let harness = TestHarness::builder()
        .with_events(seeded())
        .build()
        .await
        .unwrap();

    let report = harness.migrator.run(0, None).await.unwrap();
    assert_eq!(report.scanned, 4);
    assert_eq!(report.migrated, 2);
    assert_eq!(report.skipped, 2);
    assert!(report.failed.is_empty());
    assert_eq!(report.next_offset, 4);
    assert!(!report.has_more);
    assert_eq!(harness.calendar.title_of("e1").as_deref(), Some("Coupe | Alice"));
    assert_eq!(harness.calendar.title_of("e3").as_deref(), Some("Couleur | Chloe"));

    let rerun = harness.migrator.run(0, None).await.unwrap();
    assert_eq!(rerun.migrated, 0);
    assert_eq!(rerun.skipped, 4);
    assert_eq!(harness.calendar.update_attempts("e1"), 1);
}

#[tokio::test]
async fn transient_failures_are_retried_within_budget() {
    let harness = TestHarness::builder()
        .with_events(seeded())
        .with_migration_attempts(3)
        .build()
        .await
        .unwrap();
    harness.calendar.fail_updates("e1", 2);
    harness.calendar.fail_updates("e3", 10);

    let report = harness.migrator.run(0, None).await.unwrap();
    assert_eq!(report.migrated, 1);
    assert_eq!(harness.calendar.update_attempts("e1"), 3);
    assert_eq!(harness.calendar.title_of("e1").as_deref(), Some("Coupe | Alice"));

    // Exhausted item is reported, the job carried on.
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].event_id, "e3");
    assert_eq!(report.failed[0].attempts, 3);
    assert_eq!(harness.calendar.update_attempts("e3"), 3);
    assert_eq!(harness.calendar.title_of("e3").as_deref(), Some("Chloe - Couleur"));
}

#[tokio::test]
async fn hung_update_is_cut_by_attempt_timeout() {
    let harness = TestHarness::builder()
        .with_events(seeded())
        .with_attempt_timeout(Duration::from_millis(50))
        .with_migration_attempts(2)
        .build()
        .await
        .unwrap();
    harness.calendar.hang_updates("e1");

    let report = harness.migrator.run(0, None).await.unwrap();
    assert_eq!(report.failed.len(), 1);
    assert!(report.failed[0].error.contains("timed out"));
    assert_eq!(report.migrated, 1);
}

#[tokio::test]
async fn pages_resume_from_next_offset() {
    let harness = TestHarness::builder()
        .with_events(seeded())
        .build()
        .await
        .unwrap();

    let first = harness.migrator.run(0, Some(2)).await.unwrap();
    assert_eq!(first.scanned, 2);
    assert_eq!(first.next_offset, 2);
    assert!(first.has_more);

    let second = harness.migrator.run(first.next_offset, Some(2)).await.unwrap();
    assert_eq!(second.scanned, 2);
    assert_eq!(second.migrated, 1);
    assert!(!second.has_more);
}

#[tokio::test]
async fn listing_failure_is_returned_whole() {
    let harness = TestHarness::builder()
        .with_events(seeded())
        .build()
        .await
        .unwrap();
    harness.calendar.set_unavailable(true);
    let err = harness.migrator.run(0, None).await.unwrap_err();
    assert!(matches!(err, RemindrError::Calendar { .. }));

    harness.calendar.set_unavailable(false);
    let err = harness.migrator.run(0, Some(0)).await.unwrap_err();
    assert_eq!(err.status_code(), 400);
}
