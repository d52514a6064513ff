// SPDX-FileCopyrightText: 2026 Remindr Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests for the complete reminder pipeline.
//!
//! Each test creates an isolated TestHarness with temp SQLite, a mock
//! calendar and a mock delivery provider. Tests are independent and
//! order-insensitive.

use chrono::NaiveDate;
use remindr_core::types::{ClientStatus, SessionStatus};
use remindr_engine::StepResult;
use remindr_test_utils::{MockCalendar, ScriptedResponse, TestHarness};

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()
}

fn salon_day() -> Vec<remindr_core::types::CalendarEvent> {
    vec![
        MockCalendar::event("a1", "Coupe | Alice Martin", Some("Tel: 06 12 34 56 71"), "2026-03-14T09:00:00+01:00"),
        MockCalendar::event("a2", "Bruno Petit - Barbe", Some("+33 6 12 34 56 72"), "2026-03-14T10:30:00+01:00"),
        MockCalendar::event("a3", "Couleur | Chloe Durand", Some("06.12.34.56.73"), "2026-03-14T14:00:00+01:00"),
        MockCalendar::event("a4", "Pause dejeuner", None, "2026-03-14T12:00:00+01:00"),
    ]
}

// ---- Full day: prepare, drain, summary, status, history ----

#[tokio::test]
async fn full_day_is_reminded_once_with_one_summary() {
    let harness = TestHarness::builder()
        .with_events(salon_day())
        .with_batch_size(2)
        .with_summary_to("+33699887766")
        .build()
        .await
        .unwrap();

    let prepared = harness.orchestrator.prepare(Some(day())).await.unwrap();
    assert_eq!(prepared.total_clients, 3);
    assert_eq!(prepared.skipped, 1);
    let session_id = prepared.session_id.unwrap();

    let first = harness.orchestrator.process(&session_id, None).await.unwrap();
    assert_eq!(first.processed, 2);
    assert!(!first.completed);
    assert!(!first.summary_sent);

    let second = harness.orchestrator.process(&session_id, None).await.unwrap();
    assert_eq!(second.processed, 1);
    assert!(second.completed);
    assert!(second.summary_sent);
    assert_eq!(second.stats.sent, 3);

    // Three reminders plus exactly one summary.
    let summaries = harness.provider.sent_to("+33699887766");
    assert_eq!(summaries.len(), 1);
    assert!(summaries[0].contains("Envoyés : 3"));
    assert_eq!(harness.provider.sent().len(), 4);

    // Re-invoking a drained session changes nothing.
    let again = harness.orchestrator.process(&session_id, None).await.unwrap();
    assert_eq!(again.processed, 0);
    assert!(!again.summary_sent);
    assert_eq!(harness.provider.sent().len(), 4);

    let view = harness.orchestrator.status(&session_id).await.unwrap();
    assert_eq!(view.session.status, SessionStatus::Completed);
    assert!(view.clients.iter().all(|c| c.status == ClientStatus::Sent));

    let history = harness
        .orchestrator
        .history(Some(SessionStatus::Completed), Some(day()), 1, 10)
        .await
        .unwrap();
    assert_eq!(history.total, 1);
    assert_eq!(history.sessions[0].id, session_id);
}

// ---- Step function drives a whole day ----

#[tokio::test]
async fn repeated_steps_drain_the_day() {
    let harness = TestHarness::builder()
        .with_events(salon_day())
        .with_batch_size(1)
        .build()
        .await
        .unwrap();

    let session_id = match harness.orchestrator.step(None, None, Some(day())).await.unwrap() {
        StepResult::Processed(p) => {
            assert_eq!(p.processed, 1);
            p.session_id
        }
        StepResult::NothingDue(_) => panic!("appointments were due"),
    };

    let mut completed = false;
    for _ in 0..5 {
        if let StepResult::Processed(p) = harness
            .orchestrator
            .step(Some(&session_id), None, None)
            .await
            .unwrap()
        {
            if p.completed {
                completed = true;
                break;
            }
        }
    }
    assert!(completed);
    assert_eq!(harness.provider.sent().len(), 3);

    // Same day again: everyone was already reminded.
    let rerun = harness.orchestrator.prepare(Some(day())).await.unwrap();
    assert!(rerun.completed);
    assert_eq!(rerun.already_reminded, 3);
}

// ---- Mixed outcomes ----

#[tokio::test]
async fn failures_are_recorded_and_never_block_the_batch() {
    let harness = TestHarness::builder()
        .with_events(salon_day())
        .with_batch_size(10)
        .build()
        .await
        .unwrap();
    harness.provider.respond_to(
        "+33612345672",
        ScriptedResponse::error_code("131026", "recipient not on platform"),
    );
    harness
        .provider
        .respond_to("+33612345673", ScriptedResponse::error("rate limited"));

    let session_id = harness
        .orchestrator
        .prepare(Some(day()))
        .await
        .unwrap()
        .session_id
        .unwrap();
    let result = harness.orchestrator.process(&session_id, None).await.unwrap();

    assert!(result.completed);
    assert_eq!(result.stats.sent, 1);
    assert_eq!(result.stats.error, 2);
    assert_eq!(result.processed, 3);

    let view = harness.orchestrator.status(&session_id).await.unwrap();
    let errored: Vec<_> = view
        .clients
        .iter()
        .filter(|c| c.status == ClientStatus::Error)
        .collect();
    assert_eq!(errored.len(), 2);
    assert!(errored.iter().all(|c| c.error_message.is_some()));
}

// ---- Title migration then discovery ----

#[tokio::test]
async fn migrated_titles_still_parse_for_discovery() {
    let harness = TestHarness::builder()
        .with_events(salon_day())
        .build()
        .await
        .unwrap();

    let report = harness.migrator.run(0, None).await.unwrap();
    assert_eq!(report.migrated, 1);
    assert_eq!(
        harness.calendar.title_of("a2").as_deref(),
        Some("Barbe | Bruno Petit")
    );

    let prepared = harness.orchestrator.prepare(Some(day())).await.unwrap();
    assert_eq!(prepared.total_clients, 3);
    let view = harness
        .orchestrator
        .status(prepared.session_id.as_deref().unwrap())
        .await
        .unwrap();
    assert!(view.clients.iter().any(|c| c.client_name == "Bruno Petit"));
}
