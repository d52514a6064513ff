// SPDX-FileCopyrightText: 2026 Remindr Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reminder engine: appointment discovery, the batch orchestrator, the
//! completion summary and the calendar title migration job.

pub mod discovery;
pub mod migration;
pub mod orchestrator;
pub mod summary;
pub mod title;

pub use discovery::{discover, extract_phone, parse_title, render_message, Discovery};
pub use migration::{MigrationReport, RetryPolicy, TitleMigrator};
pub use orchestrator::{
    ClientResult, HistoryPage, Orchestrator, OrchestratorConfig, PrepareResult, ProcessResult,
    SessionView, StepResult,
};
pub use summary::SummaryNotifier;
