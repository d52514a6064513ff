// SPDX-FileCopyrightText: 2026 Remindr Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for remindr integration tests.
//!
//! Provides mock collaborators and a test harness for fast, deterministic
//! tests without a messaging provider or calendar service.
//!
//! # Components
//!
//! - [`MockDeliveryProvider`] - scripted delivery answers with send capture
//! - [`MockCalendar`] - in-memory calendar with scripted update failures
//! - [`MemoryCacheStore`] - in-memory delivery cache that can be made to fail
//! - [`TestHarness`] - temp SQLite store wired to an orchestrator

pub mod harness;
pub mod memory_cache;
pub mod mock_calendar;
pub mod mock_delivery;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use memory_cache::MemoryCacheStore;
pub use mock_calendar::MockCalendar;
pub use mock_delivery::{MockDeliveryProvider, ScriptedResponse};
