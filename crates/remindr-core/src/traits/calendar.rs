// SPDX-FileCopyrightText: 2026 Remindr Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Calendar-facing traits: the read-only appointment source and the
//! paginated event listing used by title migration.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::RemindrError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{CalendarEvent, EventPage};

/// Read-only pull interface returning the appointments of one date.
#[async_trait]
pub trait AppointmentSource: PluginAdapter {
    async fn appointments_on(&self, date: NaiveDate) -> Result<Vec<CalendarEvent>, RemindrError>;
}

/// Paginated event access with title rewrite.
#[async_trait]
pub trait CalendarProvider: PluginAdapter {
    /// Lists events starting at `offset`, at most `limit` of them.
    async fn list_events(&self, offset: usize, limit: usize) -> Result<EventPage, RemindrError>;

    /// Replaces the title of one event.
    async fn update_title(&self, event_id: &str, title: &str) -> Result<(), RemindrError>;
}
