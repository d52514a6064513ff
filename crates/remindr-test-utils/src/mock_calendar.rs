// SPDX-FileCopyrightText: 2026 Remindr Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory calendar implementing both calendar traits.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate};

use remindr_core::types::{AdapterType, CalendarEvent, EventPage, HealthStatus};
use remindr_core::{AppointmentSource, CalendarProvider, PluginAdapter, RemindrError};

#[derive(Default)]
struct State {
    events: Vec<CalendarEvent>,
    /// Remaining forced failures per event id.
    update_failures: HashMap<String, u32>,
    hanging: Vec<String>,
    update_calls: Vec<String>,
}

#[derive(Default)]
pub struct MockCalendar {
    state: Mutex<State>,
    unavailable: AtomicBool,
}

impl MockCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_events(events: Vec<CalendarEvent>) -> Self {
        let calendar = Self::new();
        calendar.lock().events = events;
        calendar
    }

    /// Builds a one-hour event starting at `start` (RFC 3339).
    ///
    /// Panics on a malformed timestamp; test input only.
    pub fn event(id: &str, title: &str, description: Option<&str>, start: &str) -> CalendarEvent {
        let start = DateTime::parse_from_rfc3339(start)
            .unwrap_or_else(|e| panic!("bad test timestamp {start}: {e}"));
        CalendarEvent {
            id: id.to_string(),
            title: title.to_string(),
            description: description.map(str::to_string),
            start,
            end: start + Duration::hours(1),
        }
    }

    pub fn add_event(&self, event: CalendarEvent) {
        self.lock().events.push(event);
    }

    /// Makes every call fail with a calendar error.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// The next `times` title updates of `event_id` fail.
    pub fn fail_updates(&self, event_id: &str, times: u32) {
        self.lock()
            .update_failures
            .insert(event_id.to_string(), times);
    }

    /// Title updates of `event_id` never complete.
    pub fn hang_updates(&self, event_id: &str) {
        self.lock().hanging.push(event_id.to_string());
    }

    pub fn title_of(&self, event_id: &str) -> Option<String> {
        self.lock()
            .events
            .iter()
            .find(|e| e.id == event_id)
            .map(|e| e.title.clone())
    }

    /// Number of update attempts made for `event_id`.
    pub fn update_attempts(&self, event_id: &str) -> usize {
        self.lock()
            .update_calls
            .iter()
            .filter(|id| *id == event_id)
            .count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check(&self) -> Result<(), RemindrError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RemindrError::Calendar {
                message: "calendar unavailable".into(),
                source: None,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl PluginAdapter for MockCalendar {
    fn name(&self) -> &str {
        "mock-calendar"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Calendar
    }

    async fn health_check(&self) -> Result<HealthStatus, RemindrError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), RemindrError> {
        Ok(())
    }
}

#[async_trait]
impl AppointmentSource for MockCalendar {
    async fn appointments_on(&self, date: NaiveDate) -> Result<Vec<CalendarEvent>, RemindrError> {
        self.check()?;
        Ok(self
            .lock()
            .events
            .iter()
            .filter(|e| e.start.date_naive() == date)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CalendarProvider for MockCalendar {
    async fn list_events(&self, offset: usize, limit: usize) -> Result<EventPage, RemindrError> {
        self.check()?;
        let state = self.lock();
        let events: Vec<_> = state.events.iter().skip(offset).take(limit).cloned().collect();
        Ok(EventPage {
            has_more: offset + events.len() < state.events.len(),
            events,
        })
    }

    async fn update_title(&self, event_id: &str, title: &str) -> Result<(), RemindrError> {
        self.check()?;
        let hang = {
            let mut state = self.lock();
            state.update_calls.push(event_id.to_string());
            if let Some(left) = state.update_failures.get_mut(event_id)
                && *left > 0
            {
                *left -= 1;
                return Err(RemindrError::Calendar {
                    message: format!("update of {event_id} rejected"),
                    source: None,
                });
            }
            let hang = state.hanging.iter().any(|id| id == event_id);
            if !hang {
                match state.events.iter_mut().find(|e| e.id == event_id) {
                    Some(event) => event.title = title.to_string(),
                    None => {
                        return Err(RemindrError::NotFound {
                            entity: "event",
                            id: event_id.to_string(),
                        });
                    }
                }
            }
            hang
        };
        if hang {
            std::future::pending::<()>().await;
        }
        Ok(())
    }
}
