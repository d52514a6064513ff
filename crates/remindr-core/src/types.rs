// SPDX-FileCopyrightText: 2026 Remindr Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across adapter traits and the reminder engine.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize, Serializer};
use strum::{Display, EnumString};

use crate::error::RemindrError;

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter behind a trait object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Delivery,
    Calendar,
    Storage,
    Observability,
}

// --- Lifecycle states ---

/// Lifecycle of a reminder session.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Processing,
    Completed,
}

impl SessionStatus {
    /// Validate a status change. `processing -> completed` is the only move;
    /// re-observing the current status is a no-op.
    pub fn transition(self, to: SessionStatus) -> Result<SessionStatus, RemindrError> {
        match (self, to) {
            (a, b) if a == b => Ok(b),
            (SessionStatus::Processing, SessionStatus::Completed) => Ok(to),
            _ => Err(RemindrError::IllegalTransition {
                entity: "session",
                from: self.to_string(),
                to: to.to_string(),
            }),
        }
    }
}

/// Lifecycle of a single recipient within a session.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ClientStatus {
    Pending,
    Sent,
    Error,
}

impl ClientStatus {
    /// `sent` and `error` are terminal.
    pub fn is_terminal(self) -> bool {
        !matches!(self, ClientStatus::Pending)
    }

    /// Validate a status change. Only `pending -> sent | error` is legal, and only once.
    pub fn transition(self, to: ClientStatus) -> Result<ClientStatus, RemindrError> {
        match (self, to) {
            (ClientStatus::Pending, ClientStatus::Sent | ClientStatus::Error) => Ok(to),
            _ => Err(RemindrError::IllegalTransition {
                entity: "client",
                from: self.to_string(),
                to: to.to_string(),
            }),
        }
    }
}

// --- Session / client records ---

/// One discovery-to-completion run of the reminder job for a target date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReminderSession {
    pub id: String,
    pub session_date: NaiveDate,
    pub status: SessionStatus,
    pub total_clients: u32,
    pub processed_clients: u32,
    pub success_count: u32,
    pub error_count: u32,
    /// Set once when the completion digest has been dispatched.
    pub summary_sent_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl ReminderSession {
    /// A fresh `processing` session expecting `total_clients` recipients.
    pub fn new(session_date: NaiveDate, total_clients: u32) -> Self {
        let now = now_rfc3339();
        Self {
            id: uuid_v4(),
            session_date,
            status: SessionStatus::Processing,
            total_clients,
            processed_clients: 0,
            success_count: 0,
            error_count: 0,
            summary_sent_at: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Recipients not yet processed according to the counters.
    pub fn remaining(&self) -> u32 {
        self.total_clients.saturating_sub(self.processed_clients)
    }
}

/// One recipient's reminder task within a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReminderClient {
    pub id: String,
    pub session_id: String,
    /// Identifier of the calendar event this reminder was created from.
    pub appointment_id: String,
    pub client_name: String,
    /// Raw phone number as captured from the appointment, before normalization.
    pub phone_number: String,
    /// Appointment start, RFC 3339.
    pub appointment_time: String,
    pub service_name: String,
    /// Fully rendered reminder text.
    pub message: String,
    pub status: ClientStatus,
    pub error_message: Option<String>,
    pub processed_at: Option<String>,
    pub created_at: String,
}

/// Terminal result recorded for one client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientOutcome {
    Sent,
    Error(String),
}

impl ClientOutcome {
    pub fn status(&self) -> ClientStatus {
        match self {
            ClientOutcome::Sent => ClientStatus::Sent,
            ClientOutcome::Error(_) => ClientStatus::Error,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            ClientOutcome::Sent => None,
            ClientOutcome::Error(msg) => Some(msg),
        }
    }
}

/// Per-status client counts, computed by scanning current statuses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub pending: u32,
    pub sent: u32,
    pub error: u32,
}

impl SessionStats {
    pub fn total(&self) -> u32 {
        self.pending + self.sent + self.error
    }
}

/// Filter and page for session history queries.
#[derive(Debug, Clone, Default)]
pub struct SessionFilter {
    pub status: Option<SessionStatus>,
    pub date: Option<NaiveDate>,
    pub limit: u32,
    pub offset: u32,
}

// --- Delivery verification ---

/// Cached answer to "can this identifier receive a rich message".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryStatusEntry {
    /// Canonical international form; unique key.
    pub phone_number: String,
    pub has_capability: bool,
    pub last_checked: DateTime<Utc>,
    pub last_error_code: Option<String>,
}

impl DeliveryStatusEntry {
    /// Whether the entry is still inside the freshness window at `now`.
    pub fn is_fresh(&self, now: DateTime<Utc>, window: chrono::Duration) -> bool {
        now.signed_duration_since(self.last_checked) < window
    }
}

/// Destination capability as classified from one provider interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Capable,
    Incapable,
    /// The interaction gave no reliable signal (auth, rate limit, timeout, outage).
    Indeterminate,
}

impl Serialize for Capability {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Capability::Capable => serializer.serialize_bool(true),
            Capability::Incapable => serializer.serialize_bool(false),
            Capability::Indeterminate => serializer.serialize_str("indeterminate"),
        }
    }
}

/// Result of one probe or send through the delivery executor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttemptOutcome {
    pub delivered: bool,
    pub capability: Capability,
    pub provider_response: String,
}

/// Raw success answer from the delivery provider.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProviderReceipt {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(skip)]
    pub raw: String,
}

// --- Calendar ---

/// An event as returned by the calendar / appointment source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

/// One page of calendar events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventPage {
    pub events: Vec<CalendarEvent>,
    #[serde(default)]
    pub has_more: bool,
}

/// A due appointment extracted from a calendar event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    /// Id of the source calendar event.
    pub appointment_id: String,
    pub client_name: String,
    pub service_name: String,
    /// Phone number as written in the event description.
    pub phone_number: String,
    pub start: DateTime<FixedOffset>,
}

/// Current UTC time formatted the way every stored timestamp is.
pub fn now_rfc3339() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

fn uuid_v4() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn client_status_moves_from_pending_exactly_once() {
        assert_eq!(
            ClientStatus::Pending.transition(ClientStatus::Sent).unwrap(),
            ClientStatus::Sent
        );
        assert_eq!(
            ClientStatus::Pending.transition(ClientStatus::Error).unwrap(),
            ClientStatus::Error
        );
        assert!(ClientStatus::Sent.transition(ClientStatus::Error).is_err());
        assert!(ClientStatus::Error.transition(ClientStatus::Sent).is_err());
        assert!(ClientStatus::Sent.transition(ClientStatus::Sent).is_err());
        assert!(ClientStatus::Pending.transition(ClientStatus::Pending).is_err());
    }

    #[test]
    fn session_status_never_reopens() {
        assert!(SessionStatus::Processing
            .transition(SessionStatus::Completed)
            .is_ok());
        assert!(SessionStatus::Completed
            .transition(SessionStatus::Completed)
            .is_ok());
        let err = SessionStatus::Completed
            .transition(SessionStatus::Processing)
            .unwrap_err();
        assert!(matches!(err, RemindrError::IllegalTransition { entity: "session", .. }));
    }

    #[test]
    fn statuses_round_trip_through_strings() {
        assert_eq!(ClientStatus::Pending.to_string(), "pending");
        assert_eq!(ClientStatus::from_str("error").unwrap(), ClientStatus::Error);
        assert_eq!(SessionStatus::Completed.to_string(), "completed");
        assert_eq!(
            SessionStatus::from_str("processing").unwrap(),
            SessionStatus::Processing
        );
        assert!(ClientStatus::from_str("delivered").is_err());
    }

    #[test]
    fn capability_serializes_as_tri_state() {
        assert_eq!(serde_json::to_string(&Capability::Capable).unwrap(), "true");
        assert_eq!(serde_json::to_string(&Capability::Incapable).unwrap(), "false");
        assert_eq!(
            serde_json::to_string(&Capability::Indeterminate).unwrap(),
            "\"indeterminate\""
        );
    }

    #[test]
    fn entry_expires_after_window() {
        let now = Utc::now();
        let entry = DeliveryStatusEntry {
            phone_number: "+33612345678".into(),
            has_capability: true,
            last_checked: now - chrono::Duration::days(8),
            last_error_code: None,
        };
        assert!(!entry.is_fresh(now, chrono::Duration::days(7)));
        let recent = DeliveryStatusEntry {
            last_checked: now - chrono::Duration::days(6),
            ..entry
        };
        assert!(recent.is_fresh(now, chrono::Duration::days(7)));
    }

    #[test]
    fn new_session_starts_processing_with_zero_counters() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        let session = ReminderSession::new(date, 5);
        assert_eq!(session.status, SessionStatus::Processing);
        assert_eq!(session.remaining(), 5);
        assert_eq!(session.processed_clients, 0);
        assert!(session.summary_sent_at.is_none());
        assert_eq!(session.id.len(), 36);
    }

    #[test]
    fn outcome_maps_to_terminal_status() {
        assert_eq!(ClientOutcome::Sent.status(), ClientStatus::Sent);
        let err = ClientOutcome::Error("boom".into());
        assert_eq!(err.status(), ClientStatus::Error);
        assert_eq!(err.error_message(), Some("boom"));
    }
}
