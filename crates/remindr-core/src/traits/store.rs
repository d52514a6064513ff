// SPDX-FileCopyrightText: 2026 Remindr Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence traits for session/client state and the delivery cache.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::RemindrError;
use crate::types::{
    ClientOutcome, DeliveryStatusEntry, ReminderClient, ReminderSession, SessionFilter,
    SessionStats,
};

/// Durable record of reminder sessions and their clients.
///
/// Sole owner of session and client rows.
#[async_trait]
pub trait ReminderStore: Send + Sync {
    /// Creates a session together with its `pending` clients.
    async fn create_session(
        &self,
        session: &ReminderSession,
        clients: &[ReminderClient],
    ) -> Result<(), RemindrError>;

    async fn get_session(&self, id: &str) -> Result<Option<ReminderSession>, RemindrError>;

    /// Sessions matching `filter`, newest first, plus the total match count.
    async fn list_sessions(
        &self,
        filter: &SessionFilter,
    ) -> Result<(Vec<ReminderSession>, u64), RemindrError>;

    /// Pending clients of a session in creation order.
    async fn pending_clients(&self, session_id: &str) -> Result<Vec<ReminderClient>, RemindrError>;

    /// All clients of a session in creation order.
    async fn clients_for_session(
        &self,
        session_id: &str,
    ) -> Result<Vec<ReminderClient>, RemindrError>;

    /// Status counts computed from the current client rows.
    async fn statistics(&self, session_id: &str) -> Result<SessionStats, RemindrError>;

    /// Moves a client out of `pending` and advances the session counters.
    ///
    /// Fails with [`RemindrError::IllegalTransition`] when the client is
    /// already terminal; counters are untouched in that case.
    async fn record_outcome(
        &self,
        client_id: &str,
        outcome: &ClientOutcome,
    ) -> Result<(), RemindrError>;

    /// Marks the session `completed`.
    async fn mark_completed(&self, session_id: &str) -> Result<(), RemindrError>;

    /// Claims the one-time summary dispatch. Returns `false` if already claimed.
    async fn claim_summary(&self, session_id: &str) -> Result<bool, RemindrError>;

    /// Appointment ids that already have a client row for `date`.
    async fn reminded_appointment_ids(
        &self,
        date: NaiveDate,
    ) -> Result<HashSet<String>, RemindrError>;
}

/// Keyed storage for delivery capability entries. Sole owner of cache rows.
#[async_trait]
pub trait DeliveryCacheStore: Send + Sync {
    /// Raw lookup; freshness is the caller's policy.
    async fn get_entry(&self, phone: &str) -> Result<Option<DeliveryStatusEntry>, RemindrError>;

    /// Insert or overwrite the entry keyed by its phone number.
    async fn upsert_entry(&self, entry: &DeliveryStatusEntry) -> Result<(), RemindrError>;
}
