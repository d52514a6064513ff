// SPDX-FileCopyrightText: 2026 Remindr Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Batch orchestrator for reminder sessions.
//!
//! Every call is a bounded, re-invokable step over state held in the
//! [`ReminderStore`]:
//!
//! - `prepare` discovers due appointments and creates a session with one
//!   pending client each (nothing is created when nothing is due).
//! - `process` sends the next batch of pending clients, one at a time with a
//!   fixed pause in between, and records each outcome.
//! - When a session has no pending clients left it is completed and the
//!   summary is claimed and sent once.
//!
//! A failure for one client is recorded on that client and never aborts the
//! batch. Failures while discovering or listing pending clients abort the
//! call without touching client rows.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDate};
use serde::Serialize;
use tracing::{debug, info, warn};

use remindr_config::RemindrConfig;
use remindr_core::types::{
    Capability, ClientOutcome, ClientStatus, ReminderClient, ReminderSession, SessionFilter,
    SessionStats, SessionStatus,
};
use remindr_core::{AppointmentSource, RemindrError, ReminderStore};
use remindr_delivery::{AttemptOptions, Executor};
use remindr_phone::{mask, normalize, Confidence, Region};
use remindr_prometheus::recording::record_session_event;

use crate::discovery::{discover, render_message};
use crate::summary::SummaryNotifier;

/// Largest page accepted by [`Orchestrator::history`].
pub const MAX_PER_PAGE: u32 = 100;

/// Tunables of the orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub batch_size: usize,
    pub inter_attempt_delay: Duration,
    pub days_ahead: u32,
    pub business_name: String,
    pub message_template: String,
    pub use_cache: bool,
}

impl OrchestratorConfig {
    pub fn from_config(config: &RemindrConfig) -> Self {
        Self {
            batch_size: config.reminders.batch_size,
            inter_attempt_delay: Duration::from_millis(config.delivery.inter_attempt_delay_ms),
            days_ahead: config.reminders.days_ahead,
            business_name: config.reminders.business_name.clone(),
            message_template: config.reminders.message_template.clone(),
            use_cache: config.cache.enabled,
        }
    }
}

/// Result of `prepare`.
#[derive(Debug, Clone, Serialize)]
pub struct PrepareResult {
    pub session_id: Option<String>,
    pub session_date: NaiveDate,
    pub total_clients: u32,
    pub skipped: u32,
    pub already_reminded: u32,
    /// True when nothing was due and no session was created.
    pub completed: bool,
}

/// What happened to one client in a batch.
#[derive(Debug, Clone, Serialize)]
pub struct ClientResult {
    pub client_id: String,
    pub client_name: String,
    /// Canonical phone, empty when normalization failed.
    pub phone: String,
    pub status: ClientStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capability: Option<Capability>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// Result of `process`.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessResult {
    pub session_id: String,
    /// Clients handled by this call.
    pub processed: u32,
    pub remaining: u32,
    pub stats: SessionStats,
    pub completed: bool,
    /// True only on the call that dispatched the summary.
    pub summary_sent: bool,
    pub results: Vec<ClientResult>,
}

/// Result of `step`.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum StepResult {
    NothingDue(PrepareResult),
    Processed(ProcessResult),
}

/// Read-only view of one session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub session: ReminderSession,
    pub stats: SessionStats,
    pub clients: Vec<ReminderClient>,
}

/// One page of session history.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryPage {
    pub sessions: Vec<ReminderSession>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
}

pub struct Orchestrator {
    store: Arc<dyn ReminderStore>,
    source: Arc<dyn AppointmentSource>,
    executor: Executor,
    summary: Option<SummaryNotifier>,
    home: &'static Region,
    config: OrchestratorConfig,
}

impl Orchestrator {
    pub fn new(
        store: Arc<dyn ReminderStore>,
        source: Arc<dyn AppointmentSource>,
        executor: Executor,
        home: &'static Region,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            store,
            source,
            executor,
            summary: None,
            home,
            config,
        }
    }

    pub fn with_summary(mut self, summary: Option<SummaryNotifier>) -> Self {
        self.summary = summary;
        self
    }

    /// Target date used when `prepare` is called without one.
    pub fn default_target_date(&self) -> NaiveDate {
        Local::now().date_naive() + chrono::Days::new(u64::from(self.config.days_ahead))
    }

    /// Discovers due appointments for `date` and opens a session for them.
    pub async fn prepare(&self, date: Option<NaiveDate>) -> Result<PrepareResult, RemindrError> {
        let date = date.unwrap_or_else(|| self.default_target_date());
        let discovery = discover(self.source.as_ref(), self.store.as_ref(), date).await?;

        let mut result = PrepareResult {
            session_id: None,
            session_date: date,
            total_clients: 0,
            skipped: discovery.skipped,
            already_reminded: discovery.already_reminded,
            completed: true,
        };
        if discovery.appointments.is_empty() {
            info!(%date, "no reminders due");
            return Ok(result);
        }

        let total = u32::try_from(discovery.appointments.len())
            .map_err(|_| RemindrError::Internal("too many appointments".into()))?;
        let session = ReminderSession::new(date, total);
        let clients: Vec<ReminderClient> = discovery
            .appointments
            .iter()
            .map(|appointment| ReminderClient {
                id: uuid::Uuid::new_v4().to_string(),
                session_id: session.id.clone(),
                appointment_id: appointment.appointment_id.clone(),
                client_name: appointment.client_name.clone(),
                phone_number: appointment.phone_number.clone(),
                appointment_time: appointment.start.to_rfc3339(),
                service_name: appointment.service_name.clone(),
                message: render_message(
                    &self.config.message_template,
                    appointment,
                    &self.config.business_name,
                ),
                status: ClientStatus::Pending,
                error_message: None,
                processed_at: None,
                created_at: session.created_at.clone(),
            })
            .collect();

        self.store.create_session(&session, &clients).await?;
        record_session_event("created");
        info!(session_id = %session.id, %date, total, "reminder session created");

        result.session_id = Some(session.id);
        result.total_clients = total;
        result.completed = false;
        Ok(result)
    }

    /// Sends the next batch of a session.
    ///
    /// `batch_size` overrides the configured size for this call.
    pub async fn process(
        &self,
        session_id: &str,
        batch_size: Option<usize>,
    ) -> Result<ProcessResult, RemindrError> {
        let session = self.load_session(session_id).await?;
        let batch_size = match batch_size {
            Some(0) => {
                return Err(RemindrError::InvalidInput(
                    "batch_size must be at least 1".into(),
                ));
            }
            Some(n) => n,
            None => self.config.batch_size,
        };

        let pending = self.store.pending_clients(&session.id).await?;
        if pending.is_empty() {
            debug!(session_id = %session.id, "session already drained");
            return self.drained(&session.id, 0, Vec::new()).await;
        }

        let mut results = Vec::with_capacity(batch_size.min(pending.len()));
        for (index, client) in pending.iter().take(batch_size).enumerate() {
            if index > 0 && !self.config.inter_attempt_delay.is_zero() {
                tokio::time::sleep(self.config.inter_attempt_delay).await;
            }
            results.push(self.process_client(client).await);
        }
        let processed = u32::try_from(results.len()).unwrap_or(u32::MAX);

        let stats = self.store.statistics(&session.id).await?;
        if stats.pending == 0 {
            record_session_event("drained");
            return self.drained(&session.id, processed, results).await;
        }

        info!(
            session_id = %session.id,
            processed,
            remaining = stats.pending,
            "batch processed"
        );
        Ok(ProcessResult {
            session_id: session.id,
            processed,
            remaining: stats.pending,
            stats,
            completed: false,
            summary_sent: false,
            results,
        })
    }

    /// Prepare when no session is given, then process one batch.
    pub async fn step(
        &self,
        session_id: Option<&str>,
        batch_size: Option<usize>,
        date: Option<NaiveDate>,
    ) -> Result<StepResult, RemindrError> {
        let session_id = match session_id {
            Some(id) => id.to_string(),
            None => {
                let prepared = self.prepare(date).await?;
                match prepared.session_id.clone() {
                    Some(id) => id,
                    None => return Ok(StepResult::NothingDue(prepared)),
                }
            }
        };
        self.process(&session_id, batch_size)
            .await
            .map(StepResult::Processed)
    }

    pub async fn status(&self, session_id: &str) -> Result<SessionView, RemindrError> {
        let session = self.load_session(session_id).await?;
        let stats = self.store.statistics(&session.id).await?;
        let clients = self.store.clients_for_session(&session.id).await?;
        Ok(SessionView {
            session,
            stats,
            clients,
        })
    }

    /// Sessions newest first. `page` is 1-based.
    pub async fn history(
        &self,
        status: Option<SessionStatus>,
        date: Option<NaiveDate>,
        page: u32,
        per_page: u32,
    ) -> Result<HistoryPage, RemindrError> {
        if page == 0 {
            return Err(RemindrError::InvalidInput("page starts at 1".into()));
        }
        if per_page == 0 || per_page > MAX_PER_PAGE {
            return Err(RemindrError::InvalidInput(format!(
                "per_page must be between 1 and {MAX_PER_PAGE}"
            )));
        }
        let filter = SessionFilter {
            status,
            date,
            limit: per_page,
            offset: (page - 1).saturating_mul(per_page),
        };
        let (sessions, total) = self.store.list_sessions(&filter).await?;
        Ok(HistoryPage {
            sessions,
            total,
            page,
            per_page,
        })
    }

    async fn load_session(&self, session_id: &str) -> Result<ReminderSession, RemindrError> {
        let session_id = session_id.trim();
        if session_id.is_empty() {
            return Err(RemindrError::InvalidInput("session_id is required".into()));
        }
        self.store
            .get_session(session_id)
            .await?
            .ok_or_else(|| RemindrError::NotFound {
                entity: "session",
                id: session_id.to_string(),
            })
    }

    /// Normalizes, delivers and records one client.
    async fn process_client(&self, client: &ReminderClient) -> ClientResult {
        let phone = normalize(&client.phone_number, self.home);
        let mut result = ClientResult {
            client_id: client.id.clone(),
            client_name: client.client_name.clone(),
            phone: phone.formatted.clone(),
            status: ClientStatus::Error,
            capability: None,
            error_message: None,
        };

        let outcome = if phone.is_empty() {
            ClientOutcome::Error(format!("invalid phone number: {:?}", client.phone_number))
        } else {
            if phone.confidence == Confidence::Low {
                warn!(
                    client_id = %client.id,
                    phone = %mask(&phone.formatted),
                    "phone region guessed with low confidence"
                );
            }
            let options = AttemptOptions {
                use_cache: self.config.use_cache,
            };
            let attempt = self
                .executor
                .deliver(&phone.formatted, &client.message, options)
                .await;
            result.capability = Some(attempt.capability);
            if attempt.delivered {
                ClientOutcome::Sent
            } else {
                ClientOutcome::Error(attempt.provider_response)
            }
        };

        match self.store.record_outcome(&client.id, &outcome).await {
            Ok(()) => {
                result.status = outcome.status();
                result.error_message = outcome.error_message().map(str::to_string);
            }
            // A concurrent run recorded this client first; its outcome stands.
            Err(RemindrError::IllegalTransition { from, .. }) => {
                debug!(client_id = %client.id, stored = %from, "client already recorded");
                result.status = from.parse().unwrap_or(ClientStatus::Error);
            }
            Err(e) => {
                warn!(client_id = %client.id, error = %e, "failed to record client outcome");
                result.error_message = Some(format!("outcome not recorded: {e}"));
            }
        }
        result
    }

    /// Completes a drained session and claims the one summary.
    async fn drained(
        &self,
        session_id: &str,
        processed: u32,
        results: Vec<ClientResult>,
    ) -> Result<ProcessResult, RemindrError> {
        self.store.mark_completed(session_id).await?;
        let stats = self.store.statistics(session_id).await?;

        let mut summary_sent = false;
        if let Some(notifier) = &self.summary
            && self.store.claim_summary(session_id).await?
        {
            if let Some(session) = self.store.get_session(session_id).await? {
                notifier.notify(&session, &stats).await;
                record_session_event("summary_sent");
                summary_sent = true;
            }
        }

        info!(session_id, sent = stats.sent, errors = stats.error, "session completed");
        Ok(ProcessResult {
            session_id: session_id.to_string(),
            processed,
            remaining: 0,
            stats,
            completed: true,
            summary_sent,
            results,
        })
    }
}
