// SPDX-FileCopyrightText: 2026 Remindr Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Completion digest sent to the operator when a session drains.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use remindr_config::model::SummaryConfig;
use remindr_core::types::{AttemptOutcome, ReminderSession, SessionStats, SessionStatus};
use remindr_delivery::{AttemptOptions, Executor};
use remindr_phone::{mask, normalize, Region};

pub struct SummaryNotifier {
    executor: Executor,
    recipient: String,
    use_cache: bool,
}

impl SummaryNotifier {
    pub fn new(executor: Executor, recipient: impl Into<String>, use_cache: bool) -> Self {
        Self {
            executor,
            recipient: recipient.into(),
            use_cache,
        }
    }

    /// Notifier for the `[summary]` section; `None` when disabled or when no
    /// recipient is configured.
    pub fn from_config(
        executor: Executor,
        config: &SummaryConfig,
        home: &'static Region,
    ) -> Option<Self> {
        if !config.enabled {
            return None;
        }
        let recipient = config.recipient.as_deref()?;
        let normalized = normalize(recipient, home);
        if normalized.is_empty() {
            warn!("summary.recipient holds no digits, summaries disabled");
            return None;
        }
        Some(Self::new(executor, normalized.formatted, config.use_cache))
    }

    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    /// Digest text for `session`.
    pub fn compose(session: &ReminderSession, stats: &SessionStats, at: DateTime<Utc>) -> String {
        let completed = if session.status == SessionStatus::Completed || stats.pending == 0 {
            "oui"
        } else {
            "non"
        };
        format!(
            "Rappels du {date}\n\
             Envoyés : {sent}\n\
             Erreurs : {error}\n\
             En attente : {pending}\n\
             Total : {total}\n\
             Terminé : {completed}\n\
             Généré le {at}",
            date = session.session_date.format("%d/%m/%Y"),
            sent = stats.sent,
            error = stats.error,
            pending = stats.pending,
            total = session.total_clients,
            at = at.format("%d/%m/%Y %H:%M UTC"),
        )
    }

    /// Sends the digest. Failures are logged and returned, never raised.
    pub async fn notify(&self, session: &ReminderSession, stats: &SessionStats) -> AttemptOutcome {
        let text = Self::compose(session, stats, Utc::now());
        let options = AttemptOptions {
            use_cache: self.use_cache,
        };
        let outcome = self.executor.deliver(&self.recipient, &text, options).await;
        if outcome.delivered {
            info!(session_id = %session.id, recipient = %mask(&self.recipient), "summary sent");
        } else {
            warn!(
                session_id = %session.id,
                recipient = %mask(&self.recipient),
                response = %outcome.provider_response,
                "summary not delivered"
            );
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use chrono::{NaiveDate, TimeZone};
    use remindr_delivery::VerificationCache;
    use remindr_test_utils::{MemoryCacheStore, MockDeliveryProvider, ScriptedResponse};

    fn executor(provider: Arc<MockDeliveryProvider>) -> Executor {
        Executor::new(
            provider,
            VerificationCache::new(Arc::new(MemoryCacheStore::new()), 7),
            Duration::from_secs(1),
            "131026",
        )
    }

    fn session() -> ReminderSession {
        let mut s = ReminderSession::new(NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(), 5);
        s.status = SessionStatus::Completed;
        s
    }

    #[test]
    fn digest_lists_every_count() {
        let stats = SessionStats { pending: 0, sent: 4, error: 1 };
        let at = Utc.with_ymd_and_hms(2026, 3, 13, 18, 5, 0).unwrap();
        let text = SummaryNotifier::compose(&session(), &stats, at);
        assert_eq!(
            text,
            "Rappels du 14/03/2026\nEnvoyés : 4\nErreurs : 1\nEn attente : 0\nTotal : 5\nTerminé : oui\nGénéré le 13/03/2026 18:05 UTC"
        );
    }

    #[test]
    fn disabled_or_unset_recipient_yields_none() {
        let provider = Arc::new(MockDeliveryProvider::new());
        let home = Region::from_code("FR").unwrap();
        let mut config = SummaryConfig {
            enabled: true,
            recipient: None,
            use_cache: true,
        };
        assert!(SummaryNotifier::from_config(executor(provider.clone()), &config, home).is_none());

        config.recipient = Some("06 12 34 56 78".into());
        let notifier = SummaryNotifier::from_config(executor(provider.clone()), &config, home).unwrap();
        assert_eq!(notifier.recipient(), "+33612345678");

        config.enabled = false;
        assert!(SummaryNotifier::from_config(executor(provider), &config, home).is_none());
    }

    #[tokio::test]
    async fn notify_goes_through_executor() {
        let provider = Arc::new(MockDeliveryProvider::new());
        let notifier = SummaryNotifier::new(executor(provider.clone()), "+33699999999", true);
        let stats = SessionStats { pending: 0, sent: 5, error: 0 };
        let outcome = notifier.notify(&session(), &stats).await;
        assert!(outcome.delivered);
        let sent = provider.sent_to("+33699999999");
        assert_eq!(sent.len(), 1);
        assert!(sent[0].contains("Envoyés : 5"));
    }

    #[tokio::test]
    async fn notify_failure_is_returned_not_raised() {
        let provider = Arc::new(MockDeliveryProvider::new());
        provider.respond_to("+33699999999", ScriptedResponse::error("provider down"));
        let notifier = SummaryNotifier::new(executor(provider), "+33699999999", true);
        let outcome = notifier
            .notify(&session(), &SessionStats::default())
            .await;
        assert!(!outcome.delivered);
    }
}
