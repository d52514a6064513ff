// SPDX-FileCopyrightText: 2026 Remindr Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wires configuration into the storage, collaborators and engine.
//!
//! Shared by `remindr serve` and the one-shot subcommands so both run the
//! exact same engine.

use std::sync::Arc;

use remindr_calendar::HttpCalendar;
use remindr_config::model::RemindrConfig;
use remindr_core::{PluginAdapter, RemindrError};
use remindr_delivery::{Executor, HttpDeliveryProvider, VerificationCache};
use remindr_engine::{Orchestrator, OrchestratorConfig, SummaryNotifier, TitleMigrator};
use remindr_phone::Region;
use remindr_storage::SqliteStore;
use tracing::{info, warn};

/// Engine components built from one configuration.
pub struct App {
    pub store: Arc<SqliteStore>,
    pub orchestrator: Arc<Orchestrator>,
    pub migrator: Arc<TitleMigrator>,
}

impl App {
    /// Opens the database and builds both HTTP collaborators.
    ///
    /// Missing delivery or calendar settings surface here as
    /// [`RemindrError::Config`].
    pub async fn build(config: &RemindrConfig) -> Result<Self, RemindrError> {
        let home = home_region(config)?;

        let store = Arc::new(SqliteStore::open(config.storage.clone()).await?);
        let provider = Arc::new(HttpDeliveryProvider::from_config(&config.delivery)?);
        let calendar = Arc::new(HttpCalendar::from_config(&config.calendar)?);

        let cache = VerificationCache::new(store.clone(), config.cache.freshness_days);
        let executor = Executor::from_config(provider, cache, &config.delivery);

        let summary = SummaryNotifier::from_config(executor.clone(), &config.summary, home);
        match &summary {
            Some(notifier) => info!(
                recipient = %remindr_phone::mask(notifier.recipient()),
                "session summaries enabled"
            ),
            None if config.summary.enabled => {
                warn!("summary enabled but no usable recipient configured, summaries disabled");
            }
            None => {}
        }

        let orchestrator = Orchestrator::new(
            store.clone(),
            calendar.clone(),
            executor,
            home,
            OrchestratorConfig::from_config(config),
        )
        .with_summary(summary);
        let migrator = TitleMigrator::from_config(calendar, &config.migration);

        Ok(Self {
            store,
            orchestrator: Arc::new(orchestrator),
            migrator: Arc::new(migrator),
        })
    }

    /// Closes the database connection.
    pub async fn close(&self) -> Result<(), RemindrError> {
        self.store.shutdown().await
    }
}

/// Resolves `phone.home_region`.
pub fn home_region(config: &RemindrConfig) -> Result<&'static Region, RemindrError> {
    Region::from_code(&config.phone.home_region).ok_or_else(|| {
        RemindrError::Config(format!(
            "unknown phone.home_region {:?}",
            config.phone.home_region
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_in(dir: &tempfile::TempDir) -> RemindrConfig {
        let mut config = RemindrConfig::default();
        config.storage.database_path = dir.path().join("app.db").to_string_lossy().to_string();
        config
    }

    #[tokio::test]
    async fn missing_delivery_settings_are_config_errors() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(&dir);
        let err = App::build(&config).await.err().unwrap();
        assert!(matches!(err, RemindrError::Config(_)), "got: {err}");
    }

    #[tokio::test]
    async fn full_settings_build_the_engine() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(&dir);
        config.delivery.base_url = Some("http://127.0.0.1:9".into());
        config.delivery.api_token = Some("token".into());
        config.calendar.base_url = Some("http://127.0.0.1:9".into());

        let app = App::build(&config).await.unwrap();
        let history = app.orchestrator.history(None, None, 1, 10).await.unwrap();
        assert_eq!(history.total, 0);
        app.close().await.unwrap();
    }

    #[test]
    fn unknown_region_is_rejected() {
        let mut config = RemindrConfig::default();
        config.phone.home_region = "ZZ".into();
        assert!(home_region(&config).is_err());
    }
}
