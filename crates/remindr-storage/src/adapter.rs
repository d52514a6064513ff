// SPDX-FileCopyrightText: 2026 Remindr Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the store traits.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::OnceCell;
use tracing::debug;

use remindr_config::model::StorageConfig;
use remindr_core::types::{
    ClientOutcome, DeliveryStatusEntry, ReminderClient, ReminderSession, SessionFilter,
    SessionStats,
};
use remindr_core::{
    AdapterType, DeliveryCacheStore, HealthStatus, PluginAdapter, ReminderStore, RemindrError,
};

use crate::database::Database;
use crate::queries;

/// SQLite-backed reminder and cache store.
///
/// The database is opened lazily by [`SqliteStore::initialize`], or up front
/// with [`SqliteStore::open`].
pub struct SqliteStore {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStore {
    /// Create a store; the connection is not opened until [`initialize`](Self::initialize).
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Create and initialize a store in one step.
    pub async fn open(config: StorageConfig) -> Result<Self, RemindrError> {
        let store = Self::new(config);
        store.initialize().await?;
        Ok(store)
    }

    /// Opens the database and runs migrations.
    pub async fn initialize(&self) -> Result<(), RemindrError> {
        let db = Database::open_with(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| RemindrError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite store initialized");
        Ok(())
    }

    fn db(&self) -> Result<&Database, RemindrError> {
        self.db.get().ok_or_else(|| RemindrError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl PluginAdapter for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, RemindrError> {
        let Ok(db) = self.db() else {
            return Ok(HealthStatus::Unhealthy("not initialized".to_string()));
        };
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), RemindrError> {
        if let Some(db) = self.db.get() {
            db.close().await?;
        }
        Ok(())
    }
}

#[async_trait]
impl ReminderStore for SqliteStore {
    async fn create_session(
        &self,
        session: &ReminderSession,
        clients: &[ReminderClient],
    ) -> Result<(), RemindrError> {
        queries::sessions::create_session_with_clients(self.db()?, session, clients).await
    }

    async fn get_session(&self, id: &str) -> Result<Option<ReminderSession>, RemindrError> {
        queries::sessions::get_session(self.db()?, id).await
    }

    async fn list_sessions(
        &self,
        filter: &SessionFilter,
    ) -> Result<(Vec<ReminderSession>, u64), RemindrError> {
        queries::sessions::list_sessions(self.db()?, filter).await
    }

    async fn pending_clients(&self, session_id: &str) -> Result<Vec<ReminderClient>, RemindrError> {
        queries::clients::pending_clients(self.db()?, session_id).await
    }

    async fn clients_for_session(
        &self,
        session_id: &str,
    ) -> Result<Vec<ReminderClient>, RemindrError> {
        queries::clients::clients_for_session(self.db()?, session_id).await
    }

    async fn statistics(&self, session_id: &str) -> Result<SessionStats, RemindrError> {
        queries::clients::statistics(self.db()?, session_id).await
    }

    async fn record_outcome(
        &self,
        client_id: &str,
        outcome: &ClientOutcome,
    ) -> Result<(), RemindrError> {
        queries::clients::record_outcome(self.db()?, client_id, outcome).await
    }

    async fn mark_completed(&self, session_id: &str) -> Result<(), RemindrError> {
        queries::sessions::mark_completed(self.db()?, session_id).await
    }

    async fn claim_summary(&self, session_id: &str) -> Result<bool, RemindrError> {
        queries::sessions::claim_summary(self.db()?, session_id).await
    }

    async fn reminded_appointment_ids(
        &self,
        date: NaiveDate,
    ) -> Result<HashSet<String>, RemindrError> {
        queries::clients::reminded_appointment_ids(self.db()?, date).await
    }
}

#[async_trait]
impl DeliveryCacheStore for SqliteStore {
    async fn get_entry(&self, phone: &str) -> Result<Option<DeliveryStatusEntry>, RemindrError> {
        queries::delivery_cache::get_entry(self.db()?, phone).await
    }

    async fn upsert_entry(&self, entry: &DeliveryStatusEntry) -> Result<(), RemindrError> {
        queries::delivery_cache::upsert_entry(self.db()?, entry).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn make_config(path: &str) -> StorageConfig {
        StorageConfig {
            database_path: path.to_string(),
            wal_mode: true,
        }
    }

    #[tokio::test]
    async fn uninitialized_store_reports_unhealthy_and_errors() {
        let store = SqliteStore::new(make_config("/unused.db"));
        assert!(matches!(
            store.health_check().await.unwrap(),
            HealthStatus::Unhealthy(_)
        ));
        assert!(store.get_session("x").await.is_err());
        store.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn open_store_is_healthy_and_usable() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.db");
        let store = SqliteStore::open(make_config(path.to_str().unwrap()))
            .await
            .unwrap();
        assert_eq!(store.name(), "sqlite");
        assert_eq!(store.adapter_type(), AdapterType::Storage);
        assert_eq!(store.health_check().await.unwrap(), HealthStatus::Healthy);

        let session = ReminderSession::new(NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(), 0);
        store.create_session(&session, &[]).await.unwrap();
        assert!(store.get_session(&session.id).await.unwrap().is_some());
        assert!(store.get_entry("+33612345678").await.unwrap().is_none());

        store.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn double_initialize_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("twice.db");
        let store = SqliteStore::open(make_config(path.to_str().unwrap()))
            .await
            .unwrap();
        assert!(store.initialize().await.is_err());
    }
}
