// SPDX-FileCopyrightText: 2026 Remindr Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Delivery capability cache rows.
//!
//! Raw storage only: freshness is decided by the caller.

use remindr_core::RemindrError;
use rusqlite::{params, OptionalExtension};

use crate::database::{map_tr_err, Database};
use crate::models::{cache_entry_from_row, DeliveryStatusEntry};

/// Looks up the entry for a canonical phone number.
pub async fn get_entry(
    db: &Database,
    phone: &str,
) -> Result<Option<DeliveryStatusEntry>, RemindrError> {
    let phone = phone.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT phone_number, has_capability, last_checked, last_error_code
                 FROM delivery_status_cache WHERE phone_number = ?1",
                params![phone],
                cache_entry_from_row,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Inserts or overwrites the entry for its phone number. Last write wins.
pub async fn upsert_entry(db: &Database, entry: &DeliveryStatusEntry) -> Result<(), RemindrError> {
    let entry = entry.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO delivery_status_cache
                     (phone_number, has_capability, last_checked, last_error_code)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(phone_number) DO UPDATE SET
                     has_capability = excluded.has_capability,
                     last_checked = excluded.last_checked,
                     last_error_code = excluded.last_error_code",
                params![
                    entry.phone_number,
                    entry.has_capability,
                    entry.last_checked.to_rfc3339(),
                    entry.last_error_code,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, SubsecRound, Utc};
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("cache.db").to_str().unwrap())
            .await
            .unwrap();
        (db, dir)
    }

    #[tokio::test]
    async fn missing_entry_is_none() {
        let (db, _dir) = setup_db().await;
        assert!(get_entry(&db, "+33612345678").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn upsert_then_overwrite() {
        let (db, _dir) = setup_db().await;
        let checked = Utc::now().trunc_subsecs(0) - Duration::days(2);
        let entry = DeliveryStatusEntry {
            phone_number: "+33612345678".into(),
            has_capability: true,
            last_checked: checked,
            last_error_code: None,
        };
        upsert_entry(&db, &entry).await.unwrap();
        assert_eq!(get_entry(&db, &entry.phone_number).await.unwrap(), Some(entry.clone()));

        let negative = DeliveryStatusEntry {
            has_capability: false,
            last_checked: checked + Duration::days(1),
            last_error_code: Some("131026".into()),
            ..entry
        };
        upsert_entry(&db, &negative).await.unwrap();
        let stored = get_entry(&db, "+33612345678").await.unwrap().unwrap();
        assert!(!stored.has_capability);
        assert_eq!(stored.last_error_code.as_deref(), Some("131026"));
        assert_eq!(stored.last_checked, negative.last_checked);
    }
}
