// SPDX-FileCopyrightText: 2026 Remindr Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reminder client operations and the derived per-session queries.

use std::collections::HashSet;

use chrono::NaiveDate;
use remindr_core::types::{now_rfc3339, ClientOutcome, SessionStats};
use remindr_core::RemindrError;
use rusqlite::{params, OptionalExtension};

use crate::database::{map_tr_err, Database};
use crate::models::{client_from_row, ClientStatus, ReminderClient, CLIENT_COLUMNS, DATE_FORMAT};

/// Pending clients of a session, in creation order.
pub async fn pending_clients(
    db: &Database,
    session_id: &str,
) -> Result<Vec<ReminderClient>, RemindrError> {
    select_clients(db, session_id, true).await
}

/// Every client of a session, in creation order.
pub async fn clients_for_session(
    db: &Database,
    session_id: &str,
) -> Result<Vec<ReminderClient>, RemindrError> {
    select_clients(db, session_id, false).await
}

async fn select_clients(
    db: &Database,
    session_id: &str,
    pending_only: bool,
) -> Result<Vec<ReminderClient>, RemindrError> {
    let session_id = session_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {CLIENT_COLUMNS} FROM reminder_clients
                 WHERE session_id = ?1 AND (?2 = 0 OR status = 'pending')
                 ORDER BY seq ASC"
            ))?;
            stmt.query_map(params![session_id, pending_only], client_from_row)?
                .collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

/// Counts clients per status by scanning the current rows.
pub async fn statistics(db: &Database, session_id: &str) -> Result<SessionStats, RemindrError> {
    let session_id = session_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT status, COUNT(*) FROM reminder_clients
                 WHERE session_id = ?1 GROUP BY status",
            )?;
            let rows = stmt.query_map(params![session_id], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, u32>(1)?))
            })?;
            let mut stats = SessionStats::default();
            for row in rows {
                let (status, count) = row?;
                match status.parse::<ClientStatus>() {
                    Ok(ClientStatus::Pending) => stats.pending = count,
                    Ok(ClientStatus::Sent) => stats.sent = count,
                    Ok(ClientStatus::Error) => stats.error = count,
                    Err(_) => tracing::warn!(%status, "ignoring unknown client status"),
                }
            }
            Ok(stats)
        })
        .await
        .map_err(map_tr_err)
}

/// Moves a client out of `pending` and advances its session's counters.
///
/// Runs in one transaction. The client update is conditional on
/// `status = 'pending'` and the counters only move if it hit a row, so
/// `processed_clients == success_count + error_count` holds whatever the
/// interleaving. The session flips to `completed` once every client is processed.
pub async fn record_outcome(
    db: &Database,
    client_id: &str,
    outcome: &ClientOutcome,
) -> Result<(), RemindrError> {
    let client_id = client_id.to_string();
    let target = outcome.status();
    let error_message = outcome.error_message().map(str::to_string);
    let (sent, errored) = match target {
        ClientStatus::Sent => (1, 0),
        _ => (0, 1),
    };
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let row: Option<(String, String)> = tx
                .query_row(
                    "SELECT status, session_id FROM reminder_clients WHERE id = ?1",
                    params![client_id],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?;
            let Some((current, session_id)) = row else {
                return Ok(Err(RemindrError::NotFound {
                    entity: "client",
                    id: client_id,
                }));
            };
            let current = match current.parse::<ClientStatus>() {
                Ok(status) => status,
                Err(e) => return Ok(Err(RemindrError::Internal(format!("bad client status: {e}")))),
            };
            if let Err(e) = current.transition(target) {
                return Ok(Err(e));
            }

            let now = now_rfc3339();
            let changed = tx.execute(
                "UPDATE reminder_clients SET status = ?1, error_message = ?2, processed_at = ?3
                 WHERE id = ?4 AND status = 'pending'",
                params![target.to_string(), error_message, now, client_id],
            )?;
            if changed == 1 {
                tx.execute(
                    "UPDATE reminder_sessions SET
                         processed_clients = processed_clients + 1,
                         success_count = success_count + ?1,
                         error_count = error_count + ?2,
                         status = CASE WHEN processed_clients + 1 >= total_clients
                                       THEN 'completed' ELSE status END,
                         updated_at = ?3
                     WHERE id = ?4",
                    params![sent, errored, now, session_id],
                )?;
            }
            tx.commit()?;
            Ok(Ok(()))
        })
        .await
        .map_err(map_tr_err)?
}

/// Appointment ids that already have a client row in a session for `date`.
pub async fn reminded_appointment_ids(
    db: &Database,
    date: NaiveDate,
) -> Result<HashSet<String>, RemindrError> {
    let date = date.format(DATE_FORMAT).to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT DISTINCT c.appointment_id FROM reminder_clients c
                 JOIN reminder_sessions s ON s.id = c.session_id
                 WHERE s.session_date = ?1",
            )?;
            stmt.query_map(params![date], |row| row.get(0))?
                .collect::<Result<HashSet<String>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ReminderSession, SessionStatus};
    use crate::queries::sessions::{create_session_with_clients, get_session};
    use tempfile::tempdir;

    async fn setup() -> (Database, tempfile::TempDir, ReminderSession, Vec<ReminderClient>) {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("test.db").to_str().unwrap())
            .await
            .unwrap();
        let session = ReminderSession::new(NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(), 3);
        let clients: Vec<_> = (1..=3)
            .map(|n| ReminderClient {
                id: format!("c{n}"),
                session_id: session.id.clone(),
                appointment_id: format!("evt-{n}"),
                client_name: format!("Client {n}"),
                phone_number: format!("06123456{n:02}"),
                appointment_time: format!("2026-03-14T{:02}:00:00+01:00", 9 + n),
                service_name: "Épilation".to_string(),
                message: format!("Bonjour Client {n}"),
                status: ClientStatus::Pending,
                error_message: None,
                processed_at: None,
                created_at: now_rfc3339(),
            })
            .collect();
        create_session_with_clients(&db, &session, &clients).await.unwrap();
        (db, dir, session, clients)
    }

    #[tokio::test]
    async fn pending_clients_keep_creation_order() {
        let (db, _dir, session, _) = setup().await;
        let pending = pending_clients(&db, &session.id).await.unwrap();
        let ids: Vec<_> = pending.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["c1", "c2", "c3"]);
    }

    #[tokio::test]
    async fn record_outcome_advances_counters() {
        let (db, _dir, session, _) = setup().await;
        record_outcome(&db, "c1", &ClientOutcome::Sent).await.unwrap();
        record_outcome(&db, "c2", &ClientOutcome::Error("unreachable".into()))
            .await
            .unwrap();

        let stored = get_session(&db, &session.id).await.unwrap().unwrap();
        assert_eq!(stored.processed_clients, 2);
        assert_eq!(stored.success_count, 1);
        assert_eq!(stored.error_count, 1);
        assert_eq!(stored.status, SessionStatus::Processing);

        let pending = pending_clients(&db, &session.id).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, "c3");

        let all = clients_for_session(&db, &session.id).await.unwrap();
        assert_eq!(all[1].status, ClientStatus::Error);
        assert_eq!(all[1].error_message.as_deref(), Some("unreachable"));
        assert!(all[1].processed_at.is_some());
        assert!(all[0].error_message.is_none());
    }

    #[tokio::test]
    async fn last_outcome_completes_session() {
        let (db, _dir, session, _) = setup().await;
        for id in ["c1", "c2", "c3"] {
            record_outcome(&db, id, &ClientOutcome::Sent).await.unwrap();
        }
        let stored = get_session(&db, &session.id).await.unwrap().unwrap();
        assert_eq!(stored.status, SessionStatus::Completed);
        assert_eq!(stored.processed_clients, 3);
    }

    #[tokio::test]
    async fn terminal_client_is_never_recounted() {
        let (db, _dir, session, _) = setup().await;
        record_outcome(&db, "c1", &ClientOutcome::Sent).await.unwrap();
        let err = record_outcome(&db, "c1", &ClientOutcome::Error("late".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, RemindrError::IllegalTransition { entity: "client", .. }));

        let stored = get_session(&db, &session.id).await.unwrap().unwrap();
        assert_eq!(stored.processed_clients, 1);
        assert_eq!(stored.success_count, 1);
        assert_eq!(stored.error_count, 0);
    }

    #[tokio::test]
    async fn unknown_client_is_not_found() {
        let (db, _dir, _, _) = setup().await;
        let err = record_outcome(&db, "ghost", &ClientOutcome::Sent).await.unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn statistics_scan_current_statuses() {
        let (db, _dir, session, _) = setup().await;
        record_outcome(&db, "c2", &ClientOutcome::Error("x".into())).await.unwrap();
        let stats = statistics(&db, &session.id).await.unwrap();
        assert_eq!(stats, SessionStats { pending: 2, sent: 0, error: 1 });
        assert_eq!(stats.total(), 3);

        let empty = statistics(&db, "missing").await.unwrap();
        assert_eq!(empty, SessionStats::default());
    }

    #[tokio::test]
    async fn reminded_ids_are_scoped_to_date() {
        let (db, _dir, _, _) = setup().await;
        let same_day = reminded_appointment_ids(&db, NaiveDate::from_ymd_opt(2026, 3, 14).unwrap())
            .await
            .unwrap();
        assert_eq!(same_day.len(), 3);
        assert!(same_day.contains("evt-2"));

        let other_day = reminded_appointment_ids(&db, NaiveDate::from_ymd_opt(2026, 3, 15).unwrap())
            .await
            .unwrap();
        assert!(other_day.is_empty());
    }
}
