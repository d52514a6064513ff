// SPDX-FileCopyrightText: 2026 Remindr Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reminder session operations.

use remindr_core::types::{now_rfc3339, SessionFilter};
use remindr_core::RemindrError;
use rusqlite::{params, OptionalExtension};

use crate::database::{map_tr_err, Database};
use crate::models::{
    session_from_row, ReminderClient, ReminderSession, SessionStatus, DATE_FORMAT,
    SESSION_COLUMNS,
};

/// Inserts a session and all of its clients in one transaction.
pub async fn create_session_with_clients(
    db: &Database,
    session: &ReminderSession,
    clients: &[ReminderClient],
) -> Result<(), RemindrError> {
    let session = session.clone();
    let clients = clients.to_vec();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO reminder_sessions (id, session_date, status, total_clients,
                     processed_clients, success_count, error_count, summary_sent_at,
                     created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    session.id,
                    session.session_date.format(DATE_FORMAT).to_string(),
                    session.status.to_string(),
                    session.total_clients,
                    session.processed_clients,
                    session.success_count,
                    session.error_count,
                    session.summary_sent_at,
                    session.created_at,
                    session.updated_at,
                ],
            )?;
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO reminder_clients (id, seq, session_id, appointment_id,
                         client_name, phone_number, appointment_time, service_name, message,
                         status, error_message, processed_at, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                )?;
                for (seq, client) in clients.iter().enumerate() {
                    stmt.execute(params![
                        client.id,
                        seq as i64,
                        session.id,
                        client.appointment_id,
                        client.client_name,
                        client.phone_number,
                        client.appointment_time,
                        client.service_name,
                        client.message,
                        client.status.to_string(),
                        client.error_message,
                        client.processed_at,
                        client.created_at,
                    ])?;
                }
            }
            tx.commit()?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Get a session by ID.
pub async fn get_session(db: &Database, id: &str) -> Result<Option<ReminderSession>, RemindrError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!("SELECT {SESSION_COLUMNS} FROM reminder_sessions WHERE id = ?1"),
                params![id],
                session_from_row,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Sessions matching `filter`, newest first, with the total number of matches.
pub async fn list_sessions(
    db: &Database,
    filter: &SessionFilter,
) -> Result<(Vec<ReminderSession>, u64), RemindrError> {
    let status = filter.status.map(|s| s.to_string());
    let date = filter.date.map(|d| d.format(DATE_FORMAT).to_string());
    let limit = i64::from(filter.limit);
    let offset = i64::from(filter.offset);
    db.connection()
        .call(move |conn| {
            let total: i64 = conn.query_row(
                "SELECT COUNT(*) FROM reminder_sessions
                 WHERE (?1 IS NULL OR status = ?1) AND (?2 IS NULL OR session_date = ?2)",
                params![status, date],
                |row| row.get(0),
            )?;

            let mut stmt = conn.prepare(&format!(
                "SELECT {SESSION_COLUMNS} FROM reminder_sessions
                 WHERE (?1 IS NULL OR status = ?1) AND (?2 IS NULL OR session_date = ?2)
                 ORDER BY created_at DESC, rowid DESC
                 LIMIT ?3 OFFSET ?4"
            ))?;
            let sessions = stmt
                .query_map(params![status, date, limit, offset], session_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok((sessions, total as u64))
        })
        .await
        .map_err(map_tr_err)
}

/// Marks a session `completed`. Observing an already completed session is a no-op.
pub async fn mark_completed(db: &Database, id: &str) -> Result<(), RemindrError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let current: Option<String> = conn
                .query_row(
                    "SELECT status FROM reminder_sessions WHERE id = ?1",
                    params![id],
                    |row| row.get(0),
                )
                .optional()?;
            let Some(current) = current else {
                return Ok(Err(RemindrError::NotFound {
                    entity: "session",
                    id,
                }));
            };
            let current = match current.parse::<SessionStatus>() {
                Ok(status) => status,
                Err(e) => return Ok(Err(RemindrError::Internal(format!("bad session status: {e}")))),
            };
            if let Err(e) = current.transition(SessionStatus::Completed) {
                return Ok(Err(e));
            }
            if current != SessionStatus::Completed {
                conn.execute(
                    "UPDATE reminder_sessions SET status = ?1, updated_at = ?2 WHERE id = ?3",
                    params![SessionStatus::Completed.to_string(), now_rfc3339(), id],
                )?;
            }
            Ok(Ok(()))
        })
        .await
        .map_err(map_tr_err)?
}

/// Claims the one-time summary dispatch for a session.
///
/// Returns `true` for exactly one caller; later calls return `false`.
pub async fn claim_summary(db: &Database, id: &str) -> Result<bool, RemindrError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let now = now_rfc3339();
            let changed = conn.execute(
                "UPDATE reminder_sessions SET summary_sent_at = ?1, updated_at = ?1
                 WHERE id = ?2 AND summary_sent_at IS NULL",
                params![now, id],
            )?;
            Ok(changed == 1)
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use remindr_core::types::ClientStatus;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, day).unwrap()
    }

    fn make_client(session: &ReminderSession, n: usize) -> ReminderClient {
        ReminderClient {
            id: format!("{}-c{n}", session.id),
            session_id: session.id.clone(),
            appointment_id: format!("evt-{n}"),
            client_name: format!("Client {n}"),
            phone_number: "06 12 34 56 78".to_string(),
            appointment_time: "2026-03-14T10:00:00+01:00".to_string(),
            service_name: "Soin visage".to_string(),
            message: "Bonjour".to_string(),
            status: ClientStatus::Pending,
            error_message: None,
            processed_at: None,
            created_at: now_rfc3339(),
        }
    }

    #[tokio::test]
    async fn create_and_get_session_roundtrips() {
        let (db, _dir) = setup_db().await;
        let session = ReminderSession::new(date(14), 2);
        let clients = vec![make_client(&session, 1), make_client(&session, 2)];

        create_session_with_clients(&db, &session, &clients).await.unwrap();
        let stored = get_session(&db, &session.id).await.unwrap().unwrap();
        assert_eq!(stored, session);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn get_nonexistent_session_returns_none() {
        let (db, _dir) = setup_db().await;
        assert!(get_session(&db, "nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn failed_client_insert_rolls_back_session() {
        let (db, _dir) = setup_db().await;
        let session = ReminderSession::new(date(14), 2);
        let client = make_client(&session, 1);
        // Duplicate primary key on the second insert.
        let result = create_session_with_clients(&db, &session, &[client.clone(), client]).await;
        assert!(result.is_err());
        assert!(get_session(&db, &session.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_sessions_filters_and_pages() {
        let (db, _dir) = setup_db().await;
        let mut ids = Vec::new();
        for day in [10, 11, 11] {
            let session = ReminderSession::new(date(day), 1);
            create_session_with_clients(&db, &session, &[make_client(&session, 1)])
                .await
                .unwrap();
            ids.push(session.id);
        }
        mark_completed(&db, &ids[0]).await.unwrap();

        let all = SessionFilter { limit: 10, ..Default::default() };
        let (sessions, total) = list_sessions(&db, &all).await.unwrap();
        assert_eq!(total, 3);
        assert_eq!(sessions.len(), 3);
        // Newest first.
        assert_eq!(sessions[0].id, ids[2]);

        let by_date = SessionFilter { date: Some(date(11)), limit: 1, ..Default::default() };
        let (page, total) = list_sessions(&db, &by_date).await.unwrap();
        assert_eq!(total, 2);
        assert_eq!(page.len(), 1);

        let completed = SessionFilter {
            status: Some(SessionStatus::Completed),
            limit: 10,
            ..Default::default()
        };
        let (done, total) = list_sessions(&db, &completed).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(done[0].id, ids[0]);

        let past_end = SessionFilter { limit: 10, offset: 5, ..Default::default() };
        let (empty, total) = list_sessions(&db, &past_end).await.unwrap();
        assert!(empty.is_empty());
        assert_eq!(total, 3);
    }

    #[tokio::test]
    async fn mark_completed_is_idempotent_and_checks_existence() {
        let (db, _dir) = setup_db().await;
        let session = ReminderSession::new(date(14), 0);
        create_session_with_clients(&db, &session, &[]).await.unwrap();

        mark_completed(&db, &session.id).await.unwrap();
        mark_completed(&db, &session.id).await.unwrap();
        let stored = get_session(&db, &session.id).await.unwrap().unwrap();
        assert_eq!(stored.status, SessionStatus::Completed);

        let err = mark_completed(&db, "missing").await.unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn summary_is_claimed_once() {
        let (db, _dir) = setup_db().await;
        let session = ReminderSession::new(date(14), 0);
        create_session_with_clients(&db, &session, &[]).await.unwrap();

        assert!(claim_summary(&db, &session.id).await.unwrap());
        assert!(!claim_summary(&db, &session.id).await.unwrap());
        let stored = get_session(&db, &session.id).await.unwrap().unwrap();
        assert!(stored.summary_sent_at.is_some());
        assert!(!claim_summary(&db, "missing").await.unwrap());
    }
}
