// SPDX-FileCopyrightText: 2026 Remindr Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Row mapping between SQLite and the domain types in `remindr-core`.
//!
//! Statuses are stored as their snake_case names, dates as `YYYY-MM-DD`,
//! timestamps as RFC 3339 strings.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::Row;

pub use remindr_core::types::{
    ClientStatus, DeliveryStatusEntry, ReminderClient, ReminderSession, SessionStatus,
};

pub(crate) const SESSION_COLUMNS: &str = "id, session_date, status, total_clients, \
     processed_clients, success_count, error_count, summary_sent_at, created_at, updated_at";

pub(crate) const CLIENT_COLUMNS: &str = "id, session_id, appointment_id, client_name, \
     phone_number, appointment_time, service_name, message, status, error_message, \
     processed_at, created_at";

pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses a text column with `FromStr`, reporting failures as conversion errors.
fn parse_column<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.get(idx)?;
    raw.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn session_from_row(row: &Row<'_>) -> rusqlite::Result<ReminderSession> {
    let date: String = row.get(1)?;
    let session_date = NaiveDate::parse_from_str(&date, DATE_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(e)))?;
    Ok(ReminderSession {
        id: row.get(0)?,
        session_date,
        status: parse_column::<SessionStatus>(row, 2)?,
        total_clients: row.get(3)?,
        processed_clients: row.get(4)?,
        success_count: row.get(5)?,
        error_count: row.get(6)?,
        summary_sent_at: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

pub(crate) fn client_from_row(row: &Row<'_>) -> rusqlite::Result<ReminderClient> {
    Ok(ReminderClient {
        id: row.get(0)?,
        session_id: row.get(1)?,
        appointment_id: row.get(2)?,
        client_name: row.get(3)?,
        phone_number: row.get(4)?,
        appointment_time: row.get(5)?,
        service_name: row.get(6)?,
        message: row.get(7)?,
        status: parse_column::<ClientStatus>(row, 8)?,
        error_message: row.get(9)?,
        processed_at: row.get(10)?,
        created_at: row.get(11)?,
    })
}

pub(crate) fn cache_entry_from_row(row: &Row<'_>) -> rusqlite::Result<DeliveryStatusEntry> {
    let checked: String = row.get(2)?;
    let last_checked = DateTime::parse_from_rfc3339(&checked)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?;
    Ok(DeliveryStatusEntry {
        phone_number: row.get(0)?,
        has_capability: row.get(1)?,
        last_checked,
        last_error_code: row.get(3)?,
    })
}
