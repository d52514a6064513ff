// SPDX-FileCopyrightText: 2026 Remindr Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One-shot subcommands. Each runs a single engine operation and prints its
//! result as JSON on stdout.

use chrono::NaiveDate;
use serde::Serialize;

use remindr_config::model::RemindrConfig;
use remindr_core::types::SessionStatus;
use remindr_core::RemindrError;
use remindr_phone::Region;

use crate::app::{home_region, App};

/// Engine operation selected on the command line.
#[derive(Debug, Clone)]
pub enum Operation {
    Prepare {
        date: Option<NaiveDate>,
    },
    Process {
        session_id: String,
        batch_size: Option<usize>,
    },
    Step {
        session_id: Option<String>,
        batch_size: Option<usize>,
        date: Option<NaiveDate>,
    },
    Status {
        session_id: String,
    },
    History {
        status: Option<SessionStatus>,
        date: Option<NaiveDate>,
        page: u32,
        per_page: u32,
    },
    MigrateTitles {
        offset: usize,
        limit: Option<usize>,
    },
}

/// Runs `op` against a freshly built engine and returns the JSON output.
pub async fn run_operation(config: &RemindrConfig, op: Operation) -> Result<String, RemindrError> {
    let app = App::build(config).await?;
    let output = execute(&app, op).await;
    app.close().await?;
    output
}

async fn execute(app: &App, op: Operation) -> Result<String, RemindrError> {
    let orchestrator = &app.orchestrator;
    match op {
        Operation::Prepare { date } => to_json(&orchestrator.prepare(date).await?),
        Operation::Process {
            session_id,
            batch_size,
        } => to_json(&orchestrator.process(&session_id, batch_size).await?),
        Operation::Step {
            session_id,
            batch_size,
            date,
        } => to_json(
            &orchestrator
                .step(session_id.as_deref(), batch_size, date)
                .await?,
        ),
        Operation::Status { session_id } => to_json(&orchestrator.status(&session_id).await?),
        Operation::History {
            status,
            date,
            page,
            per_page,
        } => to_json(&orchestrator.history(status, date, page, per_page).await?),
        Operation::MigrateTitles { offset, limit } => {
            to_json(&app.migrator.run(offset, limit).await?)
        }
    }
}

/// `remindr normalize <phone>`: no storage or network involved.
pub fn run_normalize(
    config: &RemindrConfig,
    phone: &str,
    region: Option<&str>,
) -> Result<String, RemindrError> {
    let home = match region {
        Some(code) => Region::from_code(code)
            .ok_or_else(|| RemindrError::InvalidInput(format!("unknown region {code:?}")))?,
        None => home_region(config)?,
    };
    to_json(&remindr_phone::normalize(phone, home))
}

/// `remindr config`: effective configuration with secrets redacted.
pub fn run_show_config(config: &RemindrConfig) -> Result<String, RemindrError> {
    config
        .to_redacted_toml()
        .map_err(|e| RemindrError::Internal(format!("failed to render config: {e}")))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, RemindrError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| RemindrError::Internal(format!("failed to encode result: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_uses_home_region_by_default() {
        let config = RemindrConfig::default();
        let json = run_normalize(&config, "06 12 34 56 78", None).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["formatted"], "+33612345678");
        assert_eq!(value["confidence"], "high");
    }

    #[test]
    fn normalize_rejects_unknown_override() {
        let config = RemindrConfig::default();
        let err = run_normalize(&config, "0612345678", Some("ZZ")).unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn shown_config_hides_tokens() {
        let mut config = RemindrConfig::default();
        config.delivery.api_token = Some("super-secret".into());
        let text = run_show_config(&config).unwrap();
        assert!(!text.contains("super-secret"));
    }
}
