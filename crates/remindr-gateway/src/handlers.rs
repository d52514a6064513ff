// SPDX-FileCopyrightText: 2026 Remindr Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway REST API.
//!
//! Every response carries `success` and `message`. Successful bodies add the
//! operation's result fields; failures map through
//! [`RemindrError::status_code`].

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use remindr_core::types::SessionStatus;
use remindr_core::RemindrError;
use remindr_engine::StepResult;

use crate::server::GatewayState;

const DEFAULT_PER_PAGE: u32 = 20;

/// Success envelope: `{success: true, message, ...data}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    #[serde(flatten)]
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    fn ok(message: impl Into<String>, data: T) -> Json<Self> {
        Json(Self {
            success: true,
            message: message.into(),
            data,
        })
    }
}

/// Error body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

/// Handler error carrying the engine error.
#[derive(Debug)]
pub struct ApiError(pub RemindrError);

impl From<RemindrError> for ApiError {
    fn from(e: RemindrError) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        (
            status,
            Json(ErrorResponse {
                success: false,
                message: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

/// Parses an optional JSON body; an empty body is the default request.
fn parse_body<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| ApiError(RemindrError::InvalidInput(format!("malformed request body: {e}"))))
}

fn parse_date(raw: Option<&str>) -> Result<Option<NaiveDate>, ApiError> {
    raw.filter(|s| !s.is_empty())
        .map(|s| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| {
                ApiError(RemindrError::InvalidInput(format!(
                    "date must be YYYY-MM-DD, got {s:?}"
                )))
            })
        })
        .transpose()
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PrepareRequest {
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProcessRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub batch_size: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StepRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub batch_size: Option<usize>,
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MigrateRequest {
    #[serde(default)]
    pub offset: Option<usize>,
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Query of `GET /v1/reminders/history`. Kept as strings so bad values get
/// the JSON error envelope.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub status: Option<String>,
    pub date: Option<String>,
    pub page: Option<String>,
    pub per_page: Option<String>,
}

fn parse_number(name: &str, raw: Option<&str>, default: u32) -> Result<u32, ApiError> {
    match raw.filter(|s| !s.is_empty()) {
        None => Ok(default),
        Some(s) => s.parse().map_err(|_| {
            ApiError(RemindrError::InvalidInput(format!(
                "{name} must be a non-negative integer, got {s:?}"
            )))
        }),
    }
}

/// POST /v1/reminders/prepare
pub async fn post_prepare(
    State(state): State<GatewayState>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let request: PrepareRequest = parse_body(&body)?;
    let date = parse_date(request.date.as_deref())?;
    let result = state.orchestrator.prepare(date).await?;
    let message = if result.completed {
        format!("no reminders due on {}", result.session_date)
    } else {
        format!("session created with {} clients", result.total_clients)
    };
    Ok(ApiResponse::ok(message, result).into_response())
}

/// POST /v1/reminders/process
pub async fn post_process(
    State(state): State<GatewayState>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let request: ProcessRequest = parse_body(&body)?;
    let session_id = request
        .session_id
        .ok_or_else(|| RemindrError::InvalidInput("session_id is required".into()))?;
    let result = state
        .orchestrator
        .process(&session_id, request.batch_size)
        .await?;
    let message = process_message(result.completed, result.processed, result.remaining);
    Ok(ApiResponse::ok(message, result).into_response())
}

/// POST /v1/reminders/step
pub async fn post_step(
    State(state): State<GatewayState>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let request: StepRequest = parse_body(&body)?;
    let date = parse_date(request.date.as_deref())?;
    let result = state
        .orchestrator
        .step(request.session_id.as_deref(), request.batch_size, date)
        .await?;
    let message = match &result {
        StepResult::NothingDue(p) => format!("no reminders due on {}", p.session_date),
        StepResult::Processed(p) => process_message(p.completed, p.processed, p.remaining),
    };
    Ok(ApiResponse::ok(message, result).into_response())
}

fn process_message(completed: bool, processed: u32, remaining: u32) -> String {
    if completed {
        format!("session completed ({processed} processed in this call)")
    } else {
        format!("processed {processed} clients, {remaining} remaining")
    }
}

/// GET /v1/reminders/sessions/{id}
pub async fn get_session(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let view = state.orchestrator.status(&id).await?;
    let message = format!("session {}", view.session.status);
    Ok(ApiResponse::ok(message, view).into_response())
}

/// GET /v1/reminders/history
pub async fn get_history(
    State(state): State<GatewayState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Response, ApiError> {
    let status = query
        .status
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<SessionStatus>().map_err(|_| {
                ApiError(RemindrError::InvalidInput(format!(
                    "status must be processing or completed, got {s:?}"
                )))
            })
        })
        .transpose()?;
    let date = parse_date(query.date.as_deref())?;
    let page = parse_number("page", query.page.as_deref(), 1)?;
    let per_page = parse_number("per_page", query.per_page.as_deref(), DEFAULT_PER_PAGE)?;

    let history = state
        .orchestrator
        .history(status, date, page, per_page)
        .await?;
    let message = format!("{} sessions", history.total);
    Ok(ApiResponse::ok(message, history).into_response())
}

/// POST /v1/calendar/migrate-titles
pub async fn post_migrate_titles(
    State(state): State<GatewayState>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let request: MigrateRequest = parse_body(&body)?;
    let migrator = state
        .migrator
        .as_ref()
        .ok_or_else(|| RemindrError::Config("calendar.base_url is not set".into()))?;
    let report = migrator
        .run(request.offset.unwrap_or(0), request.limit)
        .await?;
    let message = format!(
        "{} migrated, {} skipped, {} failed",
        report.migrated,
        report.skipped,
        report.failed.len()
    );
    Ok(ApiResponse::ok(message, report).into_response())
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// GET /health (unauthenticated)
pub async fn get_public_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.health.start_time.elapsed().as_secs(),
    })
}

/// GET /metrics (unauthenticated)
pub async fn get_public_metrics(State(state): State<GatewayState>) -> Response {
    match &state.health.prometheus_render {
        Some(render) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4")],
            render(),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "metrics not enabled").into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_body_is_default_request() {
        let req: ProcessRequest = parse_body(&Bytes::from_static(b"  \n")).unwrap();
        assert!(req.session_id.is_none());
    }

    #[test]
    fn malformed_body_is_input_error() {
        let err = parse_body::<ProcessRequest>(&Bytes::from_static(b"{\"session_id\": 4")).unwrap_err();
        assert_eq!(err.0.status_code(), 400);
        let err = parse_body::<ProcessRequest>(&Bytes::from_static(b"{\"sesion_id\": \"x\"}")).unwrap_err();
        assert_eq!(err.0.status_code(), 400);
    }

    #[test]
    fn dates_must_be_iso() {
        assert_eq!(
            parse_date(Some("2026-03-14")).unwrap(),
            NaiveDate::from_ymd_opt(2026, 3, 14)
        );
        assert_eq!(parse_date(Some("")).unwrap(), None);
        assert!(parse_date(Some("14/03/2026")).is_err());
    }

    #[test]
    fn envelope_flattens_data() {
        #[derive(Serialize)]
        struct Data {
            total: u32,
        }
        let Json(resp) = ApiResponse::ok("done", Data { total: 3 });
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"success": true, "message": "done", "total": 3})
        );
    }
}
