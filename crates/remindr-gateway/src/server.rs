// SPDX-FileCopyrightText: 2026 Remindr Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::future::Future;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::{self as axum_middleware, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;

use remindr_config::model::GatewayConfig;
use remindr_core::RemindrError;
use remindr_engine::{Orchestrator, TitleMigrator};

use crate::auth::{auth_middleware, AuthConfig};
use crate::handlers;

/// Health state for unauthenticated health/metrics endpoints.
#[derive(Clone)]
pub struct HealthState {
    /// Process start time for uptime calculation.
    pub start_time: std::time::Instant,
    /// Optional Prometheus metrics render function.
    pub prometheus_render: Option<Arc<dyn Fn() -> String + Send + Sync>>,
}

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub orchestrator: Arc<Orchestrator>,
    /// `None` when no calendar is configured.
    pub migrator: Option<Arc<TitleMigrator>>,
    pub auth: AuthConfig,
    pub health: HealthState,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl From<&GatewayConfig> for ServerConfig {
    fn from(config: &GatewayConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
        }
    }
}

/// Builds the full router.
///
/// - `GET /health`, `GET /metrics` are public.
/// - `/v1/*` routes require the bearer token. Reminder routes that write
///   run one at a time within this process.
pub fn build_router(state: GatewayState) -> Router {
    let auth_state = state.auth.clone();

    let public_routes = Router::new()
        .route("/health", get(handlers::get_public_health))
        .route("/metrics", get(handlers::get_public_metrics))
        .with_state(state.clone());

    let write_routes = Router::new()
        .route("/v1/reminders/prepare", post(handlers::post_prepare))
        .route("/v1/reminders/process", post(handlers::post_process))
        .route("/v1/reminders/step", post(handlers::post_step))
        .route("/v1/calendar/migrate-titles", post(handlers::post_migrate_titles))
        .route_layer(axum_middleware::from_fn_with_state(
            Arc::new(Mutex::new(())),
            serialize_writes,
        ));

    let api_routes = Router::new()
        .route("/v1/reminders/sessions/{id}", get(handlers::get_session))
        .route("/v1/reminders/history", get(handlers::get_history))
        .merge(write_routes)
        .route_layer(axum_middleware::from_fn_with_state(
            auth_state,
            auth_middleware,
        ))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .layer(TraceLayer::new_for_http())
}

/// Holds the write lock for the duration of the request.
async fn serialize_writes(
    State(lock): State<Arc<Mutex<()>>>,
    request: Request,
    next: Next,
) -> Response {
    let _guard = lock.lock().await;
    next.run(request).await
}

/// Binds `host:port` and serves until `shutdown` resolves.
pub async fn start_server(
    config: &ServerConfig,
    state: GatewayState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), RemindrError> {
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| RemindrError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("Gateway server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| RemindrError::Internal(format!("gateway server error: {e}")))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_config_from_gateway_section() {
        let config = ServerConfig::from(&GatewayConfig::default());
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 3000);
    }
}
