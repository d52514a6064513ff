// SPDX-FileCopyrightText: 2026 Remindr Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `remindr serve` command implementation.
//!
//! Builds the engine, installs the Prometheus recorder and runs the gateway
//! until SIGINT/SIGTERM.

use std::sync::Arc;

use remindr_config::model::RemindrConfig;
use remindr_core::RemindrError;
use remindr_gateway::{start_server, AuthConfig, GatewayState, HealthState, ServerConfig};
use remindr_prometheus::PrometheusAdapter;
use tracing::{info, warn};

use crate::app::App;

/// Runs the `remindr serve` command.
pub async fn run_serve(config: RemindrConfig) -> Result<(), RemindrError> {
    info!(service = %config.service.name, "starting remindr serve");

    let app = App::build(&config).await?;

    let prometheus_render: Option<Arc<dyn Fn() -> String + Send + Sync>> =
        match PrometheusAdapter::new() {
            Ok(adapter) => {
                info!("prometheus metrics enabled");
                Some(Arc::new(move || adapter.render()))
            }
            Err(e) => {
                warn!(error = %e, "prometheus initialization failed, continuing without metrics");
                None
            }
        };

    if config.gateway.bearer_token.is_none() {
        warn!("gateway.bearer_token is not set, every /v1 request will be rejected");
    }

    let state = GatewayState {
        orchestrator: app.orchestrator.clone(),
        migrator: Some(app.migrator.clone()),
        auth: AuthConfig {
            bearer_token: config.gateway.bearer_token.clone(),
        },
        health: HealthState {
            start_time: std::time::Instant::now(),
            prometheus_render,
        },
    };

    let server_config = ServerConfig::from(&config.gateway);
    start_server(&server_config, state, shutdown_signal()).await?;

    app.close().await?;
    info!("remindr serve shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received ctrl-c, shutting down"),
        () = terminate => info!("received SIGTERM, shutting down"),
    }
}
