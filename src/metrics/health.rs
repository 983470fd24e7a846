//! Health check endpoints and Prometheus metrics server
//!
//! Serves liveness, Prometheus text, manager statistics and the leaderboard
//! over HTTP using Axum.

use crate::manager::ArenaManager;
use crate::metrics::collector::MetricsCollector;
use crate::service::health::{HealthCheck, HealthStatus};
use anyhow::{Context, Result};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use prometheus::{Encoder, TextEncoder};
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

const DEFAULT_RANKINGS_LIMIT: usize = 10;
const MAX_RANKINGS_LIMIT: usize = 100;

/// Health server configuration
#[derive(Debug, Clone)]
pub struct HealthServerConfig {
    pub port: u16,
    /// Host to bind to (typically "0.0.0.0" for all interfaces)
    pub host: String,
}

impl Default for HealthServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "0.0.0.0".to_string(),
        }
    }
}

/// Shared state for the health server
#[derive(Clone)]
pub struct HealthServerState {
    pub metrics_collector: Arc<MetricsCollector>,
    pub manager: ArenaManager,
    pub service_name: String,
    pub started_at: Instant,
}

/// Health server that provides HTTP endpoints for monitoring
pub struct HealthServer {
    config: HealthServerConfig,
    state: HealthServerState,
    shutdown_tx: broadcast::Sender<()>,
}

#[derive(Debug, Deserialize)]
struct RankingsQuery {
    limit: Option<usize>,
}

impl HealthServer {
    pub fn new(config: HealthServerConfig, manager: ArenaManager, service_name: &str) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            config,
            state: HealthServerState {
                metrics_collector: manager.metrics(),
                manager,
                service_name: service_name.to_string(),
                started_at: Instant::now(),
            },
            shutdown_tx,
        }
    }

    /// Bind and serve until [`stop`](Self::stop) is called
    pub async fn start(&self) -> Result<()> {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port)
            .parse()
            .context("Invalid health server address")?;

        let app = self.create_router();
        let listener = TcpListener::bind(addr).await?;

        info!("Health server listening on http://{}", addr);

        let mut shutdown_rx = self.shutdown_tx.subscribe();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
                info!("Health server shutdown signal received");
            })
            .await?;

        info!("Health server stopped");
        Ok(())
    }

    pub fn create_router(&self) -> Router {
        Router::new()
            .route("/", get(root_handler))
            .route("/health", get(health_handler))
            .route("/metrics", get(metrics_handler))
            .route("/stats", get(stats_handler))
            .route("/rankings", get(rankings_handler))
            .with_state(self.state.clone())
    }

    pub async fn stop(&self) -> Result<()> {
        info!("Stopping health server...");

        if let Err(e) = self.shutdown_tx.send(()) {
            warn!("Failed to send shutdown signal to health server: {}", e);
        }
        Ok(())
    }
}

fn health_of(state: &HealthServerState) -> HealthCheck {
    let check = HealthCheck::check(
        &state.manager,
        &state.service_name,
        state.started_at.elapsed().as_secs(),
    );
    state.metrics_collector.update_health_status(check.status.as_code());
    state
        .metrics_collector
        .update_uptime(state.started_at.elapsed().as_secs());
    check
}

async fn root_handler(State(state): State<HealthServerState>) -> impl IntoResponse {
    Json(json!({
        "service": state.service_name,
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": ["/health", "/metrics", "/stats", "/rankings?limit=N"]
    }))
}

async fn health_handler(State(state): State<HealthServerState>) -> impl IntoResponse {
    debug!("Health check requested");

    let check = health_of(&state);
    let code = match check.status {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (
        code,
        Json(json!({
            "status": check.status,
            "service": check.service,
            "version": check.version,
            "message": check.message,
        })),
    )
}

async fn metrics_handler(State(state): State<HealthServerState>) -> Response {
    debug!("Metrics endpoint requested");

    let metric_families = state.metrics_collector.registry().gather();
    let encoder = TextEncoder::new();

    match encoder.encode_to_string(&metric_families) {
        Ok(metrics_output) => (
            StatusCode::OK,
            [("content-type", encoder.format_type().to_string())],
            metrics_output,
        )
            .into_response(),
        Err(e) => {
            error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to encode metrics".to_string(),
            )
                .into_response()
        }
    }
}

async fn stats_handler(State(state): State<HealthServerState>) -> impl IntoResponse {
    debug!("Stats endpoint requested");

    let check = health_of(&state);
    match check.stats {
        Some(stats) => (
            StatusCode::OK,
            Json(json!({
                "service": {
                    "name": check.service,
                    "version": check.version,
                    "status": check.status,
                    "uptime_seconds": check.uptime_seconds,
                },
                "manager": stats,
                "timestamp": check.timestamp,
            })),
        ),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "service": { "name": check.service, "status": check.status },
                "error": check.message,
                "timestamp": check.timestamp,
            })),
        ),
    }
}

async fn rankings_handler(
    State(state): State<HealthServerState>,
    Query(query): Query<RankingsQuery>,
) -> impl IntoResponse {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_RANKINGS_LIMIT)
        .min(MAX_RANKINGS_LIMIT);

    match state.manager.rankings(limit) {
        Ok(records) => (StatusCode::OK, Json(json!({ "rankings": records }))),
        Err(e) => {
            error!("Failed to read rankings: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "error": e.to_string() })),
            )
        }
    }
}

/// Render the collector's registry in Prometheus text format
pub fn metrics_text(metrics_collector: &MetricsCollector) -> Result<String> {
    let mut buffer = Vec::new();
    TextEncoder::new()
        .encode(&metrics_collector.registry().gather(), &mut buffer)
        .context("Failed to encode metrics")?;
    String::from_utf8(buffer).context("Metrics output was not UTF-8")
}
