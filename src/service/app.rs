//! Main application state and service coordination
//!
//! Wires configuration, the arena manager, metrics and the health server
//! together and owns the background tasks.

use crate::config::{validate_config, AppConfig};
use crate::manager::ArenaManager;
use crate::metrics::health::HealthServerConfig;
use crate::metrics::{HealthServer, MetricsCollector};
use crate::utils::current_timestamp;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Service-level errors
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Service initialization error: {message}")]
    Initialization { message: String },

    #[error("Background task error: {message}")]
    BackgroundTask { message: String },
}

/// Main application state containing all service components
pub struct AppState {
    config: AppConfig,
    manager: ArenaManager,
    health_server: Arc<HealthServer>,
    background_tasks: Vec<JoinHandle<()>>,
    is_running: Arc<RwLock<bool>>,
}

/// Run housekeeping on a fixed interval until `is_running` turns false
pub fn spawn_housekeeping(
    manager: ArenaManager,
    every: Duration,
    is_running: Arc<RwLock<bool>>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        info!("Housekeeping task started ({}ms interval)", every.as_millis());

        loop {
            interval.tick().await;
            if !*is_running.read().await {
                break;
            }

            match manager.run_housekeeping(current_timestamp()) {
                Ok(report) if report.reaped > 0 || report.cleaned > 0 => {
                    info!(
                        "Housekeeping - reaped: {}, cleaned: {}",
                        report.reaped, report.cleaned
                    );
                }
                Ok(_) => debug!("Housekeeping - nothing to do"),
                Err(e) => warn!("Housekeeping pass failed: {}", e),
            }
        }

        info!("Housekeeping task stopped");
    })
}

impl AppState {
    /// Validate configuration and build every component
    pub async fn new(config: AppConfig) -> Result<Self, ServiceError> {
        validate_config(&config).map_err(|e| ServiceError::Configuration {
            message: e.to_string(),
        })?;

        info!("Initializing {} arena service", config.service.name);

        let metrics_collector =
            Arc::new(
                MetricsCollector::new().map_err(|e| ServiceError::Initialization {
                    message: format!("Failed to create metrics collector: {}", e),
                })?,
            );
        let manager = ArenaManager::with_metrics(&config, metrics_collector).map_err(|e| {
            ServiceError::Initialization {
                message: format!("Failed to create arena manager: {}", e),
            }
        })?;

        let health_config = HealthServerConfig {
            port: config.service.health_port,
            host: "0.0.0.0".to_string(),
        };
        let health_server = Arc::new(HealthServer::new(
            health_config,
            manager.clone(),
            &config.service.name,
        ));

        Ok(Self {
            config,
            manager,
            health_server,
            background_tasks: Vec::new(),
            is_running: Arc::new(RwLock::new(false)),
        })
    }

    /// Start the health endpoints and the housekeeping loop
    pub async fn start(&mut self) -> Result<(), ServiceError> {
        info!("Starting {} arena service", self.config.service.name);
        *self.is_running.write().await = true;

        let health_server = self.health_server.clone();
        let port = self.config.service.health_port;
        self.background_tasks.push(tokio::spawn(async move {
            if let Err(e) = health_server.start().await {
                error!("Health server failed: {}", e);
            }
        }));
        info!("Health endpoints starting on port {}", port);

        self.background_tasks.push(spawn_housekeeping(
            self.manager.clone(),
            self.config.housekeeping_interval(),
            self.is_running.clone(),
        ));

        info!("Arena service started");
        Ok(())
    }

    /// Stop background work and log final statistics
    pub async fn shutdown(&mut self) -> Result<(), ServiceError> {
        info!("Starting graceful shutdown of {}", self.config.service.name);
        *self.is_running.write().await = false;

        if let Err(e) = self.health_server.stop().await {
            warn!("Failed to stop health server: {}", e);
        }

        let deadline = self.config.shutdown_timeout();
        for task in self.background_tasks.drain(..) {
            let abort = task.abort_handle();
            if tokio::time::timeout(deadline, task).await.is_err() {
                warn!("Background task did not stop within {:?}, aborting", deadline);
                abort.abort();
            }
        }

        let final_stats = self
            .manager
            .stats()
            .map_err(|e| ServiceError::BackgroundTask {
                message: format!("Failed to get final stats: {}", e),
            })?;

        info!("Final service statistics: {:?}", final_stats);
        info!("Arena service shutdown completed");
        Ok(())
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub async fn is_running(&self) -> bool {
        *self.is_running.read().await
    }

    pub fn manager(&self) -> ArenaManager {
        self.manager.clone()
    }

    pub fn health_server(&self) -> Arc<HealthServer> {
        self.health_server.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ArenaType;

    #[tokio::test]
    async fn test_invalid_config_rejected() {
        let mut config = AppConfig::default();
        config.service.log_level = "loud".to_string();

        let result = AppState::new(config).await;
        assert!(matches!(result, Err(ServiceError::Configuration { .. })));
    }

    #[tokio::test]
    async fn test_state_wires_manager() {
        let mut state = AppState::new(AppConfig::default()).await.unwrap();
        assert!(!state.is_running().await);

        state.manager().queue_for_arena("alice", ArenaType::Duel, 1).unwrap();
        assert_eq!(
            state.manager().queue_status("alice").unwrap(),
            Some(ArenaType::Duel)
        );

        state.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_housekeeping_task_runs_until_stopped() {
        let manager = ArenaManager::new().unwrap();
        let is_running = Arc::new(RwLock::new(true));
        let handle = spawn_housekeeping(manager.clone(), Duration::from_millis(10), is_running.clone());

        tokio::time::sleep(Duration::from_millis(80)).await;
        *is_running.write().await = false;
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();

        assert!(manager.metrics().service().housekeeping_runs_total.get() >= 1);
    }
}
