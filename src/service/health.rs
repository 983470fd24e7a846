//! Health evaluation for the arena service

use crate::manager::{ArenaManager, ManagerStats};
use serde::{Deserialize, Serialize};
use tracing::error;

/// Ended arenas left in the registry before the service reports itself degraded
pub const DEGRADED_ENDED_BACKLOG: usize = 500;

/// Health check status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    /// Gauge value: 0=unhealthy, 1=degraded, 2=healthy
    pub fn as_code(self) -> u8 {
        match self {
            HealthStatus::Unhealthy => 0,
            HealthStatus::Degraded => 1,
            HealthStatus::Healthy => 2,
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStatus::Healthy => write!(f, "healthy"),
            HealthStatus::Degraded => write!(f, "degraded"),
            HealthStatus::Unhealthy => write!(f, "unhealthy"),
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheck {
    pub status: HealthStatus,
    pub service: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub uptime_seconds: u64,
    /// Manager snapshot, absent when the manager could not be read
    pub stats: Option<ManagerStats>,
    pub message: Option<String>,
}

impl HealthCheck {
    /// Evaluate the manager's state
    pub fn check(manager: &ArenaManager, service: &str, uptime_seconds: u64) -> Self {
        let (status, stats, message) = match manager.stats() {
            Ok(stats) if stats.ended_arenas > DEGRADED_ENDED_BACKLOG => {
                let message = format!(
                    "{} ended arenas awaiting housekeeping",
                    stats.ended_arenas
                );
                (HealthStatus::Degraded, Some(stats), Some(message))
            }
            Ok(stats) => (HealthStatus::Healthy, Some(stats), None),
            Err(e) => {
                error!("Health check could not read manager state: {}", e);
                (HealthStatus::Unhealthy, None, Some(e.to_string()))
            }
        };

        Self {
            status,
            service: service.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: chrono::Utc::now(),
            uptime_seconds,
            stats,
            message,
        }
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
