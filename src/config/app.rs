//! Main application configuration
//!
//! This module defines the primary configuration structures for the arena
//! service, including environment variable and TOML file loading and validation.

use crate::config::{ArenaSettings, RatingSettings};
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub arena: ArenaSettings,
    pub rating: RatingSettings,
}

/// Service-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Service name for logging and metrics
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Port for health check and metrics endpoint
    pub health_port: u16,
    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout_seconds: u64,
    /// Interval between housekeeping passes in seconds
    pub housekeeping_interval_seconds: u64,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "pvp-arena".to_string(),
            log_level: "info".to_string(),
            health_port: 8080,
            shutdown_timeout_seconds: 30,
            housekeeping_interval_seconds: 30,
        }
    }
}

/// Parse an environment variable into `target` when it is set
fn override_from_env<T: std::str::FromStr>(key: &str, target: &mut T) -> Result<()> {
    if let Ok(value) = env::var(key) {
        *target = value
            .parse()
            .map_err(|_| anyhow!("Invalid {} value: {}", key, value))?;
    }
    Ok(())
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML file, then apply environment overrides
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config: AppConfig = toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    fn apply_env(&mut self) -> Result<()> {
        // Service settings
        if let Ok(name) = env::var("SERVICE_NAME") {
            self.service.name = name;
        }
        if let Ok(log_level) = env::var("LOG_LEVEL") {
            self.service.log_level = log_level;
        }
        override_from_env("HEALTH_PORT", &mut self.service.health_port)?;
        override_from_env(
            "SHUTDOWN_TIMEOUT_SECONDS",
            &mut self.service.shutdown_timeout_seconds,
        )?;
        override_from_env(
            "HOUSEKEEPING_INTERVAL_SECONDS",
            &mut self.service.housekeeping_interval_seconds,
        )?;

        // Arena settings
        override_from_env("ARENA_STARTING_HP", &mut self.arena.starting_hp)?;
        override_from_env("ARENA_DAMAGE_PER_HIT", &mut self.arena.damage_per_hit)?;
        override_from_env("ARENA_KILL_SCORE", &mut self.arena.kill_score)?;
        override_from_env("ARENA_COUNTDOWN_SECONDS", &mut self.arena.countdown_seconds)?;
        override_from_env(
            "ARENA_MATCH_DURATION_SECONDS",
            &mut self.arena.match_duration_seconds,
        )?;
        override_from_env(
            "ARENA_REAP_OVERDUE",
            &mut self.arena.reap_overdue_arenas,
        )?;

        // Rating settings
        override_from_env("RATING_INITIAL", &mut self.rating.initial_rating)?;
        override_from_env("RATING_K_FACTOR", &mut self.rating.k_factor)?;

        Ok(())
    }

    /// Get shutdown timeout as Duration
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.service.shutdown_timeout_seconds)
    }

    /// Get housekeeping interval as Duration
    pub fn housekeeping_interval(&self) -> Duration {
        Duration::from_secs(self.service.housekeeping_interval_seconds)
    }
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    if config.service.health_port == 0 {
        return Err(anyhow!("Health port cannot be 0"));
    }
    if config.service.shutdown_timeout_seconds == 0 {
        return Err(anyhow!("Shutdown timeout must be greater than 0"));
    }
    if config.service.housekeeping_interval_seconds == 0 {
        return Err(anyhow!("Housekeeping interval must be greater than 0"));
    }

    config.arena.validate()?;

    if config.rating.initial_rating < 0 {
        return Err(anyhow!("Initial rating cannot be negative"));
    }
    if config.rating.k_factor <= 0.0 {
        return Err(anyhow!("K-factor must be positive"));
    }

    Ok(())
}
