//! Metrics and monitoring for the arena service
//!
//! Prometheus collection plus the HTTP endpoints that expose it alongside
//! health, statistics and the leaderboard.

pub mod collector;
pub mod health;

pub use collector::{
    ArenaMetrics, MetricsCollector, MetricsTimer, PerformanceMetrics, QueueMetrics, RatingMetrics,
    ServiceMetrics, TournamentMetrics,
};
pub use health::{metrics_text, HealthServer, HealthServerConfig};
