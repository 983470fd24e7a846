//! Service layer for the arena engine
//!
//! Application state, health evaluation and background task management for
//! the standalone binary.

pub mod app;
pub mod health;

pub use app::{spawn_housekeeping, AppState, ServiceError};
pub use health::{HealthCheck, HealthStatus};
