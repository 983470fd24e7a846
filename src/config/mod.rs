//! Configuration management for the arena service
//!
//! This module handles configuration loading from environment variables and
//! TOML files, validation, and default values for the arena engine.

pub mod app;
pub mod arena;
pub mod rating;

// Re-export commonly used types
pub use app::{validate_config, AppConfig, ServiceSettings};
pub use arena::{ArenaSettings, MAX_TIMING_SECONDS};
pub use rating::RatingSettings;
