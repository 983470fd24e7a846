//! PvP Arena - matchmaking, combat, ELO ratings and tournaments
//!
//! This crate queues players for duels, team fights and free-for-alls, runs
//! the resulting arenas, feeds results into an ELO rating store and hosts
//! single-elimination tournaments. Everything is process-resident and owned
//! by one [`ArenaManager`].

pub mod arena;
pub mod config;
pub mod error;
pub mod manager;
pub mod matchmaking;
pub mod metrics;
pub mod rating;
pub mod report;
pub mod service;
pub mod tournament;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{error_kind, ArenaError, ErrorKind, Result};
pub use types::*;

// Re-export key components
pub use manager::{ArenaManager, HousekeepingReport, ManagerStats};
pub use rating::{EloRatingUpdater, InMemoryRatingStorage, RatingRecord, RatingStorage};
pub use tournament::{ReportOutcome, Tournament, TournamentRewards};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
