//! Rating system: the per-player career store and ELO updates
//!
//! This module provides the rating store consulted by matchmaking and the
//! ELO updater that feeds ranked match results back into it.

pub mod elo;
pub mod storage;

// Re-export commonly used types
pub use elo::{win_probability, EloRatingUpdater, MatchParticipant, MatchResult, RatingChange};
pub use storage::{InMemoryRatingStorage, RatingRecord, RatingStorage};
