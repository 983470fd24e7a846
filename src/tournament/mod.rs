//! Single-elimination tournaments
//!
//! Tournaments run over their own participant pool and never touch the live
//! queue. Results are reported by the caller, optionally linked to the arena
//! the match was fought in.

pub mod bracket;
pub mod instance;

// Re-export commonly used types
pub use bracket::{round_sizes, Bracket, TournamentMatch};
pub use instance::{
    ReportOutcome, Tournament, TournamentRewards, TournamentSummary, MAX_TOURNAMENT_PLAYERS,
    MIN_TOURNAMENT_PLAYERS,
};
