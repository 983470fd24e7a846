//! Utility functions for the arena engine

use crate::types::PlayerName;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Generate a new unique arena ID
pub fn generate_arena_id() -> Uuid {
    Uuid::new_v4()
}

/// Generate a new unique tournament ID
pub fn generate_tournament_id() -> Uuid {
    Uuid::new_v4()
}

/// Generate a new unique tournament match ID
pub fn generate_match_id() -> Uuid {
    Uuid::new_v4()
}

/// Get the current UTC timestamp
pub fn current_timestamp() -> DateTime<Utc> {
    Utc::now()
}

/// Canonical form of a player name
pub fn normalize_name(name: &str) -> PlayerName {
    name.trim().to_lowercase()
}

/// Whether `n` is a power of two within [min, max]
pub fn is_power_of_two_in_range(n: usize, min: usize, max: usize) -> bool {
    n >= min && n <= max && n.is_power_of_two()
}
