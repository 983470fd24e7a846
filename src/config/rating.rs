//! Rating system configuration

use serde::{Deserialize, Serialize};

/// ELO parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingSettings {
    /// Rating assigned to a player on first lookup
    pub initial_rating: i32,
    /// Maximum rating swing for a single match
    pub k_factor: f64,
}

impl Default for RatingSettings {
    fn default() -> Self {
        Self {
            initial_rating: 1000,
            k_factor: 32.0,
        }
    }
}
