//! Arena combat configuration

use crate::error::{ArenaError, Result};
use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

/// Upper bound for the countdown and the match duration (one day)
pub const MAX_TIMING_SECONDS: i64 = 86_400;

/// Combat and lifecycle constants applied to every arena
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaSettings {
    /// Hit points every participant starts with
    pub starting_hp: i32,
    /// Flat damage dealt per attack
    pub damage_per_hit: i32,
    /// Score awarded for a kill
    pub kill_score: u32,
    /// Informational countdown between formation and the scheduled start
    pub countdown_seconds: i64,
    /// Informational match duration recorded at start
    pub match_duration_seconds: i64,
    /// End active arenas that outlive their duration during housekeeping
    pub reap_overdue_arenas: bool,
}

impl Default for ArenaSettings {
    fn default() -> Self {
        Self {
            starting_hp: 100,
            damage_per_hit: 10,
            kill_score: 100,
            countdown_seconds: 10,
            match_duration_seconds: 300, // 5 minutes
            reap_overdue_arenas: false,
        }
    }
}

fn timing(name: &str, seconds: i64) -> Result<TimeDelta> {
    TimeDelta::try_seconds(seconds).ok_or_else(|| {
        ArenaError::ConfigurationError {
            message: format!("{} of {}s is out of range", name, seconds),
        }
        .into()
    })
}

impl ArenaSettings {
    /// Reject values that would make arenas unplayable or overflow timestamps
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: &str| -> Result<()> {
            Err(ArenaError::ConfigurationError {
                message: message.to_string(),
            }
            .into())
        };

        if self.starting_hp <= 0 {
            return invalid("Starting HP must be positive");
        }
        if self.damage_per_hit <= 0 {
            return invalid("Damage per hit must be positive");
        }
        if !(0..=MAX_TIMING_SECONDS).contains(&self.countdown_seconds) {
            return invalid("Countdown must be between 0 and 86400 seconds");
        }
        if !(1..=MAX_TIMING_SECONDS).contains(&self.match_duration_seconds) {
            return invalid("Match duration must be between 1 and 86400 seconds");
        }
        Ok(())
    }

    /// Countdown as a chrono duration
    pub fn countdown(&self) -> Result<TimeDelta> {
        timing("Countdown", self.countdown_seconds)
    }

    /// Match duration as a chrono duration
    pub fn match_duration(&self) -> Result<TimeDelta> {
        timing("Match duration", self.match_duration_seconds)
    }
}
