//! Common types used throughout the arena engine

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lower-cased player name, the key for every per-player record
pub type PlayerName = String;

/// Unique identifier for arenas
pub type ArenaId = Uuid;

/// Unique identifier for tournaments
pub type TournamentId = Uuid;

/// Unique identifier for tournament matches
pub type MatchId = Uuid;

/// Team number inside an arena. 0 means no team (free-for-all).
pub type TeamId = u8;

/// Kind of match a player can queue for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArenaType {
    Duel,
    Team,
    FreeForAll,
    KingOfTheHill,
}

impl ArenaType {
    /// Arena types that the queue can actually form
    pub const PLAYABLE: [ArenaType; 3] = [ArenaType::Duel, ArenaType::Team, ArenaType::FreeForAll];

    /// Number of queue entries consumed to form one arena, if the type is playable
    pub fn required_players(self) -> Option<usize> {
        match self {
            ArenaType::Duel => Some(2),
            ArenaType::Team => Some(4),
            ArenaType::FreeForAll => Some(4),
            ArenaType::KingOfTheHill => None,
        }
    }

    /// Team number for the entry at `index` in formation order
    pub fn team_for_index(self, index: usize) -> TeamId {
        match self {
            ArenaType::Duel => (index + 1) as TeamId,
            ArenaType::Team => {
                if index % 2 == 0 {
                    1
                } else {
                    2
                }
            }
            ArenaType::FreeForAll | ArenaType::KingOfTheHill => 0,
        }
    }

    /// Lower-case label used in metrics
    pub fn as_label(self) -> &'static str {
        match self {
            ArenaType::Duel => "duel",
            ArenaType::Team => "team",
            ArenaType::FreeForAll => "ffa",
            ArenaType::KingOfTheHill => "koth",
        }
    }
}

impl std::fmt::Display for ArenaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArenaType::Duel => write!(f, "Duel"),
            ArenaType::Team => write!(f, "Team"),
            ArenaType::FreeForAll => write!(f, "Free-for-All"),
            ArenaType::KingOfTheHill => write!(f, "King of the Hill"),
        }
    }
}

impl std::str::FromStr for ArenaType {
    type Err = crate::error::ArenaError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "duel" | "1v1" => Ok(ArenaType::Duel),
            "team" | "2v2" => Ok(ArenaType::Team),
            "ffa" | "free-for-all" | "freeforall" => Ok(ArenaType::FreeForAll),
            "koth" | "king" | "king-of-the-hill" => Ok(ArenaType::KingOfTheHill),
            other => Err(crate::error::ArenaError::UnsupportedArenaType {
                arena_type: other.to_string(),
            }),
        }
    }
}

/// Lifecycle of an arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArenaState {
    /// Formed, waiting for the caller to start it
    Starting,
    /// Combat is allowed
    Active,
    /// Terminal; removed by the next housekeeping pass
    Ended,
}

impl std::fmt::Display for ArenaState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArenaState::Starting => write!(f, "starting"),
            ArenaState::Active => write!(f, "active"),
            ArenaState::Ended => write!(f, "ended"),
        }
    }
}

/// Recorded outcome of an arena
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Winner {
    Player(PlayerName),
    Team(TeamId),
}

impl std::fmt::Display for Winner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Winner::Player(name) => write!(f, "{}", name),
            Winner::Team(team) => write!(f, "Team {}", team),
        }
    }
}

/// Display label derived from a rating
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tier {
    Bronze,
    Silver,
    Gold,
    Platinum,
    Diamond,
    TheOne,
}

impl Tier {
    /// Map a rating onto its tier
    pub fn from_rating(rating: i32) -> Self {
        match rating {
            r if r >= 2500 => Tier::TheOne,
            r if r >= 2000 => Tier::Diamond,
            r if r >= 1600 => Tier::Platinum,
            r if r >= 1300 => Tier::Gold,
            r if r >= 1000 => Tier::Silver,
            _ => Tier::Bronze,
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tier::Bronze => write!(f, "Bronze"),
            Tier::Silver => write!(f, "Silver"),
            Tier::Gold => write!(f, "Gold"),
            Tier::Platinum => write!(f, "Platinum"),
            Tier::Diamond => write!(f, "Diamond"),
            Tier::TheOne => write!(f, "The One"),
        }
    }
}

/// Tier label for a rating
pub fn calculate_tier(rating: i32) -> String {
    Tier::from_rating(rating).to_string()
}

/// Lifecycle of a tournament
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TournamentState {
    Registration,
    Active,
    Completed,
}

impl std::fmt::Display for TournamentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TournamentState::Registration => write!(f, "registration"),
            TournamentState::Active => write!(f, "active"),
            TournamentState::Completed => write!(f, "completed"),
        }
    }
}

/// Result of a queue request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueueOutcome {
    /// The player is waiting for more entries
    Queued { position: usize, waiting: usize },
    /// The request completed a match
    Matched(ArenaId),
}

impl QueueOutcome {
    /// Arena id if a match formed
    pub fn arena_id(&self) -> Option<ArenaId> {
        match self {
            QueueOutcome::Matched(id) => Some(*id),
            QueueOutcome::Queued { .. } => None,
        }
    }
}
