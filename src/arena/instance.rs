//! Arena instance implementation and lifecycle management
//!
//! An arena is a self-contained combat sandbox: every participant starts with
//! the configured hit points and flat damage regardless of anything else the
//! player owns.

use crate::config::ArenaSettings;
use crate::error::{ArenaError, Result};
use crate::matchmaking::QueueEntry;
use crate::rating::{MatchParticipant, MatchResult};
use crate::types::{ArenaId, ArenaState, ArenaType, PlayerName, TeamId, Winner};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// One participant's in-match state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArenaPlayer {
    pub name: PlayerName,
    pub team: TeamId,
    pub hp: i32,
    pub max_hp: i32,
    pub damage: i32,
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
    pub alive: bool,
    /// Forfeited via leave; no longer counts as seated
    pub left: bool,
    pub last_attacker: Option<PlayerName>,
    /// Most recent damager other than `last_attacker`, credited on a kill
    pub assist_candidate: Option<PlayerName>,
    pub joined_at: DateTime<Utc>,
    pub score: u32,
}

impl ArenaPlayer {
    fn new(name: &str, team: TeamId, settings: &ArenaSettings, joined_at: DateTime<Utc>) -> Self {
        Self {
            name: name.to_string(),
            team,
            hp: settings.starting_hp,
            max_hp: settings.starting_hp,
            damage: settings.damage_per_hit,
            kills: 0,
            deaths: 0,
            assists: 0,
            alive: true,
            left: false,
            last_attacker: None,
            assist_candidate: None,
            joined_at,
            score: 0,
        }
    }

    fn as_participant(&self) -> MatchParticipant {
        MatchParticipant {
            player: self.name.clone(),
            kills: self.kills,
            deaths: self.deaths,
            assists: self.assists,
        }
    }
}

/// One live match
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Arena {
    pub id: ArenaId,
    pub arena_type: ArenaType,
    pub state: ArenaState,
    pub players: HashMap<PlayerName, ArenaPlayer>,
    /// Team number to members in formation order
    pub teams: BTreeMap<TeamId, Vec<PlayerName>>,
    /// Every participant in formation order
    pub roster: Vec<PlayerName>,
    pub max_players: usize,
    pub min_players: usize,
    pub created_at: DateTime<Utc>,
    pub scheduled_start: DateTime<Utc>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration_seconds: i64,
    pub winner: Option<Winner>,
    pub ranked: bool,
}

/// Lightweight listing row for an arena
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArenaSummary {
    pub id: ArenaId,
    pub arena_type: ArenaType,
    pub state: ArenaState,
    pub players: Vec<PlayerName>,
    pub alive: usize,
    pub winner: Option<Winner>,
}

impl Arena {
    /// Seat a formed group of queue entries, in order, in a new arena
    pub fn form(
        id: ArenaId,
        arena_type: ArenaType,
        entries: &[QueueEntry],
        settings: &ArenaSettings,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        let scheduled_start = now
            .checked_add_signed(settings.countdown()?)
            .ok_or_else(|| ArenaError::ConfigurationError {
                message: "Scheduled start is out of range".to_string(),
            })?;

        let mut players = HashMap::with_capacity(entries.len());
        let mut teams: BTreeMap<TeamId, Vec<PlayerName>> = BTreeMap::new();
        let mut roster = Vec::with_capacity(entries.len());

        for (index, entry) in entries.iter().enumerate() {
            let team = arena_type.team_for_index(index);
            players.insert(
                entry.player.clone(),
                ArenaPlayer::new(&entry.player, team, settings, now),
            );
            teams.entry(team).or_default().push(entry.player.clone());
            roster.push(entry.player.clone());
        }

        Ok(Self {
            id,
            arena_type,
            state: ArenaState::Starting,
            players,
            teams,
            roster,
            max_players: entries.len(),
            min_players: entries.len(),
            created_at: now,
            scheduled_start,
            start_time: None,
            end_time: None,
            duration_seconds: settings.match_duration_seconds,
            winner: None,
            ranked: true,
        })
    }

    /// Move from `starting` to `active`
    pub fn start(&mut self, now: DateTime<Utc>) -> Result<()> {
        if self.state != ArenaState::Starting {
            return Err(ArenaError::InvalidArenaState {
                arena_id: self.id.to_string(),
                state: self.state.to_string(),
                expected: ArenaState::Starting.to_string(),
            }
            .into());
        }

        let end_time = Duration::try_seconds(self.duration_seconds)
            .and_then(|duration| now.checked_add_signed(duration))
            .ok_or_else(|| ArenaError::ConfigurationError {
                message: format!("Match duration of {}s is out of range", self.duration_seconds),
            })?;

        self.state = ArenaState::Active;
        self.start_time = Some(now);
        self.end_time = Some(end_time);
        Ok(())
    }

    /// Fail unless the arena is `active`
    pub fn ensure_active(&self) -> Result<()> {
        if self.state != ArenaState::Active {
            return Err(ArenaError::InvalidArenaState {
                arena_id: self.id.to_string(),
                state: self.state.to_string(),
                expected: ArenaState::Active.to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Record the terminal state and outcome
    pub fn end(&mut self, winner: Option<Winner>, now: DateTime<Utc>) {
        self.state = ArenaState::Ended;
        self.winner = winner;
        self.end_time = Some(now);
    }

    pub fn is_ended(&self) -> bool {
        self.state == ArenaState::Ended
    }

    /// Whether the player still occupies a seat here
    pub fn is_seated(&self, player: &str) -> bool {
        !self.is_ended() && self.players.get(player).is_some_and(|p| !p.left)
    }

    /// Active arena that has run past its recorded end time
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.state == ArenaState::Active && self.end_time.is_some_and(|end| now > end)
    }

    pub fn player(&self, name: &str) -> Option<&ArenaPlayer> {
        self.players.get(name)
    }

    /// Alive participants in formation order
    pub fn alive_players(&self) -> Vec<&ArenaPlayer> {
        self.roster
            .iter()
            .filter_map(|name| self.players.get(name))
            .filter(|p| p.alive)
            .collect()
    }

    /// Whether any member of the team is still alive
    pub fn team_alive(&self, team: TeamId) -> bool {
        self.teams.get(&team).is_some_and(|members| {
            members
                .iter()
                .filter_map(|name| self.players.get(name))
                .any(|p| p.alive)
        })
    }

    /// Split participants into winners and losers by the recorded winner
    pub fn match_result(&self) -> MatchResult {
        let mut result = MatchResult::default();
        for player in self.roster.iter().filter_map(|name| self.players.get(name)) {
            let won = match &self.winner {
                Some(Winner::Player(name)) => *name == player.name,
                Some(Winner::Team(team)) => *team == player.team,
                None => false,
            };
            if won {
                result.winners.push(player.as_participant());
            } else {
                result.losers.push(player.as_participant());
            }
        }
        result
    }

    pub fn summary(&self) -> ArenaSummary {
        ArenaSummary {
            id: self.id,
            arena_type: self.arena_type,
            state: self.state,
            players: self.roster.clone(),
            alive: self.alive_players().len(),
            winner: self.winner.clone(),
        }
    }
}
