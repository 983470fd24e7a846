//! Tournament lifecycle: registration, seeding and result reporting

use super::bracket::Bracket;
use crate::error::{ArenaError, Result};
use crate::types::{ArenaId, ArenaType, MatchId, PlayerName, TournamentId, TournamentState};
use crate::utils::{generate_tournament_id, is_power_of_two_in_range};
use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

pub const MIN_TOURNAMENT_PLAYERS: usize = 2;
pub const MAX_TOURNAMENT_PLAYERS: usize = 64;

/// Prizes handed to the champion
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TournamentRewards {
    pub gold: u64,
    pub title: Option<String>,
    pub items: Vec<String>,
}

impl TournamentRewards {
    pub fn is_empty(&self) -> bool {
        self.gold == 0 && self.title.is_none() && self.items.is_empty()
    }

    pub fn describe(&self) -> String {
        if self.is_empty() {
            return "none".to_string();
        }

        let mut parts = Vec::new();
        if self.gold > 0 {
            parts.push(format!("{} gold", self.gold));
        }
        if let Some(title) = &self.title {
            parts.push(format!("title \"{}\"", title));
        }
        parts.extend(self.items.iter().cloned());
        parts.join(", ")
    }
}

/// What a reported result did to the tournament
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportOutcome {
    Recorded,
    /// Moved on to the given 0-based round
    RoundAdvanced { round: usize },
    Completed { champion: PlayerName },
}

/// Single-elimination tournament over its own participant pool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub arena_type: ArenaType,
    pub state: TournamentState,
    pub max_players: usize,
    /// Registration order
    pub participants: Vec<PlayerName>,
    pub bracket: Bracket,
    /// 0-based index of the earliest round with unplayed matches
    pub current_round: usize,
    pub champion: Option<PlayerName>,
    pub rewards: TournamentRewards,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Listing row for a tournament
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TournamentSummary {
    pub id: TournamentId,
    pub name: String,
    pub arena_type: ArenaType,
    pub state: TournamentState,
    pub participants: usize,
    pub max_players: usize,
    pub champion: Option<PlayerName>,
}

impl Tournament {
    pub fn new(
        name: &str,
        arena_type: ArenaType,
        max_players: usize,
        rewards: TournamentRewards,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        if !is_power_of_two_in_range(max_players, MIN_TOURNAMENT_PLAYERS, MAX_TOURNAMENT_PLAYERS) {
            return Err(ArenaError::InvalidTournamentSize { max_players }.into());
        }

        Ok(Self {
            id: generate_tournament_id(),
            name: name.trim().to_string(),
            arena_type,
            state: TournamentState::Registration,
            max_players,
            participants: Vec::new(),
            bracket: Bracket::default(),
            current_round: 0,
            champion: None,
            rewards,
            created_at: now,
            started_at: None,
            completed_at: None,
        })
    }

    fn ensure_state(&self, expected: TournamentState) -> Result<()> {
        if self.state != expected {
            return Err(ArenaError::InvalidTournamentState {
                tournament: self.name.clone(),
                state: self.state.to_string(),
                expected: expected.to_string(),
            }
            .into());
        }
        Ok(())
    }

    pub fn is_full(&self) -> bool {
        self.participants.len() >= self.max_players
    }

    pub fn is_registered(&self, player: &str) -> bool {
        self.participants.iter().any(|p| p == player)
    }

    /// Register a player; returns the new participant count
    pub fn join(&mut self, player: &str) -> Result<usize> {
        self.ensure_state(TournamentState::Registration)?;
        if self.is_registered(player) {
            return Err(ArenaError::AlreadyRegistered {
                player: player.to_string(),
                tournament: self.name.clone(),
            }
            .into());
        }
        if self.is_full() {
            return Err(ArenaError::TournamentFull {
                tournament: self.name.clone(),
                max_players: self.max_players,
            }
            .into());
        }

        self.participants.push(player.to_string());
        Ok(self.participants.len())
    }

    /// Close registration, shuffle the roster and build the bracket
    pub fn start<R: Rng + ?Sized>(&mut self, rng: &mut R, now: DateTime<Utc>) -> Result<()> {
        self.ensure_state(TournamentState::Registration)?;
        if self.participants.len() < MIN_TOURNAMENT_PLAYERS {
            return Err(ArenaError::NotEnoughParticipants {
                tournament: self.name.clone(),
                count: self.participants.len(),
            }
            .into());
        }

        let mut seeds = self.participants.clone();
        seeds.shuffle(rng);

        self.bracket = Bracket::build(&seeds);
        self.state = TournamentState::Active;
        self.started_at = Some(now);
        self.current_round = 0;
        Ok(())
    }

    /// Record a match result and move the bracket forward
    pub fn report(
        &mut self,
        match_id: MatchId,
        winner: &str,
        scores: (u32, u32),
        arena_id: Option<ArenaId>,
        now: DateTime<Utc>,
    ) -> Result<ReportOutcome> {
        self.ensure_state(TournamentState::Active)?;
        self.bracket.record_result(match_id, winner, scores, arena_id)?;

        if let Some(champion) = self.bracket.champion().cloned() {
            self.champion = Some(champion.clone());
            self.state = TournamentState::Completed;
            self.completed_at = Some(now);
            self.current_round = self.bracket.round_count().saturating_sub(1);
            return Ok(ReportOutcome::Completed { champion });
        }

        let before = self.current_round;
        while self.bracket.round_complete(self.current_round)
            && self.current_round + 1 < self.bracket.round_count()
        {
            self.current_round += 1;
        }

        if self.current_round != before {
            Ok(ReportOutcome::RoundAdvanced {
                round: self.current_round,
            })
        } else {
            Ok(ReportOutcome::Recorded)
        }
    }

    pub fn summary(&self) -> TournamentSummary {
        TournamentSummary {
            id: self.id,
            name: self.name.clone(),
            arena_type: self.arena_type,
            state: self.state,
            participants: self.participants.len(),
            max_players: self.max_players,
            champion: self.champion.clone(),
        }
    }
}
