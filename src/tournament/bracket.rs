//! Single-elimination bracket generation and advancement
//!
//! Round 1 pairs consecutive seeds; an unpaired trailing seed gets a bye.
//! Every later round has half as many matches as the one before (rounded
//! up). Match `i` of a round feeds slot `i % 2` of match `i / 2` in the next
//! round. A later-round match with only one feeder becomes a bye as soon as
//! that feeder is decided.

use crate::error::{ArenaError, Result};
use crate::types::{ArenaId, MatchId, PlayerName};
use crate::utils::generate_match_id;
use serde::{Deserialize, Serialize};

/// One bracket slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TournamentMatch {
    pub id: MatchId,
    /// 0-based round index
    pub round: usize,
    /// 0-based position within the round
    pub slot: usize,
    pub player1: Option<PlayerName>,
    pub player2: Option<PlayerName>,
    /// Unopposed slot that advanced its occupant automatically
    pub bye: bool,
    pub winner: Option<PlayerName>,
    pub score1: u32,
    pub score2: u32,
    pub arena_id: Option<ArenaId>,
    pub played: bool,
}

impl TournamentMatch {
    fn empty(round: usize, slot: usize) -> Self {
        Self {
            id: generate_match_id(),
            round,
            slot,
            player1: None,
            player2: None,
            bye: false,
            winner: None,
            score1: 0,
            score2: 0,
            arena_id: None,
            played: false,
        }
    }

    fn mark_bye(&mut self, player: PlayerName) {
        self.player1 = Some(player.clone());
        self.player2 = None;
        self.bye = true;
        self.winner = Some(player);
        self.played = true;
    }

    /// Both contestants known and not yet decided
    pub fn is_ready(&self) -> bool {
        !self.played && self.player1.is_some() && self.player2.is_some()
    }

    pub fn involves(&self, player: &str) -> bool {
        self.player1.as_deref() == Some(player) || self.player2.as_deref() == Some(player)
    }
}

/// Rounds of matches, first round first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bracket {
    pub rounds: Vec<Vec<TournamentMatch>>,
}

/// Number of matches in each round for `participants` entrants
pub fn round_sizes(participants: usize) -> Vec<usize> {
    if participants < 2 {
        return Vec::new();
    }
    let mut sizes = vec![participants.div_ceil(2)];
    while let Some(&last) = sizes.last() {
        if last <= 1 {
            break;
        }
        sizes.push(last.div_ceil(2));
    }
    sizes
}

impl Bracket {
    /// Build the full bracket from already-seeded participants
    pub fn build(seeds: &[PlayerName]) -> Self {
        let rounds = round_sizes(seeds.len())
            .into_iter()
            .enumerate()
            .map(|(round, size)| (0..size).map(|slot| TournamentMatch::empty(round, slot)).collect())
            .collect();

        let mut bracket = Self { rounds };
        if bracket.rounds.is_empty() {
            return bracket;
        }

        let mut byes = Vec::new();
        for (slot, pair) in seeds.chunks(2).enumerate() {
            let game = &mut bracket.rounds[0][slot];
            match pair {
                [first, second] => {
                    game.player1 = Some(first.clone());
                    game.player2 = Some(second.clone());
                }
                [only] => {
                    game.mark_bye(only.clone());
                    byes.push((slot, only.clone()));
                }
                _ => {}
            }
        }

        for (slot, player) in byes {
            bracket.advance(0, slot, player);
        }
        bracket
    }

    pub fn round_count(&self) -> usize {
        self.rounds.len()
    }

    /// Locate a match by id as (round, slot)
    pub fn position_of(&self, match_id: MatchId) -> Option<(usize, usize)> {
        self.rounds.iter().enumerate().find_map(|(round, games)| {
            games
                .iter()
                .position(|game| game.id == match_id)
                .map(|slot| (round, slot))
        })
    }

    pub fn get(&self, match_id: MatchId) -> Option<&TournamentMatch> {
        let (round, slot) = self.position_of(match_id)?;
        self.rounds.get(round).and_then(|games| games.get(slot))
    }

    /// Decide a ready match and push its winner forward
    pub fn record_result(
        &mut self,
        match_id: MatchId,
        winner: &str,
        scores: (u32, u32),
        arena_id: Option<ArenaId>,
    ) -> Result<()> {
        let (round, slot) = self
            .position_of(match_id)
            .ok_or_else(|| ArenaError::TournamentMatchNotFound {
                match_id: match_id.to_string(),
            })?;

        let game = &mut self.rounds[round][slot];
        if game.played {
            return Err(ArenaError::InvalidMatchResult {
                reason: format!("match {} has already been played", match_id),
            }
            .into());
        }
        if !game.is_ready() {
            return Err(ArenaError::InvalidMatchResult {
                reason: format!("match {} is still waiting for contestants", match_id),
            }
            .into());
        }
        if !game.involves(winner) {
            return Err(ArenaError::InvalidMatchResult {
                reason: format!("{} is not playing in match {}", winner, match_id),
            }
            .into());
        }

        game.winner = Some(winner.to_string());
        game.score1 = scores.0;
        game.score2 = scores.1;
        game.arena_id = arena_id;
        game.played = true;

        self.advance(round, slot, winner.to_string());
        Ok(())
    }

    /// Slot a decided winner into the next round, resolving byes on the way
    fn advance(&mut self, round: usize, slot: usize, winner: PlayerName) {
        let next_round = round + 1;
        if next_round >= self.rounds.len() {
            return;
        }

        let feeders_in_round = self.rounds[round].len();
        let target_slot = slot / 2;
        let sibling = if slot % 2 == 0 { slot + 1 } else { slot - 1 };
        let has_sibling = sibling < feeders_in_round;

        let target = &mut self.rounds[next_round][target_slot];
        if !has_sibling {
            target.mark_bye(winner.clone());
            self.advance(next_round, target_slot, winner);
            return;
        }

        if slot % 2 == 0 {
            target.player1 = Some(winner);
        } else {
            target.player2 = Some(winner);
        }
    }

    /// Whether every match in the round has been decided
    pub fn round_complete(&self, round: usize) -> bool {
        self.rounds
            .get(round)
            .is_some_and(|games| games.iter().all(|game| game.played))
    }

    /// Winner of the final, once played
    pub fn champion(&self) -> Option<&PlayerName> {
        self.rounds
            .last()
            .and_then(|games| games.first())
            .and_then(|game| game.winner.as_ref())
    }

    /// Matches that can be played right now
    pub fn ready_matches(&self) -> Vec<&TournamentMatch> {
        self.rounds.iter().flatten().filter(|game| game.is_ready()).collect()
    }
}
