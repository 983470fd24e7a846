//! ELO rating updates applied when a ranked arena ends
//!
//! Both sides are reduced to their average rating, the winning side's
//! expected score comes from the standard logistic curve, and the resulting
//! delta is applied symmetrically: winners gain it, losers lose it (never
//! dropping below zero).

use crate::config::RatingSettings;
use crate::rating::storage::{RatingRecord, RatingStorage};
use crate::types::{PlayerName, Tier};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use skillratings::elo::{expected_score, EloRating};
use tracing::{debug, info};

/// One participant's contribution to a finished match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchParticipant {
    pub player: PlayerName,
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
}

/// A finished match split into winning and losing sides
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchResult {
    pub winners: Vec<MatchParticipant>,
    pub losers: Vec<MatchParticipant>,
}

/// Rating change information for a player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingChange {
    pub player: PlayerName,
    pub old_rating: i32,
    pub new_rating: i32,
    pub won: bool,
    pub tier: Tier,
}

impl RatingChange {
    pub fn delta(&self) -> i32 {
        self.new_rating - self.old_rating
    }
}

/// Expected score of a side rated `rating` against a side rated `opponent`
pub fn win_probability(rating: f64, opponent: f64) -> f64 {
    let (expected, _) = expected_score(&EloRating { rating }, &EloRating { rating: opponent });
    expected
}

/// Applies ELO adjustments and career counters to a rating store
#[derive(Debug, Clone)]
pub struct EloRatingUpdater {
    settings: RatingSettings,
}

impl Default for EloRatingUpdater {
    fn default() -> Self {
        Self::new(RatingSettings::default())
    }
}

impl EloRatingUpdater {
    pub fn new(settings: RatingSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &RatingSettings {
        &self.settings
    }

    /// Points moved from the losing side to the winning side.
    ///
    /// Never below 1, so a decided ranked match always moves both sides.
    pub fn rating_delta(&self, winner_avg: f64, loser_avg: f64) -> i32 {
        let expected = win_probability(winner_avg, loser_avg);
        let delta = (self.settings.k_factor * (1.0 - expected)).round() as i32;
        delta.max(1)
    }

    fn load(&self, storage: &dyn RatingStorage, player: &str) -> RatingRecord {
        storage
            .get_rating(player)
            .unwrap_or_else(|| RatingRecord::new(player, self.settings.initial_rating))
    }

    fn average_rating(records: &[RatingRecord]) -> f64 {
        if records.is_empty() {
            return 0.0;
        }
        records.iter().map(|r| r.rating as f64).sum::<f64>() / records.len() as f64
    }

    /// Apply a decided match to the store and report every rating change
    pub fn apply(
        &self,
        storage: &mut dyn RatingStorage,
        result: &MatchResult,
        finished_at: DateTime<Utc>,
    ) -> Vec<RatingChange> {
        if result.winners.is_empty() || result.losers.is_empty() {
            self.apply_undecided(storage, result, finished_at);
            return Vec::new();
        }

        let winner_records: Vec<_> = result
            .winners
            .iter()
            .map(|p| self.load(&*storage, &p.player))
            .collect();
        let loser_records: Vec<_> = result
            .losers
            .iter()
            .map(|p| self.load(&*storage, &p.player))
            .collect();

        let winner_avg = Self::average_rating(&winner_records);
        let loser_avg = Self::average_rating(&loser_records);
        let delta = self.rating_delta(winner_avg, loser_avg);

        debug!(
            "ELO update - winner_avg: {:.1}, loser_avg: {:.1}, delta: {}",
            winner_avg, loser_avg, delta
        );

        let mut changes = Vec::with_capacity(winner_records.len() + loser_records.len());

        for (mut record, participant) in winner_records.into_iter().zip(&result.winners) {
            let old_rating = record.rating;
            record.rating += delta;
            record.record_win();
            record.record_match(
                participant.kills,
                participant.deaths,
                participant.assists,
                finished_at,
            );
            changes.push(RatingChange {
                player: record.player.clone(),
                old_rating,
                new_rating: record.rating,
                won: true,
                tier: record.tier(),
            });
            storage.store_rating(record);
        }

        for (mut record, participant) in loser_records.into_iter().zip(&result.losers) {
            let old_rating = record.rating;
            record.rating = (record.rating - delta).max(0);
            record.record_loss();
            record.record_match(
                participant.kills,
                participant.deaths,
                participant.assists,
                finished_at,
            );
            changes.push(RatingChange {
                player: record.player.clone(),
                old_rating,
                new_rating: record.rating,
                won: false,
                tier: record.tier(),
            });
            storage.store_rating(record);
        }

        for change in &changes {
            info!(
                "Rating updated - player: '{}', {} -> {} ({:+}), tier: {}",
                change.player,
                change.old_rating,
                change.new_rating,
                change.delta(),
                change.tier
            );
        }

        changes
    }

    /// Fold combat counters for a match that ended without a winner
    fn apply_undecided(
        &self,
        storage: &mut dyn RatingStorage,
        result: &MatchResult,
        finished_at: DateTime<Utc>,
    ) {
        for participant in result.winners.iter().chain(&result.losers) {
            let mut record = self.load(&*storage, &participant.player);
            record.record_match(
                participant.kills,
                participant.deaths,
                participant.assists,
                finished_at,
            );
            storage.store_rating(record);
        }
        debug!(
            "Match ended without a decided winner, {} records touched, ratings unchanged",
            result.winners.len() + result.losers.len()
        );
    }
}
