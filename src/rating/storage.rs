//! Rating storage interface and the in-memory implementation
//!
//! The store itself holds no lock: it lives inside the arena manager's state
//! and is guarded by the manager-wide lock like the queues and registries.

use crate::types::{PlayerName, Tier};
use crate::utils::current_timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Career record for one player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingRecord {
    pub player: PlayerName,
    pub rating: i32,
    pub wins: u32,
    pub losses: u32,
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
    pub current_streak: u32,
    pub best_streak: u32,
    pub total_matches: u32,
    pub last_match_at: Option<DateTime<Utc>>,
    pub season_wins: u32,
    pub season_losses: u32,
    pub created_at: DateTime<Utc>,
}

impl RatingRecord {
    /// Create a fresh record for a player who has never played
    pub fn new(player: &str, initial_rating: i32) -> Self {
        Self {
            player: player.to_string(),
            rating: initial_rating,
            wins: 0,
            losses: 0,
            kills: 0,
            deaths: 0,
            assists: 0,
            current_streak: 0,
            best_streak: 0,
            total_matches: 0,
            last_match_at: None,
            season_wins: 0,
            season_losses: 0,
            created_at: current_timestamp(),
        }
    }

    /// Tier derived from the current rating
    pub fn tier(&self) -> Tier {
        Tier::from_rating(self.rating)
    }

    /// Win percentage over decided matches, 0.0 when none
    pub fn win_rate(&self) -> f64 {
        let decided = self.wins + self.losses;
        if decided == 0 {
            0.0
        } else {
            self.wins as f64 * 100.0 / decided as f64
        }
    }

    /// Record a win and extend the streak
    pub fn record_win(&mut self) {
        self.wins += 1;
        self.season_wins += 1;
        self.current_streak += 1;
        self.best_streak = self.best_streak.max(self.current_streak);
    }

    /// Record a loss and break the streak
    pub fn record_loss(&mut self) {
        self.losses += 1;
        self.season_losses += 1;
        self.current_streak = 0;
    }

    /// Fold one match's combat counters into the career totals
    pub fn record_match(&mut self, kills: u32, deaths: u32, assists: u32, at: DateTime<Utc>) {
        self.kills += kills;
        self.deaths += deaths;
        self.assists += assists;
        self.total_matches += 1;
        self.last_match_at = Some(at);
    }
}

/// Trait for rating storage operations
#[cfg_attr(test, mockall::automock)]
pub trait RatingStorage: Send + Sync {
    /// Get a player's record
    fn get_rating(&self, player: &str) -> Option<RatingRecord>;

    /// Store or replace a player's record
    fn store_rating(&mut self, record: RatingRecord);

    /// Snapshot of every record
    fn all_ratings(&self) -> Vec<RatingRecord>;

    /// Number of rated players
    fn player_count(&self) -> usize;

    /// Get a player's record, creating it on first lookup
    fn get_or_create(&mut self, player: &str, initial_rating: i32) -> RatingRecord {
        if let Some(record) = self.get_rating(player) {
            return record;
        }
        let record = RatingRecord::new(player, initial_rating);
        self.store_rating(record.clone());
        record
    }

    /// Records sorted by rating descending, ties by name, truncated to `limit`
    fn top_ratings(&self, limit: usize) -> Vec<RatingRecord> {
        let mut records = self.all_ratings();
        records.sort_by(|a, b| b.rating.cmp(&a.rating).then_with(|| a.player.cmp(&b.player)));
        records.truncate(limit);
        records
    }

    /// Zero every season counter, returning how many records were touched
    fn reset_season(&mut self) -> usize {
        let records = self.all_ratings();
        let count = records.len();
        for mut record in records {
            record.season_wins = 0;
            record.season_losses = 0;
            self.store_rating(record);
        }
        count
    }
}

/// In-memory rating storage implementation
#[derive(Debug, Default)]
pub struct InMemoryRatingStorage {
    ratings: HashMap<PlayerName, RatingRecord>,
}

impl InMemoryRatingStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RatingStorage for InMemoryRatingStorage {
    fn get_rating(&self, player: &str) -> Option<RatingRecord> {
        self.ratings.get(player).cloned()
    }

    fn store_rating(&mut self, record: RatingRecord) {
        self.ratings.insert(record.player.clone(), record);
    }

    fn all_ratings(&self) -> Vec<RatingRecord> {
        self.ratings.values().cloned().collect()
    }

    fn player_count(&self) -> usize {
        self.ratings.len()
    }
}
