//! Match formation: choosing which queued entries become an arena
//!
//! Formation only runs when a new entry is submitted. There is no periodic
//! re-check and no widening of rating windows over time.

use crate::matchmaking::queue::QueueEntry;
use crate::types::ArenaType;

/// Trait for match formation algorithms
pub trait MatchFormer: Send + Sync {
    /// Remove and return the entries for one arena, or `None` if the queue is
    /// not ready. Entries left behind stay queued for the next attempt.
    fn form_match(&self, arena_type: ArenaType, queue: &mut Vec<QueueEntry>)
        -> Option<Vec<QueueEntry>>;
}

/// Sorts the waiting list by rating so neighbours in skill are consumed together
#[derive(Debug, Default, Clone)]
pub struct RatingSortedFormer;

impl RatingSortedFormer {
    pub fn new() -> Self {
        Self
    }
}

impl MatchFormer for RatingSortedFormer {
    fn form_match(
        &self,
        arena_type: ArenaType,
        queue: &mut Vec<QueueEntry>,
    ) -> Option<Vec<QueueEntry>> {
        let required = arena_type.required_players()?;
        if queue.len() < required {
            return None;
        }

        // Stable sort keeps earlier arrivals first among equal ratings
        queue.sort_by_key(|entry| entry.rating);
        Some(queue.drain(..required).collect())
    }
}
