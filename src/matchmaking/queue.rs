//! Per arena-type waiting lists
//!
//! A player appears in at most one list at a time. The queue knows nothing
//! about arenas; the manager checks arena seating before calling `enqueue`.

use crate::error::{ArenaError, Result};
use crate::matchmaking::matching::{MatchFormer, RatingSortedFormer};
use crate::types::{ArenaType, PlayerName};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// A player waiting for a match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueEntry {
    pub player: PlayerName,
    /// Rating snapshot taken when the player queued
    pub rating: i32,
    pub arena_type: ArenaType,
    /// Requested team size, recorded as given
    pub team_size: usize,
    pub queued_at: DateTime<Utc>,
}

/// Waiting lists keyed by arena type
#[derive(Clone)]
pub struct MatchmakingQueue {
    queues: HashMap<ArenaType, Vec<QueueEntry>>,
    former: Arc<dyn MatchFormer>,
}

impl Default for MatchmakingQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MatchmakingQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchmakingQueue")
            .field("queues", &self.queues)
            .finish()
    }
}

impl MatchmakingQueue {
    /// Create an empty queue with rating-sorted formation
    pub fn new() -> Self {
        Self::with_former(Arc::new(RatingSortedFormer::new()))
    }

    /// Create an empty queue with a custom formation strategy
    pub fn with_former(former: Arc<dyn MatchFormer>) -> Self {
        Self {
            queues: HashMap::new(),
            former,
        }
    }

    /// Which list, if any, currently holds the player
    pub fn find_player(&self, player: &str) -> Option<ArenaType> {
        self.queues
            .iter()
            .find(|(_, entries)| entries.iter().any(|e| e.player == player))
            .map(|(arena_type, _)| *arena_type)
    }

    /// Append an entry, returning its 1-based position in its list
    pub fn enqueue(&mut self, entry: QueueEntry) -> Result<usize> {
        if entry.arena_type.required_players().is_none() {
            return Err(ArenaError::UnsupportedArenaType {
                arena_type: entry.arena_type.to_string(),
            }
            .into());
        }

        if let Some(existing) = self.find_player(&entry.player) {
            return Err(ArenaError::AlreadyQueued {
                player: entry.player.clone(),
                arena_type: existing.to_string(),
            }
            .into());
        }

        let list = self.queues.entry(entry.arena_type).or_default();
        list.push(entry);
        Ok(list.len())
    }

    /// Try to pull one arena's worth of entries out of the given list
    pub fn try_form(&mut self, arena_type: ArenaType) -> Option<Vec<QueueEntry>> {
        let list = self.queues.get_mut(&arena_type)?;
        self.former.form_match(arena_type, list)
    }

    /// Remove the player's entry from whichever list holds it
    pub fn remove(&mut self, player: &str) -> Result<QueueEntry> {
        for list in self.queues.values_mut() {
            if let Some(index) = list.iter().position(|e| e.player == player) {
                return Ok(list.remove(index));
            }
        }

        Err(ArenaError::NotQueued {
            player: player.to_string(),
        }
        .into())
    }

    /// Number of players waiting for one arena type
    pub fn len(&self, arena_type: ArenaType) -> usize {
        self.queues.get(&arena_type).map_or(0, Vec::len)
    }

    /// Number of players waiting across every list
    pub fn total_waiting(&self) -> usize {
        self.queues.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_waiting() == 0
    }

    /// Entries currently waiting for one arena type, in list order
    pub fn entries(&self, arena_type: ArenaType) -> Vec<QueueEntry> {
        self.queues.get(&arena_type).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{error_kind, ErrorKind};
    use crate::utils::current_timestamp;

    fn entry(name: &str, rating: i32, arena_type: ArenaType) -> QueueEntry {
        QueueEntry {
            player: name.to_string(),
            rating,
            arena_type,
            team_size: 1,
            queued_at: current_timestamp(),
        }
    }

    #[test]
    fn test_enqueue_and_find() {
        let mut queue = MatchmakingQueue::new();
        assert_eq!(queue.enqueue(entry("alice", 1000, ArenaType::Duel)).unwrap(), 1);
        assert_eq!(queue.find_player("alice"), Some(ArenaType::Duel));
        assert_eq!(queue.find_player("bob"), None);
        assert_eq!(queue.len(ArenaType::Duel), 1);
        assert_eq!(queue.total_waiting(), 1);
    }

    #[test]
    fn test_duplicate_across_types_rejected() {
        let mut queue = MatchmakingQueue::new();
        queue.enqueue(entry("alice", 1000, ArenaType::Duel)).unwrap();

        let err = queue
            .enqueue(entry("alice", 1000, ArenaType::FreeForAll))
            .unwrap_err();
        assert_eq!(error_kind(&err), ErrorKind::DuplicateState);
        assert_eq!(queue.total_waiting(), 1);
        assert_eq!(queue.len(ArenaType::FreeForAll), 0);
    }

    #[test]
    fn test_unsupported_type_rejected() {
        let mut queue = MatchmakingQueue::new();
        let err = queue
            .enqueue(entry("alice", 1000, ArenaType::KingOfTheHill))
            .unwrap_err();
        assert_eq!(error_kind(&err), ErrorKind::Validation);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_remove() {
        let mut queue = MatchmakingQueue::new();
        queue.enqueue(entry("alice", 1000, ArenaType::Team)).unwrap();

        let removed = queue.remove("alice").unwrap();
        assert_eq!(removed.arena_type, ArenaType::Team);
        assert!(queue.is_empty());

        let err = queue.remove("alice").unwrap_err();
        assert_eq!(error_kind(&err), ErrorKind::NotFound);
    }

    #[test]
    fn test_try_form_leaves_remainder() {
        let mut queue = MatchmakingQueue::new();
        queue.enqueue(entry("a", 1200, ArenaType::Duel)).unwrap();
        assert!(queue.try_form(ArenaType::Duel).is_none());

        queue.enqueue(entry("b", 900, ArenaType::Duel)).unwrap();
        let formed = queue.try_form(ArenaType::Duel).unwrap();
        assert_eq!(formed.len(), 2);
        assert_eq!(formed[0].player, "b");
        assert!(queue.is_empty());
    }
}
