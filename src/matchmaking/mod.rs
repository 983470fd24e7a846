//! Matchmaking queue for the arena engine
//!
//! Players wait in one list per arena type. Each submission immediately
//! attempts formation; a formed group is handed to the manager, which seats
//! it in a new arena.

pub mod matching;
pub mod queue;

// Re-export commonly used types
pub use matching::{MatchFormer, RatingSortedFormer};
pub use queue::{MatchmakingQueue, QueueEntry};
