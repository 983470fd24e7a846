//! Arenas: live match instances and the combat rules applied inside them
//!
//! Each arena is created by the manager from a formed queue group and is
//! guarded by its own lock. Lifecycle: starting -> active -> ended.

pub mod combat;
pub mod instance;

// Re-export commonly used types
pub use combat::{AttackOutcome, CombatResolver, MatchOver};
pub use instance::{Arena, ArenaPlayer, ArenaSummary};
