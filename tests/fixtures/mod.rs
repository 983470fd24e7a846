//! Shared helpers for the integration tests

#![allow(dead_code)]

use pvp_arena::config::AppConfig;
use pvp_arena::types::{ArenaId, ArenaType};
use pvp_arena::ArenaManager;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Manager with default settings
pub fn manager() -> ArenaManager {
    ArenaManager::new().expect("manager should build")
}

/// Manager with a tweaked configuration
pub fn manager_with(configure: impl FnOnce(&mut AppConfig)) -> ArenaManager {
    let mut config = AppConfig::default();
    configure(&mut config);
    ArenaManager::from_config(&config).expect("manager should build")
}

/// Deterministic shuffle source for tournament seeding
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Queue every player for `arena_type`; returns the arena the last one completed
pub fn queue_all(manager: &ArenaManager, players: &[&str], arena_type: ArenaType) -> Option<ArenaId> {
    let mut formed = None;
    for player in players {
        let outcome = manager
            .queue_for_arena(player, arena_type, 1)
            .expect("queue request should succeed");
        if let Some(id) = outcome.arena_id() {
            formed = Some(id);
        }
    }
    formed
}

/// Queue both players for a duel and start it
pub fn start_duel(manager: &ArenaManager, first: &str, second: &str) -> ArenaId {
    let arena_id = queue_all(manager, &[first, second], ArenaType::Duel).expect("duel should form");
    manager.start_arena(arena_id).expect("duel should start");
    arena_id
}

/// Attack until the target dies; returns the final message
pub fn fight_to_death(manager: &ArenaManager, arena_id: ArenaId, attacker: &str, target: &str) -> String {
    loop {
        let message = manager
            .attack_player(arena_id, attacker, target)
            .expect("attack should land");
        if message.contains("killed") {
            return message;
        }
    }
}
