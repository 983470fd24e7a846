//! Combat resolution inside an arena
//!
//! Attacks deal the attacker's flat damage. A lethal hit credits the kill,
//! credits an assist to the most recent other player who damaged the target,
//! and runs the type-specific match-end check.

use crate::arena::instance::Arena;
use crate::error::{ArenaError, Result};
use crate::types::{ArenaState, ArenaType, PlayerName, Winner};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// What a successful attack did
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttackOutcome {
    Hit {
        target: PlayerName,
        damage: i32,
        remaining_hp: i32,
        max_hp: i32,
    },
    Kill {
        target: PlayerName,
        assist: Option<PlayerName>,
        score_awarded: u32,
        /// Set when the kill ended the match
        match_over: Option<MatchOver>,
    },
}

/// Terminal information attached to the action that ended a match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchOver {
    pub winner: Option<Winner>,
}

impl AttackOutcome {
    /// Human-readable line relayed to the attacker
    pub fn message(&self) -> String {
        match self {
            AttackOutcome::Hit {
                target,
                damage,
                remaining_hp,
                max_hp,
            } => format!(
                "You hit {} for {} damage. {} has {}/{} HP left.",
                target, damage, target, remaining_hp, max_hp
            ),
            AttackOutcome::Kill {
                target,
                score_awarded,
                match_over,
                ..
            } => {
                let mut message = format!("You killed {}! (+{} score)", target, score_awarded);
                if let Some(over) = match_over {
                    message.push(' ');
                    message.push_str(&over.message());
                }
                message
            }
        }
    }

    pub fn match_over(&self) -> Option<&MatchOver> {
        match self {
            AttackOutcome::Kill { match_over, .. } => match_over.as_ref(),
            AttackOutcome::Hit { .. } => None,
        }
    }
}

impl MatchOver {
    pub fn message(&self) -> String {
        match &self.winner {
            Some(winner) => format!("The match is over. Winner: {}", winner),
            None => "The match is over. No winner.".to_string(),
        }
    }
}

/// Applies attacks and forfeits to an arena
#[derive(Debug, Clone)]
pub struct CombatResolver {
    kill_score: u32,
}

impl CombatResolver {
    pub fn new(kill_score: u32) -> Self {
        Self { kill_score }
    }

    /// Resolve one attack. All checks run before any state changes.
    pub fn attack(
        &self,
        arena: &mut Arena,
        attacker: &str,
        target: &str,
        now: DateTime<Utc>,
    ) -> Result<AttackOutcome> {
        arena.ensure_active()?;

        let attacker_state = arena
            .players
            .get(attacker)
            .ok_or_else(|| ArenaError::PlayerNotFound {
                player: attacker.to_string(),
            })?;
        if !attacker_state.alive {
            return Err(ArenaError::PlayerDead {
                player: attacker.to_string(),
            }
            .into());
        }
        let attacker_team = attacker_state.team;
        let damage = attacker_state.damage;

        let target_state = arena
            .players
            .get(target)
            .ok_or_else(|| ArenaError::PlayerNotFound {
                player: target.to_string(),
            })?;
        if !target_state.alive {
            return Err(ArenaError::PlayerDead {
                player: target.to_string(),
            }
            .into());
        }

        if attacker == target
            || (arena.arena_type == ArenaType::Team
                && attacker_team != 0
                && attacker_team == target_state.team)
        {
            return Err(ArenaError::FriendlyFire {
                attacker: attacker.to_string(),
                target: target.to_string(),
            }
            .into());
        }

        // Validated; mutate from here on
        let Some(target_state) = arena.players.get_mut(target) else {
            return Err(ArenaError::PlayerNotFound {
                player: target.to_string(),
            }
            .into());
        };
        if let Some(previous) = target_state
            .last_attacker
            .replace(attacker.to_string())
            .filter(|name| name != attacker)
        {
            target_state.assist_candidate = Some(previous);
        }
        target_state.hp -= damage;

        if target_state.hp > 0 {
            debug!(
                "Arena {} - '{}' hit '{}' for {} ({} HP left)",
                arena.id, attacker, target, damage, target_state.hp
            );
            return Ok(AttackOutcome::Hit {
                target: target.to_string(),
                damage,
                remaining_hp: target_state.hp,
                max_hp: target_state.max_hp,
            });
        }

        target_state.hp = 0;
        target_state.alive = false;
        target_state.deaths += 1;
        let assist = target_state
            .assist_candidate
            .take()
            .filter(|name| name != attacker);

        if let Some(killer) = arena.players.get_mut(attacker) {
            killer.kills += 1;
            killer.score += self.kill_score;
        }

        if let Some(helper) = assist.as_ref().and_then(|name| arena.players.get_mut(name)) {
            helper.assists += 1;
        }

        debug!(
            "Arena {} - '{}' killed '{}' (assist: {:?})",
            arena.id, attacker, target, assist
        );

        let match_over = self.check_match_end(arena, now);

        Ok(AttackOutcome::Kill {
            target: target.to_string(),
            assist,
            score_awarded: self.kill_score,
            match_over,
        })
    }

    /// Remove a player from play. Counts as a death with no kill credit.
    pub fn forfeit(
        &self,
        arena: &mut Arena,
        player: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<MatchOver>> {
        if arena.state == ArenaState::Ended {
            return Err(ArenaError::InvalidArenaState {
                arena_id: arena.id.to_string(),
                state: arena.state.to_string(),
                expected: format!("{} or {}", ArenaState::Starting, ArenaState::Active),
            }
            .into());
        }

        let Some(state) = arena.players.get_mut(player).filter(|p| !p.left) else {
            return Err(ArenaError::NotInArena {
                player: player.to_string(),
            }
            .into());
        };

        state.left = true;
        if state.alive {
            state.alive = false;
            state.hp = 0;
            state.deaths += 1;
        }

        Ok(self.check_match_end(arena, now))
    }

    /// End the arena if its type's terminal condition holds
    pub fn check_match_end(&self, arena: &mut Arena, now: DateTime<Utc>) -> Option<MatchOver> {
        let outcome = match arena.arena_type {
            ArenaType::Duel | ArenaType::FreeForAll | ArenaType::KingOfTheHill => {
                let alive = arena.alive_players();
                if alive.len() <= 1 {
                    Some(alive.first().map(|p| Winner::Player(p.name.clone())))
                } else {
                    None
                }
            }
            ArenaType::Team => {
                let teams: Vec<_> = arena.teams.keys().copied().collect();
                teams
                    .iter()
                    .find(|team| !arena.team_alive(**team))
                    .map(|eliminated| {
                        teams
                            .iter()
                            .find(|team| *team != eliminated && arena.team_alive(**team))
                            .map(|team| Winner::Team(*team))
                    })
            }
        };

        let winner = outcome?;
        arena.end(winner.clone(), now);
        Some(MatchOver { winner })
    }
}
