//! Arena manager: the single owner of queues, arenas, tournaments and ratings
//!
//! All public operations run synchronously on the caller's thread. The
//! manager-wide lock guards the queue, both registries and the rating store;
//! each arena carries its own lock for player state. Locks are always taken
//! manager first, arena second.

use crate::arena::{Arena, ArenaSummary, AttackOutcome, CombatResolver, MatchOver};
use crate::config::{validate_config, AppConfig, ArenaSettings, RatingSettings};
use crate::error::{error_kind, ArenaError, ErrorKind, Result};
use crate::matchmaking::{MatchFormer, MatchmakingQueue, QueueEntry, RatingSortedFormer};
use crate::metrics::MetricsCollector;
use crate::rating::{EloRatingUpdater, InMemoryRatingStorage, RatingChange, RatingRecord, RatingStorage};
use crate::report;
use crate::tournament::{ReportOutcome, Tournament, TournamentRewards, TournamentSummary};
use crate::types::{ArenaId, ArenaType, MatchId, PlayerName, QueueOutcome, TournamentId};
use crate::utils::{current_timestamp, generate_arena_id, normalize_name};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};

/// Lifetime counters kept by the manager
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManagerCounters {
    pub players_queued: u64,
    pub arenas_formed: u64,
    pub arenas_ended: u64,
    pub arenas_cleaned: u64,
    pub matches_rated: u64,
    pub tournaments_created: u64,
    pub tournaments_completed: u64,
}

/// Point-in-time view of the manager
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManagerStats {
    /// Registered arenas that have not ended
    pub live_arenas: usize,
    /// Ended arenas still awaiting housekeeping
    pub ended_arenas: usize,
    /// Waiting players per playable arena type
    pub queue_sizes: Vec<(ArenaType, usize)>,
    pub players_waiting: usize,
    pub tournaments: usize,
    pub rated_players: usize,
    pub counters: ManagerCounters,
}

/// What a housekeeping pass did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HousekeepingReport {
    /// Overdue arenas ended without a winner
    pub reaped: usize,
    /// Ended arenas removed from the registry
    pub cleaned: usize,
}

struct ManagerState {
    queue: MatchmakingQueue,
    arenas: HashMap<ArenaId, Arc<Mutex<Arena>>>,
    tournaments: HashMap<TournamentId, Tournament>,
    storage: Box<dyn RatingStorage>,
    counters: ManagerCounters,
}

/// The main arena manager
#[derive(Clone)]
pub struct ArenaManager {
    state: Arc<RwLock<ManagerState>>,
    arena_settings: ArenaSettings,
    combat: CombatResolver,
    updater: EloRatingUpdater,
    metrics: Arc<MetricsCollector>,
}

fn lock_arena(arena: &Mutex<Arena>) -> Result<MutexGuard<'_, Arena>> {
    arena
        .lock()
        .map_err(|_| ArenaError::lock_poisoned("arena").into())
}

fn kind_label(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::DuplicateState => "duplicate_state",
        ErrorKind::NotFound => "not_found",
        ErrorKind::InvalidTransition => "invalid_transition",
        ErrorKind::Validation => "validation",
        ErrorKind::Internal => "internal",
    }
}

impl ArenaManager {
    /// Create a manager with default settings, in-memory ratings and its own metrics
    pub fn new() -> Result<Self> {
        Self::from_config(&AppConfig::default())
    }

    /// Create a manager from loaded configuration
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        validate_config(config)?;
        let metrics = Arc::new(MetricsCollector::new()?);
        Self::with_metrics(config, metrics)
    }

    /// Create a manager that reports into an existing collector
    pub fn with_metrics(config: &AppConfig, metrics: Arc<MetricsCollector>) -> Result<Self> {
        validate_config(config)?;
        Self::with_components(
            config.arena.clone(),
            config.rating.clone(),
            Box::new(InMemoryRatingStorage::new()),
            Arc::new(RatingSortedFormer::new()),
            metrics,
        )
    }

    /// Create with a custom rating store and match former
    pub fn with_components(
        arena_settings: ArenaSettings,
        rating_settings: RatingSettings,
        storage: Box<dyn RatingStorage>,
        former: Arc<dyn MatchFormer>,
        metrics: Arc<MetricsCollector>,
    ) -> Result<Self> {
        arena_settings.validate()?;

        Ok(Self {
            state: Arc::new(RwLock::new(ManagerState {
                queue: MatchmakingQueue::with_former(former),
                arenas: HashMap::new(),
                tournaments: HashMap::new(),
                storage,
                counters: ManagerCounters::default(),
            })),
            combat: CombatResolver::new(arena_settings.kill_score),
            arena_settings,
            updater: EloRatingUpdater::new(rating_settings),
            metrics,
        })
    }

    pub fn metrics(&self) -> Arc<MetricsCollector> {
        self.metrics.clone()
    }

    pub fn arena_settings(&self) -> &ArenaSettings {
        &self.arena_settings
    }

    fn read_state(&self) -> Result<RwLockReadGuard<'_, ManagerState>> {
        self.state
            .read()
            .map_err(|_| ArenaError::lock_poisoned("manager").into())
    }

    fn write_state(&self) -> Result<RwLockWriteGuard<'_, ManagerState>> {
        self.state
            .write()
            .map_err(|_| ArenaError::lock_poisoned("manager").into())
    }

    fn player_name(player: &str) -> Result<PlayerName> {
        let name = normalize_name(player);
        if name.is_empty() {
            return Err(ArenaError::InvalidPlayerName {
                player: player.to_string(),
            }
            .into());
        }
        Ok(name)
    }

    fn find_arena(state: &ManagerState, arena_id: ArenaId) -> Result<Arc<Mutex<Arena>>> {
        state
            .arenas
            .get(&arena_id)
            .cloned()
            .ok_or_else(|| {
                ArenaError::ArenaNotFound {
                    arena_id: arena_id.to_string(),
                }
                .into()
            })
    }

    /// Live arena in which the player still holds a seat
    fn seated_arena(state: &ManagerState, player: &str) -> Result<Option<(ArenaId, Arc<Mutex<Arena>>)>> {
        for (id, arena) in &state.arenas {
            if lock_arena(arena)?.is_seated(player) {
                return Ok(Some((*id, arena.clone())));
            }
        }
        Ok(None)
    }

    /// Drop every ended arena from the registry
    fn purge_ended(&self, state: &mut ManagerState) -> Result<usize> {
        let mut ended = Vec::new();
        for (id, arena) in &state.arenas {
            if lock_arena(arena)?.is_ended() {
                ended.push(*id);
            }
        }

        for id in &ended {
            state.arenas.remove(id);
        }

        if !ended.is_empty() {
            state.counters.arenas_cleaned += ended.len() as u64;
            self.metrics.record_arenas_cleaned(ended.len());
            debug!("Removed {} ended arenas from the registry", ended.len());
        }
        Ok(ended.len())
    }

    /// Book-keeping for an arena that just reached `ended`
    fn settle_arena(
        &self,
        state: &mut ManagerState,
        arena: &Arena,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Vec<RatingChange> {
        state.counters.arenas_ended += 1;
        self.metrics.record_arena_ended(arena.arena_type, reason);

        info!(
            "Arena {} ended - type: {}, winner: {}, reason: {}",
            arena.id,
            arena.arena_type,
            arena
                .winner
                .as_ref()
                .map_or_else(|| "none".to_string(), ToString::to_string),
            reason
        );

        if !arena.ranked {
            return Vec::new();
        }

        let timer = self.metrics.start_timer();
        let changes = self
            .updater
            .apply(state.storage.as_mut(), &arena.match_result(), now);
        if !changes.is_empty() {
            state.counters.matches_rated += 1;
            let ratings: Vec<i32> = changes.iter().map(|c| c.new_rating).collect();
            self.metrics.record_rating_updates(&ratings, timer.stop());
        }
        changes
    }

    fn end_reason(over: &MatchOver) -> &'static str {
        if over.winner.is_some() {
            "victory"
        } else {
            "undecided"
        }
    }

    /// Queue a player and try to form an arena of the requested type
    pub fn queue_for_arena(
        &self,
        player: &str,
        arena_type: ArenaType,
        team_size: usize,
    ) -> Result<QueueOutcome> {
        let timer = self.metrics.start_timer();
        let result = self.queue_for_arena_inner(player, arena_type, team_size);

        match &result {
            Ok(QueueOutcome::Matched(_)) => self.metrics.record_queue_request(arena_type, "matched"),
            Ok(QueueOutcome::Queued { .. }) => self.metrics.record_queue_request(arena_type, "queued"),
            Err(e) => {
                warn!("Queue request rejected - player: '{}', type: {}: {}", player, arena_type, e);
                self.metrics.record_queue_request(arena_type, "rejected");
            }
        }
        self.metrics.record_operation("queue_for_arena", timer.stop());
        result
    }

    fn queue_for_arena_inner(
        &self,
        player: &str,
        arena_type: ArenaType,
        team_size: usize,
    ) -> Result<QueueOutcome> {
        let name = Self::player_name(player)?;
        let required = arena_type
            .required_players()
            .ok_or_else(|| ArenaError::UnsupportedArenaType {
                arena_type: arena_type.to_string(),
            })?;

        let mut state = self.write_state()?;

        if let Some(existing) = state.queue.find_player(&name) {
            return Err(ArenaError::AlreadyQueued {
                player: name,
                arena_type: existing.to_string(),
            }
            .into());
        }
        if let Some((arena_id, _)) = Self::seated_arena(&state, &name)? {
            return Err(ArenaError::AlreadyInArena {
                player: name,
                arena_id: arena_id.to_string(),
            }
            .into());
        }

        // Accepted; ended arenas go before the new entry is recorded
        self.purge_ended(&mut state)?;

        let now = current_timestamp();
        let initial_rating = self.updater.settings().initial_rating;
        let record = state.storage.get_or_create(&name, initial_rating);

        let position = state.queue.enqueue(QueueEntry {
            player: name.clone(),
            rating: record.rating,
            arena_type,
            team_size,
            queued_at: now,
        })?;
        state.counters.players_queued += 1;

        info!(
            "Player queued - player: '{}', type: {}, rating: {}, position: {}/{}",
            name, arena_type, record.rating, position, required
        );

        let Some(group) = state.queue.try_form(arena_type) else {
            let waiting = state.queue.len(arena_type);
            return Ok(QueueOutcome::Queued { position, waiting });
        };

        let arena = Arena::form(generate_arena_id(), arena_type, &group, &self.arena_settings, now)?;
        let arena_id = arena.id;

        info!(
            "Arena formed - id: {}, type: {}, players: [{}]",
            arena_id,
            arena_type,
            arena.roster.join(", ")
        );

        state.arenas.insert(arena_id, Arc::new(Mutex::new(arena)));
        state.counters.arenas_formed += 1;
        self.metrics.record_arena_formed(arena_type);

        Ok(QueueOutcome::Matched(arena_id))
    }

    /// Remove a player from whichever queue holds them
    pub fn leave_queue(&self, player: &str) -> Result<String> {
        let name = Self::player_name(player)?;
        let mut state = self.write_state()?;
        let entry = state.queue.remove(&name)?;
        self.metrics.record_queue_leave();

        info!("Player left queue - player: '{}', type: {}", name, entry.arena_type);
        Ok(format!("You have left the {} queue.", entry.arena_type))
    }

    /// Move a formed arena from `starting` to `active`
    pub fn start_arena(&self, arena_id: ArenaId) -> Result<()> {
        let state = self.read_state()?;
        let arena = Self::find_arena(&state, arena_id)?;
        let mut arena = lock_arena(&arena)?;
        arena.start(current_timestamp())?;

        info!(
            "Arena started - id: {}, type: {}, players: {}",
            arena.id,
            arena.arena_type,
            arena.roster.len()
        );
        Ok(())
    }

    /// Resolve one attack and return the message for the attacker
    pub fn attack_player(&self, arena_id: ArenaId, attacker: &str, target: &str) -> Result<String> {
        let timer = self.metrics.start_timer();
        let result = self.attack_player_inner(arena_id, attacker, target);

        if let Err(e) = &result {
            debug!("Attack rejected - arena: {}, '{}' -> '{}': {}", arena_id, attacker, target, e);
            self.metrics.record_attack_rejected(kind_label(error_kind(e)));
        }
        self.metrics.record_operation("attack_player", timer.stop());
        result
    }

    fn attack_player_inner(&self, arena_id: ArenaId, attacker: &str, target: &str) -> Result<String> {
        let attacker = Self::player_name(attacker)?;
        let target = Self::player_name(target)?;

        let mut state = self.write_state()?;
        let handle = Self::find_arena(&state, arena_id)?;
        let mut arena = lock_arena(&handle)?;

        let now = current_timestamp();
        let outcome = self.combat.attack(&mut arena, &attacker, &target, now)?;

        if let AttackOutcome::Kill { match_over, .. } = &outcome {
            self.metrics.record_kill(arena.arena_type);
            if let Some(over) = match_over {
                self.settle_arena(&mut state, &arena, Self::end_reason(over), now);
            }
        }

        Ok(outcome.message())
    }

    /// Forfeit the player's seat in a live arena
    ///
    /// Without an arena id the player's current arena is looked up.
    pub fn leave_arena(&self, arena_id: Option<ArenaId>, player: &str) -> Result<String> {
        let name = Self::player_name(player)?;
        let mut state = self.write_state()?;

        let handle = match arena_id {
            Some(id) => {
                let handle = Self::find_arena(&state, id)?;
                if !lock_arena(&handle)?.is_seated(&name) {
                    return Err(ArenaError::NotInArena { player: name }.into());
                }
                handle
            }
            None => match Self::seated_arena(&state, &name)? {
                Some((_, handle)) => handle,
                None => return Err(ArenaError::NotInArena { player: name }.into()),
            },
        };

        let mut arena = lock_arena(&handle)?;
        let now = current_timestamp();
        let over = self.combat.forfeit(&mut arena, &name, now)?;
        self.metrics.record_forfeit();

        info!("Player forfeited - player: '{}', arena: {}", name, arena.id);

        let mut message = "You left the arena and forfeited the match.".to_string();
        if let Some(over) = over {
            self.settle_arena(&mut state, &arena, Self::end_reason(&over), now);
            message.push(' ');
            message.push_str(&over.message());
        }
        Ok(message)
    }

    /// Read-only copy of one arena
    pub fn get_arena(&self, arena_id: ArenaId) -> Result<Arena> {
        let state = self.read_state()?;
        let handle = Self::find_arena(&state, arena_id)?;
        let arena = lock_arena(&handle)?;
        Ok(arena.clone())
    }

    /// Every registered arena, oldest first
    pub fn list_arenas(&self) -> Result<Vec<ArenaSummary>> {
        let state = self.read_state()?;
        let mut rows = Vec::with_capacity(state.arenas.len());
        for arena in state.arenas.values() {
            let arena = lock_arena(arena)?;
            rows.push((arena.created_at, arena.summary()));
        }
        rows.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.id.cmp(&b.1.id)));
        Ok(rows.into_iter().map(|(_, summary)| summary).collect())
    }

    /// Arena type the player is currently queued for, if any
    pub fn queue_status(&self, player: &str) -> Result<Option<ArenaType>> {
        let name = Self::player_name(player)?;
        let state = self.read_state()?;
        Ok(state.queue.find_player(&name))
    }

    /// Snapshot of one waiting list in queue order
    pub fn queue_entries(&self, arena_type: ArenaType) -> Result<Vec<QueueEntry>> {
        let state = self.read_state()?;
        Ok(state.queue.entries(arena_type))
    }

    /// Waiting players per playable arena type
    pub fn queue_sizes(&self) -> Result<Vec<(ArenaType, usize)>> {
        let state = self.read_state()?;
        Ok(ArenaType::PLAYABLE
            .iter()
            .map(|arena_type| (*arena_type, state.queue.len(*arena_type)))
            .collect())
    }

    /// Remove ended arenas; returns how many were dropped
    pub fn cleanup_ended_arenas(&self) -> Result<usize> {
        let mut state = self.write_state()?;
        self.purge_ended(&mut state)
    }

    /// Periodic maintenance: optionally end overdue arenas, then purge ended ones
    pub fn run_housekeeping(&self, now: DateTime<Utc>) -> Result<HousekeepingReport> {
        let mut report = HousekeepingReport::default();
        {
            let mut state = self.write_state()?;

            if self.arena_settings.reap_overdue_arenas {
                let handles: Vec<_> = state.arenas.values().cloned().collect();
                for handle in handles {
                    let mut arena = lock_arena(&handle)?;
                    if arena.is_overdue(now) {
                        arena.end(None, now);
                        warn!("Arena {} ran past its end time and was closed without a winner", arena.id);
                        self.settle_overdue(&mut state, &arena, now);
                        report.reaped += 1;
                    }
                }
            }

            report.cleaned = self.purge_ended(&mut state)?;
        }

        self.metrics.record_housekeeping();
        self.metrics.update_from_manager_stats(&self.stats()?);
        Ok(report)
    }

    /// Overdue arenas never change ratings
    fn settle_overdue(&self, state: &mut ManagerState, arena: &Arena, now: DateTime<Utc>) {
        let mut unranked = arena.clone();
        unranked.ranked = false;
        self.settle_arena(state, &unranked, "overdue", now);
    }

    /// Formatted career block for one player
    pub fn get_stats(&self, player: &str) -> Result<String> {
        let name = Self::player_name(player)?;
        let state = self.read_state()?;
        let record = state
            .storage
            .get_rating(&name)
            .unwrap_or_else(|| RatingRecord::new(&name, self.updater.settings().initial_rating));
        Ok(report::format_player_stats(&record))
    }

    /// Rating record for one player, if one exists
    pub fn player_rating(&self, player: &str) -> Result<Option<RatingRecord>> {
        let name = Self::player_name(player)?;
        let state = self.read_state()?;
        Ok(state.storage.get_rating(&name))
    }

    /// Top `limit` records, rating descending then name ascending
    pub fn rankings(&self, limit: usize) -> Result<Vec<RatingRecord>> {
        let state = self.read_state()?;
        Ok(state.storage.top_ratings(limit))
    }

    /// Formatted leaderboard
    pub fn get_rankings(&self, limit: usize) -> Result<String> {
        Ok(report::format_rankings(&self.rankings(limit)?))
    }

    /// Zero every season counter; returns the number of records touched
    pub fn reset_season(&self) -> Result<usize> {
        let mut state = self.write_state()?;
        let count = state.storage.reset_season();
        self.metrics.record_season_reset();
        info!("Season reset - {} rating records cleared", count);
        Ok(count)
    }

    /// Open a new tournament for registration
    pub fn create_tournament(
        &self,
        name: &str,
        arena_type: ArenaType,
        max_players: usize,
        rewards: TournamentRewards,
    ) -> Result<TournamentId> {
        let tournament = Tournament::new(name, arena_type, max_players, rewards, current_timestamp())?;
        let id = tournament.id;

        let mut state = self.write_state()?;
        info!(
            "Tournament created - id: {}, name: '{}', type: {}, max_players: {}",
            id, tournament.name, arena_type, max_players
        );
        state.tournaments.insert(id, tournament);
        state.counters.tournaments_created += 1;
        self.metrics.record_tournament_created();
        Ok(id)
    }

    fn tournament_mut(state: &mut ManagerState, id: TournamentId) -> Result<&mut Tournament> {
        state.tournaments.get_mut(&id).ok_or_else(|| {
            ArenaError::TournamentNotFound {
                tournament_id: id.to_string(),
            }
            .into()
        })
    }

    fn tournament_ref(state: &ManagerState, id: TournamentId) -> Result<&Tournament> {
        state.tournaments.get(&id).ok_or_else(|| {
            ArenaError::TournamentNotFound {
                tournament_id: id.to_string(),
            }
            .into()
        })
    }

    /// Register a player for a tournament
    pub fn join_tournament(&self, tournament_id: TournamentId, player: &str) -> Result<String> {
        let name = Self::player_name(player)?;
        let mut state = self.write_state()?;
        let tournament = Self::tournament_mut(&mut state, tournament_id)?;
        let count = tournament.join(&name)?;

        info!(
            "Tournament registration - tournament: '{}', player: '{}', {}/{}",
            tournament.name, name, count, tournament.max_players
        );
        Ok(format!(
            "You have joined {} ({}/{} players).",
            tournament.name, count, tournament.max_players
        ))
    }

    /// Close registration and seed the bracket
    pub fn start_tournament(&self, tournament_id: TournamentId) -> Result<()> {
        self.start_tournament_with_rng(tournament_id, &mut rand::thread_rng())
    }

    /// Same as [`start_tournament`](Self::start_tournament) with a caller-supplied shuffle source
    pub fn start_tournament_with_rng<R: Rng + ?Sized>(
        &self,
        tournament_id: TournamentId,
        rng: &mut R,
    ) -> Result<()> {
        let mut state = self.write_state()?;
        let tournament = Self::tournament_mut(&mut state, tournament_id)?;
        tournament.start(rng, current_timestamp())?;

        info!(
            "Tournament started - '{}', {} participants, {} rounds",
            tournament.name,
            tournament.participants.len(),
            tournament.bracket.round_count()
        );
        self.metrics.record_tournament_started();
        Ok(())
    }

    /// Record a bracket result and advance the tournament
    pub fn report_tournament_match(
        &self,
        tournament_id: TournamentId,
        match_id: MatchId,
        winner: &str,
        scores: (u32, u32),
        arena_id: Option<ArenaId>,
    ) -> Result<ReportOutcome> {
        let winner = Self::player_name(winner)?;
        let mut state = self.write_state()?;
        let tournament = Self::tournament_mut(&mut state, tournament_id)?;
        let outcome = tournament.report(match_id, &winner, scores, arena_id, current_timestamp())?;

        match &outcome {
            ReportOutcome::Completed { champion } => {
                info!(
                    "Tournament completed - '{}', champion: '{}', rewards: {}",
                    tournament.name,
                    champion,
                    tournament.rewards.describe()
                );
            }
            ReportOutcome::RoundAdvanced { round } => {
                info!("Tournament '{}' advanced to round {}", tournament.name, round + 1);
            }
            ReportOutcome::Recorded => {
                debug!("Tournament '{}' match {} won by '{}'", tournament.name, match_id, winner);
            }
        }

        let completed = matches!(outcome, ReportOutcome::Completed { .. });
        if completed {
            state.counters.tournaments_completed += 1;
        }
        self.metrics.record_tournament_match(completed);
        Ok(outcome)
    }

    /// Read-only copy of one tournament
    pub fn get_tournament(&self, tournament_id: TournamentId) -> Result<Tournament> {
        let state = self.read_state()?;
        Self::tournament_ref(&state, tournament_id).cloned()
    }

    /// Every tournament, oldest first
    pub fn list_tournaments(&self) -> Result<Vec<TournamentSummary>> {
        let state = self.read_state()?;
        let mut tournaments: Vec<_> = state.tournaments.values().collect();
        tournaments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(tournaments.into_iter().map(Tournament::summary).collect())
    }

    /// Rendered bracket for one tournament
    pub fn get_tournament_bracket(&self, tournament_id: TournamentId) -> Result<String> {
        let state = self.read_state()?;
        let tournament = Self::tournament_ref(&state, tournament_id)?;
        Ok(report::format_bracket(tournament))
    }

    /// Snapshot of registry sizes and lifetime counters
    pub fn stats(&self) -> Result<ManagerStats> {
        let state = self.read_state()?;

        let mut live_arenas = 0;
        let mut ended_arenas = 0;
        for arena in state.arenas.values() {
            if lock_arena(arena)?.is_ended() {
                ended_arenas += 1;
            } else {
                live_arenas += 1;
            }
        }

        Ok(ManagerStats {
            live_arenas,
            ended_arenas,
            queue_sizes: ArenaType::PLAYABLE
                .iter()
                .map(|arena_type| (*arena_type, state.queue.len(*arena_type)))
                .collect(),
            players_waiting: state.queue.total_waiting(),
            tournaments: state.tournaments.len(),
            rated_players: state.storage.player_count(),
            counters: state.counters.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ArenaState, Winner};
    use chrono::Duration;

    fn manager() -> ArenaManager {
        ArenaManager::new().unwrap()
    }

    fn duel(manager: &ArenaManager, first: &str, second: &str) -> ArenaId {
        manager.queue_for_arena(first, ArenaType::Duel, 1).unwrap();
        let outcome = manager.queue_for_arena(second, ArenaType::Duel, 1).unwrap();
        let arena_id = outcome.arena_id().unwrap();
        manager.start_arena(arena_id).unwrap();
        arena_id
    }

    #[test]
    fn test_first_entry_waits() {
        let manager = manager();
        let outcome = manager.queue_for_arena("Alice", ArenaType::Duel, 1).unwrap();
        assert_eq!(outcome, QueueOutcome::Queued { position: 1, waiting: 1 });
        assert_eq!(manager.queue_status("alice").unwrap(), Some(ArenaType::Duel));
    }

    #[test]
    fn test_duplicate_queue_rejected() {
        let manager = manager();
        manager.queue_for_arena("alice", ArenaType::Team, 2).unwrap();

        let err = manager.queue_for_arena("ALICE", ArenaType::Duel, 1).unwrap_err();
        assert_eq!(error_kind(&err), ErrorKind::DuplicateState);
        assert_eq!(manager.queue_sizes().unwrap()[0], (ArenaType::Duel, 0));
    }

    #[test]
    fn test_requested_team_size_recorded() {
        let manager = manager();
        manager.queue_for_arena("alice", ArenaType::Team, 2).unwrap();

        let entries = manager.queue_entries(ArenaType::Team).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].player, "alice");
        assert_eq!(entries[0].team_size, 2);
    }

    #[test]
    fn test_rejected_queue_leaves_registry_alone() {
        let manager = manager();
        let ended = duel(&manager, "alice", "bob");
        manager.leave_arena(None, "bob").unwrap();
        manager.queue_for_arena("carol", ArenaType::FreeForAll, 1).unwrap();

        // Queueing carol purged the ended duel; set up another one
        assert!(manager.get_arena(ended).is_err());
        let ended = duel(&manager, "dave", "erin");
        manager.leave_arena(None, "erin").unwrap();
        let cleaned = manager.stats().unwrap().counters.arenas_cleaned;

        let err = manager.queue_for_arena("carol", ArenaType::Duel, 1).unwrap_err();
        assert_eq!(error_kind(&err), ErrorKind::DuplicateState);
        assert_eq!(manager.get_arena(ended).unwrap().state, ArenaState::Ended);
        assert_eq!(manager.stats().unwrap().counters.arenas_cleaned, cleaned);
    }

    #[test]
    fn test_out_of_range_timings_rejected_at_construction() {
        let mut config = AppConfig::default();
        config.arena.match_duration_seconds = i64::MAX;
        let err = ArenaManager::from_config(&config).err().unwrap();
        assert_eq!(error_kind(&err), ErrorKind::Validation);

        let mut config = AppConfig::default();
        config.arena.countdown_seconds = i64::MAX;
        assert!(ArenaManager::from_config(&config).is_err());

        let metrics = Arc::new(MetricsCollector::new().unwrap());
        assert!(ArenaManager::with_metrics(&config, metrics).is_err());
    }

    #[test]
    fn test_seated_player_cannot_requeue() {
        let manager = manager();
        duel(&manager, "alice", "bob");

        let err = manager.queue_for_arena("alice", ArenaType::FreeForAll, 1).unwrap_err();
        assert_eq!(error_kind(&err), ErrorKind::DuplicateState);
    }

    #[test]
    fn test_king_of_the_hill_unsupported() {
        let manager = manager();
        let err = manager
            .queue_for_arena("alice", ArenaType::KingOfTheHill, 1)
            .unwrap_err();
        assert_eq!(error_kind(&err), ErrorKind::Validation);
        assert!(manager.player_rating("alice").unwrap().is_none());
    }

    #[test]
    fn test_empty_name_rejected() {
        let manager = manager();
        let err = manager.queue_for_arena("   ", ArenaType::Duel, 1).unwrap_err();
        assert_eq!(error_kind(&err), ErrorKind::Validation);
    }

    #[test]
    fn test_leave_queue() {
        let manager = manager();
        manager.queue_for_arena("alice", ArenaType::Duel, 1).unwrap();
        let message = manager.leave_queue("alice").unwrap();
        assert!(message.contains("Duel"));
        assert_eq!(manager.queue_status("alice").unwrap(), None);

        let err = manager.leave_queue("alice").unwrap_err();
        assert_eq!(error_kind(&err), ErrorKind::NotFound);
    }

    #[test]
    fn test_attack_before_start_rejected() {
        let manager = manager();
        manager.queue_for_arena("alice", ArenaType::Duel, 1).unwrap();
        let arena_id = manager
            .queue_for_arena("bob", ArenaType::Duel, 1)
            .unwrap()
            .arena_id()
            .unwrap();

        let err = manager.attack_player(arena_id, "alice", "bob").unwrap_err();
        assert_eq!(error_kind(&err), ErrorKind::InvalidTransition);
        assert_eq!(manager.get_arena(arena_id).unwrap().player("bob").unwrap().hp, 100);
    }

    #[test]
    fn test_unknown_arena() {
        let manager = manager();
        let err = manager.start_arena(generate_arena_id()).unwrap_err();
        assert_eq!(error_kind(&err), ErrorKind::NotFound);
    }

    #[test]
    fn test_duel_to_the_end_updates_ratings() {
        let manager = manager();
        let arena_id = duel(&manager, "alice", "bob");

        let mut last = String::new();
        for _ in 0..10 {
            last = manager.attack_player(arena_id, "alice", "bob").unwrap();
        }
        assert!(last.contains("killed bob"));

        let arena = manager.get_arena(arena_id).unwrap();
        assert_eq!(arena.state, ArenaState::Ended);
        assert_eq!(arena.winner, Some(Winner::Player("alice".to_string())));

        let alice = manager.player_rating("alice").unwrap().unwrap();
        let bob = manager.player_rating("bob").unwrap().unwrap();
        assert_eq!(alice.rating, 1016);
        assert_eq!(bob.rating, 984);
        assert_eq!(alice.kills, 1);
        assert_eq!(bob.deaths, 1);

        let stats = manager.stats().unwrap();
        assert_eq!(stats.counters.matches_rated, 1);
        assert_eq!(stats.ended_arenas, 1);
    }

    #[test]
    fn test_ended_arena_purged_on_next_queue() {
        let manager = manager();
        let arena_id = duel(&manager, "alice", "bob");
        manager.leave_arena(None, "bob").unwrap();

        // Both are free to queue again once the arena has ended
        manager.queue_for_arena("bob", ArenaType::Duel, 1).unwrap();
        let err = manager.get_arena(arena_id).unwrap_err();
        assert_eq!(error_kind(&err), ErrorKind::NotFound);
    }

    #[test]
    fn test_leave_arena_forfeits_duel() {
        let manager = manager();
        let arena_id = duel(&manager, "alice", "bob");
        manager.attack_player(arena_id, "bob", "alice").unwrap();

        let message = manager.leave_arena(Some(arena_id), "bob").unwrap();
        assert!(message.contains("Winner: alice"));

        let arena = manager.get_arena(arena_id).unwrap();
        let bob = arena.player("bob").unwrap();
        assert!(bob.left);
        assert_eq!(bob.deaths, 1);
        assert_eq!(arena.player("alice").unwrap().kills, 0);
        assert!(manager.player_rating("alice").unwrap().unwrap().rating > 1000);

        let err = manager.leave_arena(None, "bob").unwrap_err();
        assert_eq!(error_kind(&err), ErrorKind::NotFound);
    }

    #[test]
    fn test_reaper_disabled_by_default() {
        let manager = manager();
        let arena_id = duel(&manager, "alice", "bob");
        let report = manager
            .run_housekeeping(current_timestamp() + Duration::hours(1))
            .unwrap();
        assert_eq!(report, HousekeepingReport::default());
        assert_eq!(manager.get_arena(arena_id).unwrap().state, ArenaState::Active);
    }

    #[test]
    fn test_reaper_closes_overdue_arenas() {
        let mut config = AppConfig::default();
        config.arena.reap_overdue_arenas = true;
        let manager = ArenaManager::from_config(&config).unwrap();
        let arena_id = duel(&manager, "alice", "bob");
        manager.attack_player(arena_id, "alice", "bob").unwrap();

        let report = manager
            .run_housekeeping(current_timestamp() + Duration::minutes(6))
            .unwrap();
        assert_eq!(report, HousekeepingReport { reaped: 1, cleaned: 1 });
        assert!(manager.list_arenas().unwrap().is_empty());

        // No rating movement for an undecided match
        assert_eq!(manager.player_rating("alice").unwrap().unwrap().rating, 1000);
        assert_eq!(manager.player_rating("bob").unwrap().unwrap().rating, 1000);
    }

    #[test]
    fn test_stats_for_unknown_player_do_not_create_records() {
        let manager = manager();
        let text = manager.get_stats("Nobody").unwrap();
        assert!(text.contains("1000"));
        assert!(manager.player_rating("nobody").unwrap().is_none());
    }

    #[test]
    fn test_tournament_flow() {
        use rand::rngs::StdRng;
        use rand::SeedableRng;

        let manager = manager();
        let id = manager
            .create_tournament("Cup", ArenaType::Duel, 2, TournamentRewards::default())
            .unwrap();
        manager.join_tournament(id, "Alice").unwrap();
        manager.join_tournament(id, "Bob").unwrap();
        manager
            .start_tournament_with_rng(id, &mut StdRng::seed_from_u64(3))
            .unwrap();

        let final_id = manager.get_tournament(id).unwrap().bracket.rounds[0][0].id;
        let outcome = manager
            .report_tournament_match(id, final_id, "BOB", (0, 2), None)
            .unwrap();
        assert_eq!(
            outcome,
            ReportOutcome::Completed {
                champion: "bob".to_string()
            }
        );
        assert_eq!(manager.stats().unwrap().counters.tournaments_completed, 1);

        let err = manager.get_tournament(uuid::Uuid::new_v4()).unwrap_err();
        assert_eq!(error_kind(&err), ErrorKind::NotFound);
    }
}
