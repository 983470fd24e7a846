//! Integration tests for the PvP arena engine
//!
//! These tests drive the public manager API through whole workflows:
//! - Queueing, arena formation and combat to a decided result
//! - Rating feedback into later matchmaking
//! - Forfeits, housekeeping and season resets
//! - Tournament brackets from registration to champion

mod fixtures;

use fixtures::{fight_to_death, manager, manager_with, queue_all, seeded_rng, start_duel};
use pvp_arena::tournament::TournamentRewards;
use pvp_arena::types::{ArenaState, ArenaType, QueueOutcome, TournamentState, Winner};
use pvp_arena::{error_kind, ArenaManager, ErrorKind, ReportOutcome, TournamentId};

fn rating(manager: &ArenaManager, player: &str) -> i32 {
    manager
        .player_rating(player)
        .unwrap()
        .map(|record| record.rating)
        .unwrap()
}

/// Report the first contestant of every ready match until nothing is left to play
fn play_out(manager: &ArenaManager, id: TournamentId) -> Option<String> {
    loop {
        let tournament = manager.get_tournament(id).unwrap();
        let next = tournament
            .bracket
            .ready_matches()
            .first()
            .map(|game| (game.id, game.player1.clone().unwrap()));

        let Some((match_id, winner)) = next else {
            return tournament.champion;
        };
        manager
            .report_tournament_match(id, match_id, &winner, (2, 1), None)
            .unwrap();
    }
}

#[test]
fn test_alice_bob_duel_end_to_end() {
    let manager = manager();

    let first = manager.queue_for_arena("Alice", ArenaType::Duel, 1).unwrap();
    assert!(matches!(first, QueueOutcome::Queued { .. }));

    let second = manager.queue_for_arena("Bob", ArenaType::Duel, 1).unwrap();
    let arena_id = second.arena_id().expect("second entry should complete the duel");

    manager.start_arena(arena_id).unwrap();
    let message = fight_to_death(&manager, arena_id, "Alice", "Bob");
    assert!(message.contains("Winner: alice"));

    let arena = manager.get_arena(arena_id).unwrap();
    assert_eq!(arena.state, ArenaState::Ended);
    assert_eq!(arena.winner, Some(Winner::Player("alice".to_string())));
    assert_eq!(arena.player("bob").unwrap().hp, 0);

    assert!(rating(&manager, "alice") > 1000);
    assert!(rating(&manager, "bob") < 1000);

    let stats = manager.get_stats("alice").unwrap();
    assert!(stats.contains("1W / 0L"));
    assert!(stats.contains("K/D/A: 1 / 0 / 0"));
}

#[test]
fn test_team_match_with_assist() {
    let manager = manager();
    let arena_id = queue_all(&manager, &["a", "b", "c", "d"], ArenaType::Team).unwrap();
    manager.start_arena(arena_id).unwrap();

    // a and c share team 1
    let err = manager.attack_player(arena_id, "a", "c").unwrap_err();
    assert_eq!(error_kind(&err), ErrorKind::Validation);
    assert_eq!(manager.get_arena(arena_id).unwrap().player("c").unwrap().hp, 100);

    fight_to_death(&manager, arena_id, "a", "b");
    manager.attack_player(arena_id, "c", "d").unwrap();
    let message = fight_to_death(&manager, arena_id, "a", "d");
    assert!(message.contains("Winner: Team 1"));

    let arena = manager.get_arena(arena_id).unwrap();
    assert_eq!(arena.winner, Some(Winner::Team(1)));
    assert_eq!(arena.player("a").unwrap().kills, 2);
    assert_eq!(arena.player("c").unwrap().assists, 1);

    assert_eq!(rating(&manager, "a"), 1016);
    assert_eq!(rating(&manager, "c"), 1016);
    assert_eq!(rating(&manager, "b"), 984);
    assert_eq!(rating(&manager, "d"), 984);
    assert_eq!(manager.player_rating("c").unwrap().unwrap().assists, 1);

    let err = manager.attack_player(arena_id, "c", "b").unwrap_err();
    assert_eq!(error_kind(&err), ErrorKind::InvalidTransition);
}

#[test]
fn test_free_for_all_last_survivor_wins() {
    let manager = manager();
    let arena_id = queue_all(&manager, &["p1", "p2", "p3", "p4"], ArenaType::FreeForAll).unwrap();
    manager.start_arena(arena_id).unwrap();

    fight_to_death(&manager, arena_id, "p1", "p2");
    fight_to_death(&manager, arena_id, "p1", "p3");
    assert_eq!(manager.get_arena(arena_id).unwrap().state, ArenaState::Active);

    let message = fight_to_death(&manager, arena_id, "p1", "p4");
    assert!(message.contains("Winner: p1"));
    assert_eq!(rating(&manager, "p1"), 1016);
    for loser in ["p2", "p3", "p4"] {
        assert_eq!(rating(&manager, loser), 984);
    }
}

#[test]
fn test_dead_target_and_unknown_players_rejected() {
    let manager = manager();
    let arena_id = queue_all(&manager, &["p1", "p2", "p3", "p4"], ArenaType::FreeForAll).unwrap();
    manager.start_arena(arena_id).unwrap();
    fight_to_death(&manager, arena_id, "p1", "p2");

    let err = manager.attack_player(arena_id, "p3", "p2").unwrap_err();
    assert_eq!(error_kind(&err), ErrorKind::NotFound);

    let err = manager.attack_player(arena_id, "p2", "p3").unwrap_err();
    assert_eq!(error_kind(&err), ErrorKind::NotFound);

    let err = manager.attack_player(arena_id, "p3", "stranger").unwrap_err();
    assert_eq!(error_kind(&err), ErrorKind::NotFound);
}

#[test]
fn test_ratings_feed_back_into_formation_order() {
    let manager = manager();
    let duel = start_duel(&manager, "alice", "bob");
    fight_to_death(&manager, duel, "alice", "bob");

    let arena_id = queue_all(&manager, &["carol", "alice", "dave", "bob"], ArenaType::FreeForAll).unwrap();
    let arena = manager.get_arena(arena_id).unwrap();
    assert_eq!(arena.roster, vec!["bob", "carol", "dave", "alice"]);
}

#[test]
fn test_leave_queue_and_requeue() {
    let manager = manager();
    manager.queue_for_arena("alice", ArenaType::Duel, 1).unwrap();
    assert_eq!(manager.queue_status("alice").unwrap(), Some(ArenaType::Duel));

    manager.leave_queue("alice").unwrap();
    assert_eq!(manager.queue_status("alice").unwrap(), None);

    let outcome = manager.queue_for_arena("alice", ArenaType::FreeForAll, 1).unwrap();
    assert_eq!(outcome, QueueOutcome::Queued { position: 1, waiting: 1 });
    assert_eq!(manager.queue_sizes().unwrap()[2], (ArenaType::FreeForAll, 1));
}

#[test]
fn test_forfeit_before_start_hands_opponent_the_win() {
    let manager = manager();
    let arena_id = queue_all(&manager, &["alice", "bob"], ArenaType::Duel).unwrap();

    let message = manager.leave_arena(None, "bob").unwrap();
    assert!(message.contains("forfeited"));

    let arena = manager.get_arena(arena_id).unwrap();
    assert_eq!(arena.state, ArenaState::Ended);
    assert_eq!(arena.winner, Some(Winner::Player("alice".to_string())));
    assert!(rating(&manager, "alice") > 1000);

    let err = manager.start_arena(arena_id).unwrap_err();
    assert_eq!(error_kind(&err), ErrorKind::InvalidTransition);
}

#[test]
fn test_cleanup_removes_only_ended_arenas() {
    let manager = manager();
    let ended = start_duel(&manager, "alice", "bob");
    let live = start_duel(&manager, "carol", "dave");
    fight_to_death(&manager, ended, "alice", "bob");

    assert_eq!(manager.list_arenas().unwrap().len(), 2);
    assert_eq!(manager.cleanup_ended_arenas().unwrap(), 1);

    let remaining = manager.list_arenas().unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, live);
    assert_eq!(manager.stats().unwrap().counters.arenas_cleaned, 1);
}

#[test]
fn test_reaper_only_when_enabled() {
    let manager = manager_with(|config| config.arena.match_duration_seconds = 1);
    let arena_id = start_duel(&manager, "alice", "bob");

    let later = chrono::Utc::now() + chrono::Duration::seconds(5);
    let report = manager.run_housekeeping(later).unwrap();
    assert_eq!(report.reaped, 0);
    assert_eq!(manager.get_arena(arena_id).unwrap().state, ArenaState::Active);

    let manager = manager_with(|config| {
        config.arena.match_duration_seconds = 1;
        config.arena.reap_overdue_arenas = true;
    });
    start_duel(&manager, "alice", "bob");
    let report = manager.run_housekeeping(later).unwrap();
    assert_eq!(report.reaped, 1);
    assert_eq!(report.cleaned, 1);
    assert_eq!(rating(&manager, "alice"), 1000);
}

#[test]
fn test_rankings_and_season_reset() {
    let manager = manager();
    let first = start_duel(&manager, "alice", "bob");
    fight_to_death(&manager, first, "alice", "bob");
    let second = start_duel(&manager, "carol", "dave");
    fight_to_death(&manager, second, "dave", "carol");

    let top = manager.rankings(2).unwrap();
    let names: Vec<_> = top.iter().map(|record| record.player.as_str()).collect();
    assert_eq!(names, vec!["alice", "dave"]);

    let table = manager.get_rankings(10).unwrap();
    assert_eq!(table.lines().count(), 2 + 4);

    assert_eq!(manager.reset_season().unwrap(), 4);
    let alice = manager.player_rating("alice").unwrap().unwrap();
    assert_eq!(alice.season_wins, 0);
    assert_eq!(alice.wins, 1);
    assert_eq!(alice.rating, 1016);
}

#[test]
fn test_tournament_size_validation() {
    let manager = manager();
    let err = manager
        .create_tournament("Odd Cup", ArenaType::Duel, 5, TournamentRewards::default())
        .unwrap_err();
    assert_eq!(error_kind(&err), ErrorKind::Validation);

    let id = manager
        .create_tournament("Eight Cup", ArenaType::Duel, 8, TournamentRewards::default())
        .unwrap();
    let tournament = manager.get_tournament(id).unwrap();
    assert_eq!(tournament.state, TournamentState::Registration);
    assert_eq!(tournament.max_players, 8);
}

#[test]
fn test_four_player_tournament_first_round() {
    let manager = manager();
    let id = manager
        .create_tournament("Cup", ArenaType::Duel, 4, TournamentRewards::default())
        .unwrap();
    for name in ["alice", "bob", "carol", "dave"] {
        manager.join_tournament(id, name).unwrap();
    }

    let err = manager.join_tournament(id, "eve").unwrap_err();
    assert_eq!(error_kind(&err), ErrorKind::DuplicateState);

    manager.start_tournament_with_rng(id, &mut seeded_rng(11)).unwrap();
    let tournament = manager.get_tournament(id).unwrap();
    assert_eq!(tournament.bracket.rounds[0].len(), 2);
    assert!(tournament.bracket.rounds[0].iter().all(|game| !game.bye));
    assert!(tournament.bracket.rounds[1][0].player1.is_none());
    assert!(tournament.bracket.rounds[1][0].player2.is_none());

    let err = manager.join_tournament(id, "eve").unwrap_err();
    assert_eq!(error_kind(&err), ErrorKind::InvalidTransition);
}

#[test]
fn test_eight_player_tournament_to_champion() {
    let manager = manager();
    let rewards = TournamentRewards {
        gold: 1000,
        title: Some("Arena Champion".to_string()),
        items: Vec::new(),
    };
    let id = manager.create_tournament("Grand Cup", ArenaType::Duel, 8, rewards).unwrap();
    for i in 1..=8 {
        manager.join_tournament(id, &format!("player{}", i)).unwrap();
    }
    manager.start_tournament_with_rng(id, &mut seeded_rng(5)).unwrap();

    let champion = play_out(&manager, id).expect("tournament should finish");
    let tournament = manager.get_tournament(id).unwrap();
    assert_eq!(tournament.state, TournamentState::Completed);
    assert_eq!(tournament.champion.as_deref(), Some(champion.as_str()));
    assert_eq!(tournament.current_round, 2);

    let bracket = manager.get_tournament_bracket(id).unwrap();
    assert!(bracket.contains(&format!("Champion: {}", champion)));
    assert!(bracket.contains("Arena Champion"));
    assert!(!bracket.contains("pending"));
}

#[test]
fn test_odd_tournament_resolves_byes() {
    let manager = manager();
    let id = manager
        .create_tournament("Odd Field", ArenaType::Duel, 8, TournamentRewards::default())
        .unwrap();
    for i in 1..=5 {
        manager.join_tournament(id, &format!("p{}", i)).unwrap();
    }
    manager.start_tournament_with_rng(id, &mut seeded_rng(2)).unwrap();

    let tournament = manager.get_tournament(id).unwrap();
    assert_eq!(tournament.bracket.round_count(), 3);
    assert_eq!(tournament.bracket.rounds[0].iter().filter(|game| game.bye).count(), 1);

    let champion = play_out(&manager, id).unwrap();
    assert!(tournament.participants.contains(&champion));
    assert_eq!(manager.get_tournament(id).unwrap().state, TournamentState::Completed);
}

#[test]
fn test_tournament_result_validation() {
    let manager = manager();
    let id = manager
        .create_tournament("Cup", ArenaType::Duel, 4, TournamentRewards::default())
        .unwrap();
    manager.join_tournament(id, "alice").unwrap();

    let err = manager.start_tournament_with_rng(id, &mut seeded_rng(1)).unwrap_err();
    assert_eq!(error_kind(&err), ErrorKind::InvalidTransition);

    manager.join_tournament(id, "bob").unwrap();
    manager.start_tournament_with_rng(id, &mut seeded_rng(1)).unwrap();

    let final_id = manager.get_tournament(id).unwrap().bracket.rounds[0][0].id;
    let err = manager
        .report_tournament_match(id, final_id, "mallory", (1, 0), None)
        .unwrap_err();
    assert_eq!(error_kind(&err), ErrorKind::Validation);

    let outcome = manager
        .report_tournament_match(id, final_id, "alice", (3, 2), None)
        .unwrap();
    assert_eq!(
        outcome,
        ReportOutcome::Completed {
            champion: "alice".to_string()
        }
    );

    let summaries = manager.list_tournaments().unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].champion.as_deref(), Some("alice"));
}
