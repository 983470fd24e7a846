//! Human-readable text blocks relayed to players

use crate::rating::RatingRecord;
use crate::tournament::{Tournament, TournamentMatch};
use crate::types::TournamentState;

/// Career block shown by the stats command
pub fn format_player_stats(record: &RatingRecord) -> String {
    [
        format!("=== Arena Stats: {} ===", record.player),
        format!("Rating: {} ({})", record.rating, record.tier()),
        format!(
            "Record: {}W / {}L ({:.1}% win rate)",
            record.wins,
            record.losses,
            record.win_rate()
        ),
        format!(
            "K/D/A: {} / {} / {}",
            record.kills, record.deaths, record.assists
        ),
        format!(
            "Streak: {} (best {})",
            record.current_streak, record.best_streak
        ),
        format!("Season: {}W / {}L", record.season_wins, record.season_losses),
        format!("Total matches: {}", record.total_matches),
    ]
    .join("\n")
}

/// Leaderboard table, rows already sorted and truncated
pub fn format_rankings(records: &[RatingRecord]) -> String {
    if records.is_empty() {
        return "No ranked players yet.".to_string();
    }

    let mut lines = vec![
        "=== Arena Rankings ===".to_string(),
        format!(
            "{:<5} {:<16} {:>6} {:<10} {:>7}",
            "Rank", "Player", "Rating", "Tier", "W/L"
        ),
    ];
    lines.extend(records.iter().enumerate().map(|(index, record)| {
        format!(
            "{:<5} {:<16} {:>6} {:<10} {:>7}",
            index + 1,
            record.player,
            record.rating,
            record.tier().to_string(),
            format!("{}/{}", record.wins, record.losses)
        )
    }));
    lines.join("\n")
}

fn slot_name(slot: &Option<String>) -> &str {
    slot.as_deref().unwrap_or("TBD")
}

fn format_match(game: &TournamentMatch) -> String {
    if game.bye {
        return format!("[{}] {} - bye", game.slot + 1, slot_name(&game.player1));
    }

    let pairing = format!(
        "[{}] {} vs {}",
        game.slot + 1,
        slot_name(&game.player1),
        slot_name(&game.player2)
    );
    match &game.winner {
        Some(winner) if game.played => format!(
            "{} - {} won ({}-{})",
            pairing, winner, game.score1, game.score2
        ),
        _ => format!("{} - pending", pairing),
    }
}

/// Registration roster or round-by-round bracket
pub fn format_bracket(tournament: &Tournament) -> String {
    let mut lines = vec![format!(
        "=== {} ({}) ===",
        tournament.name, tournament.arena_type
    )];

    match tournament.state {
        TournamentState::Registration => {
            lines.push(format!(
                "Status: registration ({}/{} players)",
                tournament.participants.len(),
                tournament.max_players
            ));
            lines.push(format!("Rewards: {}", tournament.rewards.describe()));
            if tournament.participants.is_empty() {
                lines.push("No participants yet.".to_string());
            } else {
                lines.push("Participants:".to_string());
                lines.extend(
                    tournament
                        .participants
                        .iter()
                        .enumerate()
                        .map(|(index, player)| format!("  {}. {}", index + 1, player)),
                );
            }
        }
        TournamentState::Active | TournamentState::Completed => {
            if tournament.state == TournamentState::Active {
                lines.push(format!(
                    "Status: active - round {} of {}",
                    tournament.current_round + 1,
                    tournament.bracket.round_count()
                ));
            } else {
                lines.push("Status: completed".to_string());
            }
            lines.push(format!("Rewards: {}", tournament.rewards.describe()));

            for (round, games) in tournament.bracket.rounds.iter().enumerate() {
                lines.push(format!("Round {}:", round + 1));
                lines.extend(games.iter().map(|game| format!("  {}", format_match(game))));
            }

            if let Some(champion) = &tournament.champion {
                lines.push(format!("Champion: {}", champion));
            }
        }
    }

    lines.join("\n")
}
