//! Plain-text tables for rounds, standings and stored tournaments.

use std::fmt::Write;

use crate::{
    player::{Player, PlayerId, Roster},
    record::TournamentRecord,
    round::Round,
    tournament::{Standings, Tournament},
};

fn display_name(roster: &Roster, id: &PlayerId) -> String {
    roster
        .get(id)
        .map(Player::full_name)
        .unwrap_or_else(|| id.to_string())
}

/// `players` sorted by last name then first name, ignoring case.
pub fn alphabetical<'a>(players: impl IntoIterator<Item = &'a Player>) -> Vec<&'a Player> {
    let mut players: Vec<&Player> = players.into_iter().collect();
    players.sort_by_cached_key(|p| (p.last_name.to_lowercase(), p.first_name.to_lowercase()));
    players
}

/// One line per player, alphabetically.
pub fn players_report<'a>(players: impl IntoIterator<Item = &'a Player>) -> String {
    let mut report = String::new();
    for player in alphabetical(players) {
        let _ = writeln!(
            report,
            "{:<20} {:<20} {:<8} {}",
            player.last_name, player.first_name, player.chess_id, player.birth_date
        );
    }
    report
}

/// One line per game, then the byes and the players who sat out.
pub fn round_report(round: &Round, roster: &Roster) -> String {
    let mut report = String::new();
    let _ = writeln!(report, "=== {} ===", round.name());
    for game in round.matches() {
        let (first, second) = game.players();
        let (a, b) = match game.scores() {
            Some((a, b)) => (format!("{a:.1}"), format!("{b:.1}")),
            None => ("-".into(), "-".into()),
        };
        let _ = writeln!(
            report,
            "{:<24} {:>8} {:>4} - {:<4} {:<8} {}",
            display_name(roster, first),
            first,
            a,
            b,
            second,
            display_name(roster, second),
        );
    }
    for id in round.byes() {
        let _ = writeln!(report, "{} ({id}): bye", display_name(roster, id));
    }
    for id in round.unpaired() {
        let _ = writeln!(report, "{} ({id}): no opponent left", display_name(roster, id));
    }
    report
}

/// Players ranked by score.
pub fn standings_report(tournament: &Tournament) -> String {
    let mut report = String::new();
    let _ = writeln!(report, "{:<4} {:<24} {:<8} {:>6}", "#", "Player", "Id", "Points");
    report.push_str(&"-".repeat(45));
    report.push('\n');
    for (rank, player) in tournament.standings().into_iter().enumerate() {
        let _ = writeln!(
            report,
            "{:<4} {:<24} {:<8} {:>6.1}",
            rank + 1,
            player.full_name(),
            player.chess_id,
            player.point
        );
    }
    report
}

/// `"Winner: ..."` or `"Tie between ..."`.
pub fn winners_line(standings: &Standings) -> String {
    let names = standings
        .winners
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    if standings.is_tie() {
        format!("Tie between {names} with {:.1} points", standings.score)
    } else {
        format!("Winner: {names} with {:.1} points", standings.score)
    }
}

/// Header of a stored tournament, then every round with its games.
pub fn tournament_report(record: &TournamentRecord) -> String {
    let mut report = String::new();
    let _ = writeln!(report, "=== Tournament: {} ===", record.name);
    let _ = writeln!(
        report,
        "{}, from {} to {}, {} rounds",
        record.location, record.start_date, record.end_date, record.round_number
    );
    if !record.description.is_empty() {
        let _ = writeln!(report, "{}", record.description);
    }
    report.push('\n');

    for round in &record.round_list {
        let _ = writeln!(
            report,
            "{} ({} -> {})",
            round.name,
            round.start_date,
            round.end_date.as_deref().unwrap_or("unfinished")
        );
        for game in &round.match_list {
            let [(first, a), (second, b)] = &game.slots;
            let _ = writeln!(
                report,
                "  {:<24} {:>4.1} - {:<4.1} {}",
                first.full_name(),
                a,
                b,
                second.full_name()
            );
        }
        for id in &round.bye_list {
            let _ = writeln!(report, "  {id}: bye");
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};
    use time::macros::date;

    use super::*;
    use crate::{
        configuration::Configuration, outcome::Outcome, record::TournamentRecord,
        referee::ScriptedOutcomes, tournament::TournamentDetails,
    };

    fn tournament() -> Tournament {
        let players = ["Ann", "Bob", "Cid", "Dan"]
            .iter()
            .enumerate()
            .map(|(i, name)| {
                Player::new(
                    format!("PL{:05}", i + 1).parse().unwrap(),
                    *name,
                    "Smith",
                    "1990-01-01",
                )
            })
            .collect();
        let details = TournamentDetails {
            name: "Club Cup".into(),
            location: "Nantes".into(),
            start_date: date!(2025 - 06 - 01),
            end_date: date!(2025 - 06 - 01),
            description: "summer".into(),
        };
        let mut tournament =
            Tournament::new(details, players, &Configuration::new().with_round_count(1)).unwrap();
        tournament
            .play_next_round(
                &mut StdRng::seed_from_u64(3),
                &mut ScriptedOutcomes::new([Outcome::FirstWins, Outcome::FirstWins]),
            )
            .unwrap();
        tournament
    }

    #[test]
    fn round_lists_every_game() {
        let tournament = tournament();
        let report = round_report(&tournament.rounds()[0], tournament.players());
        assert!(report.starts_with("=== Round 1 ==="));
        assert_eq!(report.matches("1.0 - 0.0").count(), 2);
        assert!(report.contains("Smith"));
    }

    #[test]
    fn standings_are_ranked() {
        let report = standings_report(&tournament());
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines.len(), 6);
        assert!(lines[2].starts_with("1 "));
        assert!(lines[2].ends_with("1.0"));
        assert!(lines[5].ends_with("0.0"));
    }

    #[test]
    fn winners_mention_ties() {
        let standings = tournament().winners().unwrap();
        assert!(winners_line(&standings).starts_with("Tie between"));
        assert!(winners_line(&standings).contains("1.0 points"));
    }

    #[test]
    fn players_sort_alphabetically_ignoring_case() {
        let players = [
            Player::new("ES00001".parse().unwrap(), "Ana", "de la Cruz", "1990-01-01"),
            Player::new("FR00002".parse().unwrap(), "Zoe", "Zidane", "1990-01-01"),
            Player::new("IN00003".parse().unwrap(), "Vishy", "Anand", "1969-12-11"),
            Player::new("IN00004".parse().unwrap(), "Aruna", "anand", "1990-01-01"),
        ];
        let names: Vec<(&str, &str)> = alphabetical(&players)
            .into_iter()
            .map(|p| (p.last_name.as_str(), p.first_name.as_str()))
            .collect();
        assert_eq!(
            names,
            vec![
                ("anand", "Aruna"),
                ("Anand", "Vishy"),
                ("de la Cruz", "Ana"),
                ("Zidane", "Zoe"),
            ]
        );

        let report = players_report(&players);
        assert_eq!(report.lines().count(), 4);
        assert!(report.lines().nth(2).unwrap().starts_with("de la Cruz"));
    }

    #[test]
    fn stored_tournament() {
        let record = TournamentRecord::from_tournament(&tournament()).unwrap();
        let report = tournament_report(&record);
        assert!(report.contains("=== Tournament: Club Cup ==="));
        assert!(report.contains("Nantes, from 2025-06-01 to 2025-06-01, 1 rounds"));
        assert!(report.contains("Round 1 ("));
        assert_eq!(report.matches("1.0 - 0.0").count(), 2);
    }
}
