use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use swiss_tournament::{
    prelude::*,
    report::{players_report, standings_report, tournament_report},
    validators::{check_tournament_dates, is_adult, parse_date},
};
use time::{Date, OffsetDateTime};
use tracing::{info, subscriber::set_global_default, Level};
use tracing_subscriber::FmtSubscriber;

/// Swiss-system chess tournament manager
///
/// Registers players, plays tournaments round after round while asking for each result, and
/// keeps everything in JSON files.
#[derive(Parser, Debug)]
#[command(version, about = "Swiss-system chess tournament manager")]
struct Args {
    /// Directory holding players.json and tournaments.json
    #[arg(default_value = "data", long)]
    data_dir: PathBuf,

    /// Show debug traces on stderr
    #[arg(long)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Register a new player
    AddPlayer {
        /// Two letters followed by five digits, e.g. AB12345
        #[arg(long)]
        chess_id: String,

        #[arg(long)]
        first_name: String,

        #[arg(long)]
        last_name: String,

        /// YYYY-MM-DD, the player must be an adult
        #[arg(long)]
        birth_date: String,
    },

    /// List registered players alphabetically
    Players,

    /// Create a tournament and play it, asking for the result of every game
    Start {
        #[arg(long)]
        name: String,

        #[arg(long)]
        location: String,

        /// YYYY-MM-DD, today or later
        #[arg(long)]
        start_date: String,

        /// YYYY-MM-DD, not before the start date
        #[arg(long)]
        end_date: String,

        #[arg(default_value = "", long)]
        description: String,

        /// Number of rounds [default: SWISS_ROUNDS or 4]
        #[arg(long)]
        rounds: Option<usize>,

        /// Seed of the pairing random source
        #[arg(long)]
        seed: Option<u64>,

        /// What to do with players left without a new opponent: skip, bye or fail
        #[arg(long)]
        residue: Option<ResiduePolicy>,

        /// Chess id of a registered player, repeat for each one [default: every registered
        /// player]
        #[arg(long = "player")]
        players: Vec<String>,
    },

    /// List stored tournaments by start date
    Tournaments,

    /// Show the rounds and matches of a stored tournament
    Show {
        /// Tournament name, case-insensitive
        name: String,
    },

    /// List the players of a stored tournament alphabetically
    TournamentPlayers {
        /// Tournament name, case-insensitive
        name: String,
    },
}

/// Asks for every result on the console, re-asking until a valid code is typed.
struct ConsoleReferee<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> ConsoleReferee<R, W> {
    fn new(input: R, output: W) -> Self {
        ConsoleReferee { input, output }
    }
}

impl<R: BufRead, W: Write> OutcomeSource for ConsoleReferee<R, W> {
    fn outcome(&mut self, game: &MatchInfo<'_>) -> anyhow::Result<Outcome> {
        writeln!(
            self.output,
            "Round {}, game {}/{}: {} ({}) vs {} ({})",
            game.round,
            game.number,
            game.total,
            game.first,
            game.colors.0,
            game.second,
            game.colors.1
        )?;
        loop {
            write!(self.output, "Who is the winner ? 0 (if null), 1 or 2 : ")?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                bail!(
                    "input closed before the result of {} vs {}",
                    game.first.chess_id,
                    game.second.chess_id
                );
            }
            match line.parse::<Outcome>() {
                Ok(outcome) => return Ok(outcome),
                Err(err) => writeln!(self.output, "{err}")?,
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = Configuration::from_env();
    // the director installs the file logger itself
    if !config.logs_to_file() {
        init_stderr_logger(args.debug)?;
    }

    let mut store = JsonStore::new(&args.data_dir);
    match args.command {
        Command::AddPlayer {
            chess_id,
            first_name,
            last_name,
            birth_date,
        } => {
            let chess_id: PlayerId = chess_id.parse()?;
            if !is_adult(parse_date(&birth_date)?, today()) {
                bail!("{first_name} {last_name} is not an adult");
            }
            let player = Player::new(chess_id, first_name, last_name, birth_date);
            store.save_player(&player)?;
            println!("Registered {player}");
        }
        Command::Players => {
            print!("{}", players_report(&store.load_players()?));
        }
        Command::Start {
            name,
            location,
            start_date,
            end_date,
            description,
            rounds,
            seed,
            residue,
            players,
        } => {
            let mut config = config;
            if let Some(rounds) = rounds {
                config = config.with_round_count(rounds);
            }
            if let Some(seed) = seed {
                config = config.with_seed(seed);
            }
            if let Some(residue) = residue {
                config = config.with_residue_policy(residue);
            }

            let details = TournamentDetails {
                name,
                location,
                start_date: parse_date(&start_date)?,
                end_date: parse_date(&end_date)?,
                description,
            };
            check_tournament_dates(details.start_date, details.end_date, today())?;
            let players = select_players(store.load_players()?, &players)?;

            let mut director = Director::new(config)?;
            let mut tournament = director.create_tournament(details, players)?;
            let stdin = io::stdin();
            let mut referee = ConsoleReferee::new(stdin.lock(), io::stdout());
            let result = director.run(&mut tournament, &mut referee);

            // keep whatever was played, even if the input stopped early
            store.save_tournament(&TournamentRecord::from_tournament(&tournament)?)?;
            info!(
                tournament = %tournament.details().name,
                rounds = tournament.rounds().len(),
                "tournament saved"
            );
            result?;
        }
        Command::Tournaments => {
            let mut tournaments = store.load_tournaments()?;
            tournaments.sort_by(|a, b| a.start_date.cmp(&b.start_date));
            for t in tournaments {
                println!(
                    "{:<24} {:<16} {} -> {}  {}/{} rounds",
                    t.name,
                    t.location,
                    t.start_date,
                    t.end_date,
                    t.round_list.len(),
                    t.round_number
                );
            }
        }
        Command::Show { name } => {
            let record = find_tournament(&store, &name)?;
            print!("{}", tournament_report(&record));
            let tournament = Tournament::try_from(record)?;
            println!();
            print!("{}", standings_report(&tournament));
        }
        Command::TournamentPlayers { name } => {
            let record = find_tournament(&store, &name)?;
            print!("{}", players_report(&record.player_list));
        }
    }
    Ok(())
}

fn init_stderr_logger(debug: bool) -> anyhow::Result<()> {
    let level = if debug { Level::DEBUG } else { Level::WARN };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(io::stderr)
        .finish();
    set_global_default(subscriber).context("could not set the stderr tracing subscriber")
}

fn find_tournament(store: &JsonStore, name: &str) -> anyhow::Result<TournamentRecord> {
    store
        .load_tournaments()?
        .into_iter()
        .find(|t| t.name.eq_ignore_ascii_case(name))
        .with_context(|| format!("no tournament named '{name}'"))
}

fn today() -> Date {
    OffsetDateTime::now_local()
        .unwrap_or_else(|_| OffsetDateTime::now_utc())
        .date()
}

/// Registered players matching `ids`, in the order given; every one of them when `ids` is
/// empty.
fn select_players(registered: Vec<Player>, ids: &[String]) -> anyhow::Result<Vec<Player>> {
    if ids.is_empty() {
        return Ok(registered);
    }
    ids.iter()
        .map(|id| {
            let id: PlayerId = id.parse()?;
            registered
                .iter()
                .find(|p| p.chess_id == id)
                .cloned()
                .with_context(|| format!("{id} is not registered"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn player(id: &str) -> Player {
        Player::new(id.parse().unwrap(), "Judit", "Polgar", "1976-07-23")
    }

    fn ask(input: &str) -> (anyhow::Result<Outcome>, String) {
        let (first, second) = (player("HU00001"), player("HU00002"));
        let game = MatchInfo {
            round: 2,
            number: 1,
            total: 3,
            first: &first,
            second: &second,
            colors: (Color::Black, Color::White),
        };
        let mut output = Vec::new();
        let outcome = ConsoleReferee::new(Cursor::new(input), &mut output).outcome(&game);
        (outcome, String::from_utf8(output).unwrap())
    }

    #[test]
    fn console_reasks_until_valid() {
        let (outcome, output) = ask("3\nwhite\n 2 \n");
        assert_eq!(outcome.unwrap(), Outcome::SecondWins);
        assert!(output.starts_with("Round 2, game 1/3: Judit Polgar (HU00001) (black)"));
        assert_eq!(output.matches("Who is the winner ?").count(), 3);
    }

    #[test]
    fn console_fails_on_closed_input() {
        let (outcome, _) = ask("9\n");
        assert!(outcome
            .unwrap_err()
            .to_string()
            .contains("input closed before the result of HU00001 vs HU00002"));
    }

    #[test]
    fn players_are_selected_by_id() {
        let registered = vec![player("AA00001"), player("BB00002"), player("CC00003")];
        let selected =
            select_players(registered.clone(), &["CC00003".into(), "AA00001".into()]).unwrap();
        assert_eq!(selected, vec![player("CC00003"), player("AA00001")]);
        assert_eq!(select_players(registered.clone(), &[]).unwrap().len(), 3);
        assert!(select_players(registered, &["ZZ99999".into()]).is_err());
    }

    #[test]
    fn command_line() {
        let args = Args::try_parse_from([
            "swiss-tournament",
            "start",
            "--name",
            "Open",
            "--location",
            "Paris",
            "--start-date",
            "2030-01-01",
            "--end-date",
            "2030-01-02",
            "--residue",
            "bye",
            "--player",
            "AA00001",
            "--player",
            "BB00002",
        ])
        .unwrap();
        match args.command {
            Command::Start {
                residue, players, ..
            } => {
                assert_eq!(residue, Some(ResiduePolicy::Bye));
                assert_eq!(players.len(), 2);
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert_eq!(args.data_dir, PathBuf::from("data"));
    }

    #[test]
    fn tournament_players_by_name() {
        let args =
            Args::try_parse_from(["swiss-tournament", "tournament-players", "Spring Open"]).unwrap();
        assert!(matches!(
            args.command,
            Command::TournamentPlayers { name } if name == "Spring Open"
        ));
    }
}
