mod render;
mod summary;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::{Parser, Subcommand};
use gemrush::playtest::{GreedyBot, best_move};
use gemrush::settings::{EngineSettings, SettingsStore};
use gemrush::{Coord, MoveOutcome, Session, SessionEvent, SessionState};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use render::render_view;
use summary::RunSummary;

#[derive(Debug, Parser)]
#[command(name = "gemrush")]
#[command(about = "Timed match-3 rounds in the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Play a round interactively on stdin.
    Play {
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Let the greedy bot play a round and report the result as JSON.
    Simulate {
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, default_value_t = u32::MAX)]
        max_moves: u32,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Show the effective settings.
    Settings {
        #[arg(long, default_value_t = false)]
        write_defaults: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let store = SettingsStore::from_env();

    match cli.command {
        Commands::Play { seed } => cmd_play(&store.load(), seed),
        Commands::Simulate {
            seed,
            max_moves,
            out,
        } => cmd_simulate(&store.load(), seed, max_moves, out),
        Commands::Settings { write_defaults } => cmd_settings(&store, write_defaults),
    }
}

fn pick_seed(settings: &EngineSettings, seed: Option<u64>) -> u64 {
    seed.or(settings.seed).unwrap_or_else(rand::random)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlayCommand {
    Swap(Coord, Coord),
    Tick(u64),
    Hint,
    Show,
    End,
    Quit,
    Help,
}

fn parse_command(line: &str) -> Result<PlayCommand> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(PlayCommand::Show);
    };
    let numbers = words
        .map(|w| w.parse::<usize>().with_context(|| format!("'{w}' is not a number")))
        .collect::<Result<Vec<_>>>()?;

    let command = match (verb, numbers.as_slice()) {
        ("swap" | "s", &[r1, c1, r2, c2]) => {
            PlayCommand::Swap(Coord::new(r1, c1), Coord::new(r2, c2))
        }
        ("swap" | "s", _) => bail!("usage: swap <row> <col> <row> <col>"),
        ("tick" | "t", &[]) => PlayCommand::Tick(1),
        ("tick" | "t", &[secs]) => PlayCommand::Tick(secs as u64),
        ("hint" | "h", &[]) => PlayCommand::Hint,
        ("show", &[]) => PlayCommand::Show,
        ("end", &[]) => PlayCommand::End,
        ("quit" | "q" | "exit", &[]) => PlayCommand::Quit,
        ("help" | "?", &[]) => PlayCommand::Help,
        _ => bail!("unknown command '{}' (try 'help')", line.trim()),
    };
    Ok(command)
}

const HELP: &str = "\
commands:
  swap r1 c1 r2 c2   swap two neighbouring gems
  tick [secs]        advance the clock (default 1)
  hint               suggest a productive swap
  show               redraw the board
  end                end the round now
  quit               leave without finishing";

fn cmd_play(settings: &EngineSettings, seed: Option<u64>) -> Result<()> {
    let seed = pick_seed(settings, seed);
    let mut session = Session::with_settings(seed, settings);
    info!(seed, "starting interactive session");

    let mut report_event = |_: &SessionState, event: &SessionEvent| match event {
        SessionEvent::CascadeStep { index, points } => {
            println!("  chain {}: +{}", index + 1, points);
        }
        SessionEvent::Over => println!("Time is up."),
        _ => debug!(?event, "session event"),
    };

    println!("Seed {seed}. Type 'help' for commands.");
    print!("{}", render_view(&session.view()));

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    while !session.is_over() {
        print!("> ");
        io::stdout().flush().context("Failed to flush stdout")?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("Failed to read stdin")?;

        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(err) => {
                println!("{err:#}");
                continue;
            }
        };

        match command {
            PlayCommand::Swap(from, to) => {
                match session.submit_move_observed(from, to, &mut report_event) {
                    Ok(MoveOutcome::Reverted) => println!("No match; swap undone."),
                    Ok(MoveOutcome::Resolved(report)) => println!(
                        "+{} points over {} chain(s)",
                        report.total_points,
                        report.chain_len()
                    ),
                    Err(err) => println!("{err}"),
                }
            }
            PlayCommand::Tick(secs) => {
                session.tick_observed(secs, &mut report_event);
            }
            PlayCommand::Hint => match best_move(session.grid()) {
                Some(m) => println!(
                    "Try swap {} {} {} {}",
                    m.from.row, m.from.col, m.to.row, m.to.col
                ),
                None => println!("No productive swap on this board."),
            },
            PlayCommand::Show => {}
            PlayCommand::End => session.end_session(),
            PlayCommand::Quit => return Ok(()),
            PlayCommand::Help => {
                println!("{HELP}");
                continue;
            }
        }
        print!("{}", render_view(&session.view()));
    }

    println!("Final score: {}", session.score());
    Ok(())
}

fn cmd_simulate(
    settings: &EngineSettings,
    seed: Option<u64>,
    max_moves: u32,
    out: Option<PathBuf>,
) -> Result<()> {
    let seed = pick_seed(settings, seed);
    let mut session = Session::with_settings(seed, settings);
    let report = GreedyBot::new(max_moves).play(&mut session);
    info!(seed, moves = report.moves, score = session.score(), "simulation finished");

    let summary = RunSummary::new(&session, &report, Utc::now());
    println!("{}", serde_json::to_string_pretty(&summary)?);
    if let Some(path) = out {
        summary.write(&path)?;
        println!("Wrote {}", path.display());
    }
    Ok(())
}

fn cmd_settings(store: &SettingsStore, write_defaults: bool) -> Result<()> {
    if write_defaults {
        store
            .save(&EngineSettings::default())
            .with_context(|| format!("Failed to write {}", store.path().display()))?;
        println!("Wrote defaults to {}", store.path().display());
    }
    let settings = store.load();
    println!("# {}", store.path().display());
    println!("{}", serde_json::to_string_pretty(&settings)?);
    Ok(())
}
