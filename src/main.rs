//! Grid Gambit: survive on a chess board swarming with enemy pieces.
//!
//! ## Usage
//!
//! - `grid-gambit` - play through the text console on stdin/stdout
//! - `grid-gambit demo --turns 40` - watch the engine play itself
//!
//! Logs go to stderr; raise them with `--log-level debug` or `RUST_LOG`.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use grid_gambit::board::Cell;
use grid_gambit::config::{Difficulty, EngineConfig};
use grid_gambit::console::Console;
use grid_gambit::engine::{Game, MoveRequest};

#[derive(Parser)]
#[command(name = "grid-gambit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Seed for spawns and tie-breaks; random when omitted
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// easy, normal, hard, insane or duos
    #[arg(long, global = true, default_value_t = Difficulty::Normal)]
    difficulty: Difficulty,

    /// JSON file overriding engine settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Read console commands from stdin
    Play,
    /// Auto-play random legal moves, captures first
    Demo {
        /// Turns to play before stopping
        #[arg(long, default_value_t = 30)]
        turns: u32,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;

    let config = load_config(cli.config.as_deref())?;
    let seed = cli.seed.unwrap_or_else(|| fastrand::u64(..));

    match cli.command {
        Some(Commands::Play) | None => {
            let mut console = Console::seeded(cli.difficulty, config, seed);
            console.run().context("console I/O failed")?;
        }
        Some(Commands::Demo { turns }) => run_demo(cli.difficulty, config, seed, turns),
    }
    Ok(())
}

fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .with_context(|| format!("invalid log level {level:?}"))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn load_config(path: Option<&std::path::Path>) -> Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    EngineConfig::from_json(&text).with_context(|| format!("parsing {}", path.display()))
}

fn run_demo(difficulty: Difficulty, config: EngineConfig, seed: u64, turns: u32) {
    println!("Grid Gambit demo: {difficulty}, seed {seed}\n");

    let mut game = Game::with_rng(difficulty, config, fastrand::Rng::with_seed(seed));
    game.start_session(difficulty);
    let mut picker = fastrand::Rng::with_seed(seed ^ 0x9e37_79b9);

    for _ in 0..turns {
        let request = game.players().filter(|p| p.is_alive).find_map(|p| {
            let slot = p.slot;
            let targets = game.player_targets(slot)?;
            let enemies: Vec<_> = targets
                .captures
                .iter()
                .copied()
                .filter(|&v| matches!(game.board().get(v), Some(Cell::Piece(_))))
                .collect();
            let empty: Vec<_> = targets
                .moves
                .iter()
                .copied()
                .filter(|&v| game.board().get(v).is_some_and(|c| c.is_empty()))
                .collect();
            if let Some(&target) = pick(&mut picker, &enemies) {
                Some(MoveRequest::capture(target, difficulty).by(slot))
            } else {
                let target = pick(&mut picker, &empty).copied().unwrap_or(p.position);
                Some(MoveRequest::step(target, difficulty).by(slot))
            }
        });
        let Some(request) = request else {
            break;
        };

        let outcome = game.move_player(request);
        if !outcome.is_accepted() {
            continue;
        }
        game.process_pieces(difficulty);
        game.update_capture_tiles();

        println!("turn {} ({outcome:?})", game.turn_number());
        println!("{}", game.render());
        if game.is_game_over() {
            break;
        }
    }

    game.end_session();
    println!(
        "xp {}  gems {}  turns survived {}",
        game.total_xp(),
        game.total_gems(),
        game.total_turns_survived()
    );
}

fn pick<'a, T>(rng: &mut fastrand::Rng, items: &'a [T]) -> Option<&'a T> {
    if items.is_empty() {
        None
    } else {
        items.get(rng.usize(..items.len()))
    }
}
