//! Line-oriented text protocol for driving a [`Game`] from a terminal or a
//! frontend process.
//!
//! Each request is one line, optionally prefixed by a numeric id. Each reply
//! starts with `=` on success or `?` on failure, echoes the id, and ends with
//! a blank line:
//!
//! ```text
//! 7 move 3 3
//! =7 moved; turn 1
//! ```
//!
//! The console is a host: after every accepted player action it runs the
//! enemy sweep and refreshes the threatened cells before answering.
//!
//! ## Commands
//!
//! - `name`, `version`, `list_commands`, `known_command <cmd>`, `quit`
//! - `new [difficulty]` - start a fresh session
//! - `move <x> <y> [2]`, `capture <x> <y> [2]`, `wait [2]`
//! - `upgrade`, `restart`, `end`, `reset`
//! - `add <x> <y> <kind>` - place an enemy by hand
//! - `show` - text board, `state` - JSON snapshot, `threats` - threatened cells

use std::io::{self, BufRead, Write};

use tracing::info;

use crate::board::{Slot, Vector};
use crate::config::{Difficulty, EngineConfig};
use crate::engine::{Game, MoveOutcome, MoveRequest};
use crate::kind::PieceKind;
use crate::rng::RandomSource;

const KNOWN_COMMANDS: &[&str] = &[
    "add",
    "capture",
    "end",
    "known_command",
    "list_commands",
    "move",
    "name",
    "new",
    "quit",
    "reset",
    "restart",
    "show",
    "state",
    "threats",
    "upgrade",
    "version",
    "wait",
];

/// Console host state.
pub struct Console<R = fastrand::Rng> {
    game: Game<R>,
}

impl Console {
    pub fn new(difficulty: Difficulty) -> Self {
        Self::with_game(Game::new(difficulty))
    }

    /// Reproducible session with a custom configuration.
    pub fn seeded(difficulty: Difficulty, config: EngineConfig, seed: u64) -> Self {
        Self::with_game(Game::with_rng(
            difficulty,
            config,
            fastrand::Rng::with_seed(seed),
        ))
    }
}

impl<R: RandomSource> Console<R> {
    pub fn with_game(mut game: Game<R>) -> Self {
        let difficulty = game.difficulty();
        game.start_session(difficulty);
        Self { game }
    }

    pub fn game(&self) -> &Game<R> {
        &self.game
    }

    /// Serve requests from stdin until `quit` or end of input.
    pub fn run(&mut self) -> io::Result<()> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        self.serve(stdin.lock(), stdout.lock())
    }

    /// Serve requests from any reader, writing replies to `out`.
    pub fn serve<I: BufRead, O: Write>(&mut self, input: I, mut out: O) -> io::Result<()> {
        for line in input.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (id, command_line) = Self::parse_id(line);
            let parts: Vec<&str> = command_line.split_whitespace().collect();
            let Some((&command, args)) = parts.split_first() else {
                continue;
            };
            let command = command.to_lowercase();

            let (success, message) = self.execute(&command, args);
            let prefix = if success { '=' } else { '?' };
            let id_str = id.map(|i| i.to_string()).unwrap_or_default();
            writeln!(out, "{prefix}{id_str} {message}\n")?;
            out.flush()?;

            if command == "quit" {
                break;
            }
        }
        Ok(())
    }

    /// Split an optional leading numeric id from the rest of the line.
    fn parse_id(line: &str) -> (Option<u32>, &str) {
        let trimmed = line.trim();
        let end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        if end == 0 {
            return (None, trimmed);
        }
        match trimmed[..end].parse::<u32>() {
            Ok(id) => (Some(id), trimmed[end..].trim()),
            Err(_) => (None, trimmed),
        }
    }

    /// Execute one command and return (success, response).
    pub fn execute(&mut self, command: &str, args: &[&str]) -> (bool, String) {
        match command {
            "name" => (true, env!("CARGO_PKG_NAME").to_string()),

            "version" => (true, env!("CARGO_PKG_VERSION").to_string()),

            "list_commands" => (true, KNOWN_COMMANDS.join("\n")),

            "known_command" => {
                let Some(name) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                let known = KNOWN_COMMANDS.contains(&name.to_lowercase().as_str());
                (true, known.to_string())
            }

            "quit" => (true, String::new()),

            "new" => {
                let difficulty = match args.first().map(|s| s.parse::<Difficulty>()) {
                    None => self.game.difficulty(),
                    Some(Ok(d)) => d,
                    Some(Err(e)) => return (false, e.to_string()),
                };
                self.game.start_session(difficulty);
                self.game.update_capture_tiles();
                (true, format!("{difficulty} {0}x{0}", self.game.grid_size()))
            }

            "move" | "capture" => {
                let Some(target) = parse_cell(args) else {
                    return (false, "expected <x> <y>".to_string());
                };
                let slot = match parse_slot(args.get(2)) {
                    Ok(slot) => slot,
                    Err(message) => return (false, message),
                };
                let difficulty = self.game.difficulty();
                let request = if command == "capture" {
                    MoveRequest::capture(target, difficulty)
                } else {
                    MoveRequest::step(target, difficulty)
                };
                self.play(request.by(slot))
            }

            "wait" => {
                let slot = match parse_slot(args.first()) {
                    Ok(slot) => slot,
                    Err(message) => return (false, message),
                };
                let Some(here) = self.game.player_position(slot) else {
                    return (false, format!("{slot} is not in this session"));
                };
                self.play(MoveRequest::step(here, self.game.difficulty()).by(slot))
            }

            "upgrade" => match self.game.upgrade_player_kind() {
                Ok(kind) => (true, format!("{kind}; {} gems left", self.game.gems())),
                Err(rejection) => (false, rejection.to_string()),
            },

            "restart" => match self.game.restart_session() {
                Ok(()) => {
                    self.game.update_capture_tiles();
                    (true, format!("{} lives left", self.game.lives_left()))
                }
                Err(rejection) => (false, rejection.to_string()),
            },

            "end" => {
                self.game.end_session();
                (true, self.summary())
            }

            "reset" => {
                self.game.reset_session();
                (true, String::new())
            }

            "add" => {
                let (Some(pos), Some(kind)) = (parse_cell(args), args.get(2)) else {
                    return (false, "expected <x> <y> <kind>".to_string());
                };
                let kind = match kind.parse::<PieceKind>() {
                    Ok(kind) => kind,
                    Err(e) => return (false, e.to_string()),
                };
                match self.game.add_piece(pos.x, pos.y, kind) {
                    Ok(id) => {
                        self.game.update_capture_tiles();
                        (true, id.to_string())
                    }
                    Err(rejection) => (false, rejection.to_string()),
                }
            }

            "show" => (true, format!("\n{}", self.game.render())),

            "state" => match serde_json::to_string(&self.game.snapshot()) {
                Ok(json) => (true, json),
                Err(e) => (false, e.to_string()),
            },

            "threats" => {
                let cells: Vec<String> = self
                    .game
                    .capture_cells()
                    .iter()
                    .map(|v| format!("{} {}", v.x, v.y))
                    .collect();
                (true, cells.join("\n"))
            }

            _ => (false, format!("unknown command: {command}")),
        }
    }

    /// Apply a player action and, if accepted, run the rest of the turn.
    fn play(&mut self, request: MoveRequest) -> (bool, String) {
        let outcome = self.game.move_player(request);
        let head = match outcome {
            MoveOutcome::Rejected(rejection) => return (false, rejection.to_string()),
            MoveOutcome::Moved => "moved".to_string(),
            MoveOutcome::Waited => "waited".to_string(),
            MoveOutcome::Captured { id, kind } => format!("captured {kind} ({id})"),
        };

        let report = self.game.process_pieces(request.difficulty);
        self.game.update_capture_tiles();

        let mut message = format!("{head}; turn {}", self.game.turn_number());
        for (id, slot) in &report.captures {
            message.push_str(&format!("; {slot} taken by {id}"));
        }
        if report.game_over {
            if self.game.lives_left() == 0 {
                self.game.end_session();
                info!("out of lives");
            }
            message.push_str(&format!("; game over, {} lives left", self.game.lives_left()));
        }
        (true, message)
    }

    fn summary(&self) -> String {
        format!(
            "xp {} gems {} turns {}",
            self.game.total_xp(),
            self.game.total_gems(),
            self.game.total_turns_survived()
        )
    }
}

fn parse_cell(args: &[&str]) -> Option<Vector> {
    let x = args.first()?.parse().ok()?;
    let y = args.get(1)?.parse().ok()?;
    Some(Vector::new(x, y))
}

fn parse_slot(arg: Option<&&str>) -> Result<Slot, String> {
    match arg.copied() {
        None | Some("1") => Ok(Slot::One),
        Some("2") => Ok(Slot::Two),
        Some(other) => Err(format!("unknown player: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedRandom;

    fn quiet_console() -> Console<ScriptedRandom> {
        Console::with_game(Game::with_rng(
            Difficulty::Easy,
            EngineConfig::default(),
            ScriptedRandom::constant(0.99),
        ))
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(Console::<ScriptedRandom>::parse_id("12 show"), (Some(12), "show"));
        assert_eq!(Console::<ScriptedRandom>::parse_id("show"), (None, "show"));
    }

    #[test]
    fn test_known_command() {
        let mut console = quiet_console();
        assert_eq!(console.execute("known_command", &["move"]), (true, "true".to_string()));
        assert_eq!(console.execute("known_command", &["genmove"]), (true, "false".to_string()));
        assert!(!console.execute("known_command", &[]).0);
    }

    #[test]
    fn test_move_runs_whole_turn() {
        let mut console = quiet_console();
        let (ok, message) = console.execute("move", &["3", "3"]);
        assert!(ok, "{message}");
        assert_eq!(message, "moved; turn 1");
        assert_eq!(console.game().phase(), crate::engine::Phase::AwaitingPlayerInput);
    }

    #[test]
    fn test_rejections_are_failures() {
        let mut console = quiet_console();
        assert!(!console.execute("move", &["9", "9"]).0);
        assert!(!console.execute("move", &["3"]).0);
        assert!(!console.execute("wait", &["2"]).0);
        assert!(!console.execute("add", &["0", "0", "BlackQueen"]).0);
        assert!(!console.execute("add", &["0", "0", "Dragon"]).0);
        assert!(!console.execute("upgrade", &[]).0);
        assert_eq!(console.game().turn_number(), 0);
    }

    #[test]
    fn test_add_and_capture() {
        let mut console = quiet_console();
        assert_eq!(console.execute("add", &["3", "3", "Bishop"]), (true, "piece-0".to_string()));
        let (ok, message) = console.execute("capture", &["3", "3"]);
        assert!(ok, "{message}");
        assert!(message.starts_with("captured Bishop"));
    }

    #[test]
    fn test_state_is_json() {
        let mut console = quiet_console();
        let (ok, json) = console.execute("state", &[]);
        assert!(ok);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["lives_left"], 4);
    }

    #[test]
    fn test_serve_formats_replies() {
        let mut console = quiet_console();
        let input = b"1 name\n# comment\n\nbogus\nquit\nname\n";
        let mut out = Vec::new();
        console.serve(&input[..], &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "=1 grid-gambit\n\n? unknown command: bogus\n\n= \n\n");
    }
}
