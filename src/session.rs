//! Session lifecycle: starting, upgrading, ending and restarting a run, and
//! the read-only [`Snapshot`] handed to hosts.

use serde::Serialize;
use tracing::info;

use crate::board::{Cell, PieceId, Slot, Vector};
use crate::config::Difficulty;
use crate::engine::{Game, Phase, Piece, Player};
use crate::error::Rejection;
use crate::kind::PlayerKind;
use crate::rng::RandomSource;

impl<R: RandomSource> Game<R> {
    /// Begin a new run: fresh board for `difficulty`, all counters cleared,
    /// full lives.
    pub fn start_session(&mut self, difficulty: Difficulty) {
        self.lay_out_board(difficulty);
        self.clear_counters();
        self.phase = Phase::AwaitingPlayerInput;
        info!(%difficulty, grid = self.grid_size, "session started");
    }

    /// Buy the next rung of the upgrade ladder.
    pub fn upgrade_player_kind(&mut self) -> Result<PlayerKind, Rejection> {
        let next = self.player_kind.next().ok_or(Rejection::MaxUpgrade)?;
        let cost = self
            .config
            .upgrade_cost(self.player_kind.tier())
            .ok_or(Rejection::MaxUpgrade)?;
        if self.gems < cost {
            return Err(Rejection::InsufficientGems {
                cost,
                have: self.gems,
            });
        }
        self.gems -= cost;
        self.player_kind = next;
        info!(kind = %next, cost, "player upgraded");
        Ok(next)
    }

    pub fn add_xp(&mut self, amount: u64) {
        self.xp += amount;
    }

    /// Close the run and record its totals. Turns are only counted the
    /// first time a run ends.
    pub fn end_session(&mut self) {
        self.total_xp = self.xp;
        self.total_gems = self.gems;
        if !self.is_game_over {
            self.is_game_over = true;
            self.total_turns_survived += u64::from(self.turn_number);
        }
        self.phase = Phase::GameOver;
    }

    /// Spend a life on a fresh board. XP and gems carry over; the piece goes
    /// back to a pawn.
    pub fn restart_session(&mut self) -> Result<(), Rejection> {
        if self.lives_left == 0 {
            return Err(Rejection::NoLivesLeft);
        }
        self.lives_left -= 1;
        self.total_xp = self.xp;
        self.total_gems = self.gems;
        self.total_turns_survived += u64::from(self.turn_number);
        self.lay_out_board(self.difficulty);
        self.phase = Phase::AwaitingPlayerInput;
        info!(lives_left = self.lives_left, "session restarted");
        Ok(())
    }

    /// Back to the baseline, forgetting every counter.
    pub fn reset_session(&mut self) {
        self.lay_out_board(self.difficulty);
        self.clear_counters();
        self.phase = Phase::Idle;
    }

    fn clear_counters(&mut self) {
        self.xp = 0;
        self.gems = 0;
        self.total_xp = 0;
        self.total_gems = 0;
        self.total_turns_survived = 0;
        self.lives_left = self.config.max_lives;
    }

    /// Everything a host can read, in one serializable value.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            difficulty: self.difficulty,
            grid_size: self.grid_size,
            phase: self.phase,
            turn_number: self.turn_number,
            xp: self.xp,
            gems: self.gems,
            total_xp: self.total_xp,
            total_gems: self.total_gems,
            total_turns_survived: self.total_turns_survived,
            lives_left: self.lives_left,
            is_game_over: self.is_game_over,
            player_kind: self.player_kind,
            players: self.players().cloned().collect(),
            pieces: self.pieces.values().cloned().collect(),
            pending_deletions: self.deletion_queue.clone(),
            capture_cells: self.capture_cells.iter().copied().collect(),
            board: self.board.labels(),
        }
    }

    /// Text rendering: `1`/`2` for players, kind glyphs for enemies (upper
    /// case when armed), `*` for threatened empty cells.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for y in 0..self.grid_size {
            for x in 0..self.grid_size {
                let v = Vector::new(x, y);
                let ch = match self.board.get(v) {
                    Some(Cell::Player(Slot::One)) => '1',
                    Some(Cell::Player(Slot::Two)) => '2',
                    Some(Cell::Piece(id)) => self.piece_glyph(id),
                    _ if self.capture_cells.contains(&v) => '*',
                    _ => '.',
                };
                out.push(ch);
                out.push(' ');
            }
            out.push('\n');
        }
        out
    }

    fn piece_glyph(&self, id: PieceId) -> char {
        self.pieces.get(&id).map_or('?', |p| {
            if p.cooldown == 0 && p.attack_delay == 0 {
                p.kind.glyph().to_ascii_uppercase()
            } else {
                p.kind.glyph()
            }
        })
    }
}

/// Read-only projection of a [`Game`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Snapshot {
    pub difficulty: Difficulty,
    pub grid_size: i32,
    pub phase: Phase,
    pub turn_number: u32,
    pub xp: u64,
    pub gems: u64,
    pub total_xp: u64,
    pub total_gems: u64,
    pub total_turns_survived: u64,
    pub lives_left: u32,
    pub is_game_over: bool,
    pub player_kind: PlayerKind,
    pub players: Vec<Player>,
    pub pieces: Vec<Piece>,
    pub pending_deletions: Vec<PieceId>,
    pub capture_cells: Vec<Vector>,
    /// Row-major cell labels: empty, `Player1`/`Player2`, or a piece id.
    pub board: Vec<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::engine::MoveRequest;
    use crate::rng::ScriptedRandom;

    fn quiet_game() -> Game<ScriptedRandom> {
        Game::with_rng(
            Difficulty::Easy,
            EngineConfig::default(),
            ScriptedRandom::constant(0.99),
        )
    }

    #[test]
    fn test_upgrade_ladder() {
        let mut game = quiet_game();
        assert_eq!(
            game.upgrade_player_kind(),
            Err(Rejection::InsufficientGems { cost: 20, have: 0 })
        );
        game.gems = 200;
        assert_eq!(game.upgrade_player_kind(), Ok(PlayerKind::Knight));
        assert_eq!(game.upgrade_player_kind(), Ok(PlayerKind::Rook));
        assert_eq!(game.upgrade_player_kind(), Ok(PlayerKind::Bishop));
        assert_eq!(game.upgrade_player_kind(), Ok(PlayerKind::Queen));
        assert_eq!(game.gems(), 200 - 20 - 30 - 50 - 80);
        assert_eq!(game.upgrade_player_kind(), Err(Rejection::MaxUpgrade));
        assert_eq!(game.gems(), 20);
    }

    #[test]
    fn test_upgraded_piece_moves_differently() {
        let mut game = quiet_game();
        game.gems = 20;
        game.upgrade_player_kind().unwrap();
        // Knight jump from (3, 4)
        let outcome = game.move_player(MoveRequest::step(Vector::new(4, 6), Difficulty::Easy));
        assert!(outcome.is_accepted());
    }

    #[test]
    fn test_end_session_counts_turns_once() {
        let mut game = quiet_game();
        game.move_player(MoveRequest::step(Vector::new(3, 3), Difficulty::Easy));
        game.end_session();
        game.end_session();
        assert!(game.is_game_over());
        assert_eq!(game.total_turns_survived(), 1);
        assert_eq!(game.total_xp(), game.xp());
        assert_eq!(game.phase(), Phase::GameOver);
    }

    #[test]
    fn test_restart_carries_totals() {
        let mut game = quiet_game();
        game.move_player(MoveRequest::step(Vector::new(3, 3), Difficulty::Easy));
        game.add_xp(10);
        let xp = game.xp();
        game.restart_session().unwrap();
        assert_eq!(game.lives_left(), 3);
        assert_eq!(game.total_xp(), xp);
        assert_eq!(game.xp(), xp);
        assert_eq!(game.total_turns_survived(), 1);
        assert_eq!(game.turn_number(), 0);
        assert_eq!(game.player_position(Slot::One), Some(Vector::new(3, 4)));
        assert!(!game.is_game_over());
    }

    #[test]
    fn test_restart_without_lives_is_refused() {
        let mut game = quiet_game();
        for _ in 0..4 {
            game.restart_session().unwrap();
        }
        let before = game.snapshot();
        assert_eq!(game.restart_session(), Err(Rejection::NoLivesLeft));
        assert_eq!(game.snapshot(), before);
    }

    #[test]
    fn test_reset_and_start() {
        let mut game = quiet_game();
        game.add_xp(5);
        game.restart_session().unwrap();
        game.reset_session();
        assert_eq!(game.phase(), Phase::Idle);
        assert_eq!(game.xp(), 0);
        assert_eq!(game.lives_left(), 4);

        game.start_session(Difficulty::Duos);
        assert_eq!(game.grid_size(), 10);
        assert!(game.player(Slot::Two).is_some());
        assert_eq!(game.phase(), Phase::AwaitingPlayerInput);
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut game = quiet_game();
        game.add_piece(0, 0, "Rook".parse().unwrap()).unwrap();
        let json = serde_json::to_value(game.snapshot()).unwrap();
        assert_eq!(json["grid_size"], 8);
        assert_eq!(json["pieces"][0]["kind"], "Rook");
        assert_eq!(json["board"][4][3], "Player1");
        assert_eq!(json["board"][0][0], "piece-0");
        assert_eq!(json["player_kind"], "BlackPawn");
        assert_eq!(json["difficulty"], "easy");
    }

    #[test]
    fn test_render() {
        let mut game = quiet_game();
        game.add_piece(0, 0, "Knight".parse().unwrap()).unwrap();
        let text = game.render();
        let first = text.lines().next().unwrap();
        assert!(first.starts_with("n "));
        assert_eq!(text.lines().nth(4).unwrap().chars().nth(6), Some('1'));
    }
}
