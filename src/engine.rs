//! The turn engine.
//!
//! A [`Game`] owns the whole world: board, enemy pieces, players, and the
//! session counters. A host drives one turn with three calls, in order:
//!
//! 1. [`Game::move_player`] validates and applies the player's action.
//! 2. [`Game::process_pieces`] spawns enemies and resolves their captures
//!    and moves.
//! 3. [`Game::update_capture_tiles`] refreshes the threatened-cell cache.
//!
//! The engine never chains these itself. Every action is total: invalid
//! input leaves the world untouched and comes back as a [`Rejection`].
//!
//! Enemies are swept in ascending [`PieceId`] order, so a capture made by an
//! older piece is visible to every younger piece in the same sweep.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::{debug, info, trace, warn};

use crate::board::{Board, Cell, PieceId, Slot, Vector};
use crate::config::{Difficulty, EngineConfig};
use crate::constants::SPAWN_ATTACK_DELAY;
use crate::error::Rejection;
use crate::kind::{EnemyKind, PieceKind, PlayerKind};
use crate::rng::RandomSource;
use crate::rules::{captures_from, moves_from};
use crate::score::{capture_gems, capture_xp, passive_xp};
use crate::spawn::{piece_and_position, spawn_count};

/// An enemy piece.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Piece {
    /// Identifier, also written into the piece's board cell.
    pub id: PieceId,
    /// Current cell.
    pub position: Vector,
    /// Always an enemy-track kind once the sanity pass has run.
    pub kind: PieceKind,
    /// Sweeps left before the piece may capture again.
    pub cooldown: u32,
    /// Spawn protection, spent on the first sweep whose cooldown reaches
    /// zero. That sweep cannot capture.
    pub attack_delay: u32,
    /// Tombstone flag. The record lingers until the next accepted move.
    pub is_captured: bool,
    /// Pursuit steps taken so far.
    pub moves_made: u32,
}

/// A player seat's piece.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Player {
    /// Seat this piece belongs to.
    pub slot: Slot,
    /// Current cell. A captured player keeps the cell it was taken on.
    pub position: Vector,
    /// Turns until the capture indicator recharges. Advisory only.
    pub capture_cooldown_left: u32,
    /// False once an enemy has captured this player.
    pub is_alive: bool,
}

/// Where the world stands in the three-call turn sequence. Reported for
/// hosts; the engine does not refuse out-of-order calls.
///
/// A turn cycles `AwaitingPlayerInput` → `Resolving` → `AwaitingPlayerInput`.
/// The resting state between turns is `AwaitingPlayerInput`, not `Idle`:
/// `Idle` only marks a world that [`Game::reset_session`] has put back to
/// its baseline and that no session has started on yet. `GameOver` is
/// terminal until a restart or a new session.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Phase {
    /// Fresh baseline after a hard reset, before a session starts.
    Idle,
    /// Between turns: waiting for the next player action.
    AwaitingPlayerInput,
    /// A player action was applied; enemies and threats are pending.
    Resolving,
    /// Every player has been captured, or the session was ended.
    GameOver,
}

/// A player action.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MoveRequest {
    pub target: Vector,
    pub capturing: bool,
    pub difficulty: Difficulty,
    pub which: Slot,
}

impl MoveRequest {
    /// Player 1 steps onto `target`.
    pub fn step(target: Vector, difficulty: Difficulty) -> Self {
        Self {
            target,
            capturing: false,
            difficulty,
            which: Slot::One,
        }
    }

    /// Player 1 captures the piece on `target`.
    pub fn capture(target: Vector, difficulty: Difficulty) -> Self {
        Self {
            capturing: true,
            ..Self::step(target, difficulty)
        }
    }

    /// The same action, made by another seat.
    pub fn by(self, which: Slot) -> Self {
        Self { which, ..self }
    }
}

/// Result of [`Game::move_player`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved,
    Captured { id: PieceId, kind: EnemyKind },
    /// The target was the player's own cell: the turn counter advanced and
    /// nothing else changed.
    Waited,
    Rejected(Rejection),
}

impl MoveOutcome {
    /// Whether the host should go on to process the enemies.
    pub fn is_accepted(&self) -> bool {
        !matches!(self, MoveOutcome::Rejected(_))
    }
}

/// What happened during [`Game::process_pieces`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub spawned: Vec<PieceId>,
    pub moved: usize,
    pub captures: Vec<(PieceId, Slot)>,
    pub coerced: usize,
    pub game_over: bool,
}

/// Legal cells for a player's piece, before checking what stands on them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlayerTargets {
    pub moves: Vec<Vector>,
    pub captures: Vec<Vector>,
}

/// The game world.
#[derive(Clone, Debug)]
pub struct Game<R = fastrand::Rng> {
    pub(crate) config: EngineConfig,
    pub(crate) difficulty: Difficulty,
    pub(crate) rng: R,
    pub(crate) grid_size: i32,
    pub(crate) board: Board,
    pub(crate) pieces: BTreeMap<PieceId, Piece>,
    pub(crate) next_id: u32,
    pub(crate) players: [Option<Player>; 2],
    pub(crate) player_kind: PlayerKind,
    pub(crate) deletion_queue: Vec<PieceId>,
    pub(crate) capture_cells: BTreeSet<Vector>,
    pub(crate) turn_number: u32,
    pub(crate) xp: u64,
    pub(crate) gems: u64,
    pub(crate) total_xp: u64,
    pub(crate) total_gems: u64,
    pub(crate) total_turns_survived: u64,
    pub(crate) lives_left: u32,
    pub(crate) is_game_over: bool,
    pub(crate) phase: Phase,
}

impl Game {
    /// A new session with the default configuration and an OS-seeded RNG.
    pub fn new(difficulty: Difficulty) -> Self {
        Self::with_rng(difficulty, EngineConfig::default(), fastrand::Rng::new())
    }

    /// A new session whose random choices are reproducible.
    pub fn with_seed(difficulty: Difficulty, seed: u64) -> Self {
        Self::with_rng(difficulty, EngineConfig::default(), fastrand::Rng::with_seed(seed))
    }
}

impl<R: RandomSource> Game<R> {
    pub fn with_rng(difficulty: Difficulty, config: EngineConfig, rng: R) -> Self {
        let mut game = Self {
            lives_left: config.max_lives,
            config,
            difficulty,
            rng,
            grid_size: difficulty.grid_size(),
            board: Board::new(difficulty.grid_size()),
            pieces: BTreeMap::new(),
            next_id: 0,
            players: [None, None],
            player_kind: PlayerKind::Pawn,
            deletion_queue: Vec::new(),
            capture_cells: BTreeSet::new(),
            turn_number: 0,
            xp: 0,
            gems: 0,
            total_xp: 0,
            total_gems: 0,
            total_turns_survived: 0,
            is_game_over: false,
            phase: Phase::AwaitingPlayerInput,
        };
        game.lay_out_board(difficulty);
        game
    }

    /// Clear the world and place the players for `difficulty`. Session
    /// counters are left to the caller.
    pub(crate) fn lay_out_board(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
        self.grid_size = difficulty.grid_size();
        self.board = Board::new(self.grid_size);
        self.pieces.clear();
        self.next_id = 0;
        self.deletion_queue.clear();
        self.capture_cells.clear();
        self.player_kind = PlayerKind::Pawn;
        self.turn_number = 0;
        self.is_game_over = false;

        let half = self.grid_size / 2;
        let mut spawns = vec![(Slot::One, Vector::new(half - 1, half))];
        if difficulty.is_duo() {
            spawns.push((Slot::Two, Vector::new(half, half - 1)));
        }
        self.players = [None, None];
        for (slot, position) in spawns {
            self.board.set(position, Cell::Player(slot));
            self.players[slot.index()] = Some(Player {
                slot,
                position,
                capture_cooldown_left: self.config.player_capture_cooldown,
                is_alive: true,
            });
        }
    }

    // =========================================================================
    // Actions
    // =========================================================================

    /// Apply a player action. Rejected actions change nothing, not even the
    /// turn counter.
    pub fn move_player(&mut self, request: MoveRequest) -> MoveOutcome {
        match self.try_move_player(request) {
            Ok(outcome) => outcome,
            Err(rejection) => {
                debug!(%rejection, slot = %request.which, "player action rejected");
                MoveOutcome::Rejected(rejection)
            }
        }
    }

    fn try_move_player(&mut self, request: MoveRequest) -> Result<MoveOutcome, Rejection> {
        let slot = request.which;
        let player = self.players[slot.index()]
            .as_ref()
            .ok_or(Rejection::AbsentPlayer(slot))?;
        if !player.is_alive {
            return Err(Rejection::DeadPlayer(slot));
        }
        if self.is_game_over {
            return Err(Rejection::GameOver);
        }
        let current = player.position;
        let target = request.target;

        if target == current {
            self.turn_number += 1;
            debug!(turn = self.turn_number, %slot, "player waited");
            return Ok(MoveOutcome::Waited);
        }

        let cell = self
            .board
            .get(target)
            .ok_or(Rejection::OutOfBounds(target))?;
        let kind = PieceKind::Player(self.player_kind);
        let occupied = self.board.occupied_cells();

        // Both rule lookups use the player's own cell as the reference position.
        let captured = if request.capturing {
            let Cell::Piece(id) = cell else {
                return Err(Rejection::IllegalCapture(target));
            };
            if !captures_from(kind, current, current, &occupied, self.grid_size).contains(&target) {
                return Err(Rejection::IllegalCapture(target));
            }
            Some(id)
        } else {
            if !moves_from(kind, current, current, &occupied, self.grid_size).contains(&target) {
                return Err(Rejection::IllegalMove(target));
            }
            None
        };

        self.turn_number += 1;
        self.xp += passive_xp(request.difficulty, self.turn_number);
        self.gems += self.config.survival_gems;
        for player in self.players.iter_mut().flatten() {
            player.capture_cooldown_left = player.capture_cooldown_left.saturating_sub(1);
        }
        self.flush_deletions();

        let mut outcome = MoveOutcome::Moved;
        if let Some(id) = captured {
            if let Some(kind) = self.tombstone(id) {
                self.xp += capture_xp(kind);
                self.gems += capture_gems(kind);
                outcome = MoveOutcome::Captured { id, kind };
            }
            let cooldown = self.config.player_capture_cooldown;
            if let Some(player) = self.players[slot.index()].as_mut() {
                player.capture_cooldown_left = cooldown;
            }
        }

        self.board.relocate(current, target, Cell::Player(slot));
        if let Some(player) = self.players[slot.index()].as_mut() {
            player.position = target;
        }
        self.phase = Phase::Resolving;

        debug!(turn = self.turn_number, %slot, from = %current, to = %target, ?outcome, "player moved");
        debug_assert!(self.occupancy_consistent(), "occupancy broken after move");
        Ok(outcome)
    }

    /// Spawn new enemies, then let every live enemy capture or move.
    pub fn process_pieces(&mut self, difficulty: Difficulty) -> SweepReport {
        let mut report = SweepReport {
            coerced: self.coerce_enemy_kinds(),
            ..SweepReport::default()
        };
        report.spawned = self.spawn_enemies(difficulty);

        let may_move = self.turn_number % difficulty.move_cadence() == 0;
        let ids: Vec<PieceId> = self.pieces.keys().copied().collect();

        for id in ids {
            let Some(piece) = self.pieces.get_mut(&id) else {
                continue;
            };
            if piece.is_captured {
                continue;
            }
            piece.cooldown = piece.cooldown.saturating_sub(1);
            // Spawn protection is spent on the first sweep the cooldown allows
            // a capture, and blocks that capture.
            let mut can_capture = false;
            if piece.cooldown == 0 {
                if piece.attack_delay > 0 {
                    piece.attack_delay -= 1;
                } else {
                    can_capture = true;
                }
            }
            let (pos, kind) = (piece.position, piece.kind);

            // Re-read every iteration: an earlier piece may have just captured.
            let alive = self.alive_players();
            if alive.is_empty() {
                continue;
            }

            if can_capture {
                let occupied = self.board.occupied_cells();
                let caps = captures_from(kind, pos, pos, &occupied, self.grid_size);
                if let Some(&(slot, target)) = alive.iter().find(|(_, p)| caps.contains(p)) {
                    self.enemy_capture(id, slot, target);
                    report.captures.push((id, slot));
                    continue;
                }
            }

            if may_move && self.pursue(id, pos, kind, &alive) {
                report.moved += 1;
            }
        }

        report.game_over = self.is_game_over;
        if !self.is_game_over {
            self.phase = Phase::Resolving;
        }
        debug_assert!(self.occupancy_consistent(), "occupancy broken after sweep");
        report
    }

    /// Recompute the cells currently threatened by armed enemies.
    pub fn update_capture_tiles(&mut self) {
        let occupied = self.board.occupied_cells();
        let alive = self.alive_players();
        let mut cells = BTreeSet::new();
        for piece in self.pieces.values() {
            if piece.is_captured || piece.cooldown > 0 || piece.attack_delay > 0 {
                continue;
            }
            for &(_, player_pos) in &alive {
                cells.extend(captures_from(
                    piece.kind,
                    piece.position,
                    player_pos,
                    &occupied,
                    self.grid_size,
                ));
            }
        }
        self.capture_cells = cells;
        if !self.is_game_over {
            self.phase = Phase::AwaitingPlayerInput;
        }
    }

    /// Place an enemy directly. Upgrade-track kinds, off-board cells and
    /// occupied cells are refused.
    pub fn add_piece(&mut self, x: i32, y: i32, kind: PieceKind) -> Result<PieceId, Rejection> {
        if kind.is_player() {
            return Err(Rejection::PlayerKind);
        }
        let pos = Vector::new(x, y);
        match self.board.get(pos) {
            None => Err(Rejection::OutOfBounds(pos)),
            Some(Cell::Empty) => Ok(self.create_piece(pos, kind)),
            Some(_) => Err(Rejection::Occupied(pos)),
        }
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Insert a fresh enemy. The kind is normalized onto the enemy track.
    fn create_piece(&mut self, pos: Vector, kind: PieceKind) -> PieceId {
        let kind = kind.to_enemy();
        let id = PieceId(self.next_id);
        self.next_id += 1;
        self.pieces.insert(
            id,
            Piece {
                id,
                position: pos,
                kind: PieceKind::Enemy(kind),
                cooldown: kind.base_cooldown(),
                attack_delay: SPAWN_ATTACK_DELAY,
                is_captured: false,
                moves_made: 0,
            },
        );
        self.board.set(pos, Cell::Piece(id));
        id
    }

    /// Enemies must never carry an upgrade-track kind. Any that do are put
    /// back on the enemy track and reported.
    fn coerce_enemy_kinds(&mut self) -> usize {
        let mut coerced = 0;
        for piece in self.pieces.values_mut() {
            if let PieceKind::Player(kind) = piece.kind {
                let enemy = kind.to_enemy();
                warn!(id = %piece.id, from = %kind, to = %enemy, "enemy carried a player kind");
                piece.kind = PieceKind::Enemy(enemy);
                coerced += 1;
            }
        }
        coerced
    }

    fn spawn_enemies(&mut self, difficulty: Difficulty) -> Vec<PieceId> {
        let drawn = spawn_count(&mut self.rng, difficulty);
        let live = self.pieces.values().filter(|p| !p.is_captured).count();
        let cap = self.config.spawn_cap(difficulty, self.grid_size);
        let count = drawn.min(cap.saturating_sub(live));

        let mut spawned = Vec::with_capacity(count);
        for _ in 0..count {
            for attempt in 0..self.config.spawn_retries {
                let (kind, pos) =
                    piece_and_position(&mut self.rng, difficulty, self.grid_size, self.player_kind);
                if self.board.get(pos) == Some(Cell::Empty) {
                    let id = self.create_piece(pos, PieceKind::Enemy(kind));
                    trace!(%id, %kind, %pos, "spawned enemy");
                    spawned.push(id);
                    break;
                }
                trace!(attempt, %pos, "spawn cell taken");
            }
        }
        spawned
    }

    fn enemy_capture(&mut self, id: PieceId, slot: Slot, target: Vector) {
        let Some(piece) = self.pieces.get_mut(&id) else {
            return;
        };
        self.board.relocate(piece.position, target, Cell::Piece(id));
        piece.position = target;
        piece.cooldown = piece.kind.base_cooldown().unwrap_or(0);

        if let Some(player) = self.players[slot.index()].as_mut() {
            player.is_alive = false;
        }
        info!(%id, %slot, at = %target, "player captured");

        if self.alive_players().is_empty() {
            self.is_game_over = true;
            self.phase = Phase::GameOver;
            info!(turn = self.turn_number, "game over");
        }
    }

    /// Step toward the nearest living player. Only moves that strictly close
    /// the distance count; ties among the best are broken at random.
    fn pursue(&mut self, id: PieceId, pos: Vector, kind: PieceKind, alive: &[(Slot, Vector)]) -> bool {
        let Some(&(_, first)) = alive.first() else {
            return false;
        };
        let mut target = first;
        let mut best = pos.distance_sq(first);
        for &(_, p) in &alive[1..] {
            let d = pos.distance_sq(p);
            if d < best {
                best = d;
                target = p;
            }
        }

        let occupied = self.board.occupied_cells();
        let improving: Vec<(Vector, i32)> = moves_from(kind, pos, pos, &occupied, self.grid_size)
            .into_iter()
            .map(|m| (m, m.distance_sq(target)))
            .filter(|&(_, d)| d < best)
            .collect();
        let Some(closest) = improving.iter().map(|&(_, d)| d).min() else {
            return false;
        };
        let choices: Vec<Vector> = improving
            .into_iter()
            .filter(|&(_, d)| d == closest)
            .map(|(m, _)| m)
            .collect();
        let choice = choices[self.rng.below(choices.len())];

        self.board.relocate(pos, choice, Cell::Piece(id));
        if let Some(piece) = self.pieces.get_mut(&id) {
            piece.position = choice;
            piece.moves_made += 1;
        }
        debug!(%id, from = %pos, to = %choice, "enemy moved");
        true
    }

    /// Mark a piece captured and clear its cell. The record stays until the
    /// next accepted player move.
    fn tombstone(&mut self, id: PieceId) -> Option<EnemyKind> {
        let piece = self.pieces.get_mut(&id)?;
        if piece.is_captured {
            return None;
        }
        piece.is_captured = true;
        let (pos, kind) = (piece.position, piece.kind.to_enemy());
        if self.board.get(pos) == Some(Cell::Piece(id)) {
            self.board.set(pos, Cell::Empty);
        }
        self.deletion_queue.push(id);
        Some(kind)
    }

    fn flush_deletions(&mut self) {
        for id in self.deletion_queue.drain(..) {
            self.pieces.remove(&id);
        }
    }

    /// Living players in seat order.
    fn alive_players(&self) -> Vec<(Slot, Vector)> {
        self.players
            .iter()
            .flatten()
            .filter(|p| p.is_alive)
            .map(|p| (p.slot, p.position))
            .collect()
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Every enemy record, tombstones included, by id.
    pub fn pieces(&self) -> &BTreeMap<PieceId, Piece> {
        &self.pieces
    }

    /// One enemy record, tombstones included.
    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.get(&id)
    }

    /// The occupancy matrix.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Cells threatened as of the last [`Game::update_capture_tiles`].
    pub fn capture_cells(&self) -> &BTreeSet<Vector> {
        &self.capture_cells
    }

    /// The player in a seat, dead or alive; `None` for an unused seat.
    pub fn player(&self, slot: Slot) -> Option<&Player> {
        self.players[slot.index()].as_ref()
    }

    /// Occupied seats in seat order.
    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().flatten()
    }

    /// Cell of the player in a seat.
    pub fn player_position(&self, slot: Slot) -> Option<Vector> {
        self.player(slot).map(|p| p.position)
    }

    /// Turns left on a seat's capture indicator.
    pub fn player_cooldown(&self, slot: Slot) -> Option<u32> {
        self.player(slot).map(|p| p.capture_cooldown_left)
    }

    /// Legal cells for a seat's piece, or `None` for an absent or dead seat.
    pub fn player_targets(&self, slot: Slot) -> Option<PlayerTargets> {
        let player = self.player(slot).filter(|p| p.is_alive)?;
        let kind = PieceKind::Player(self.player_kind);
        let occupied = self.board.occupied_cells();
        let pos = player.position;
        Some(PlayerTargets {
            moves: moves_from(kind, pos, pos, &occupied, self.grid_size),
            captures: captures_from(kind, pos, pos, &occupied, self.grid_size),
        })
    }

    /// Tombstones waiting for the next accepted move.
    pub fn pending_deletions(&self) -> &[PieceId] {
        &self.deletion_queue
    }

    /// Player actions taken on this board, waits included.
    pub fn turn_number(&self) -> u32 {
        self.turn_number
    }

    /// XP earned this session.
    pub fn xp(&self) -> u64 {
        self.xp
    }

    /// Gems on hand.
    pub fn gems(&self) -> u64 {
        self.gems
    }

    /// True once every player is captured or the session has ended.
    pub fn is_game_over(&self) -> bool {
        self.is_game_over
    }

    /// Restarts still available.
    pub fn lives_left(&self) -> u32 {
        self.lives_left
    }

    /// XP recorded at the last restart or end of session.
    pub fn total_xp(&self) -> u64 {
        self.total_xp
    }

    /// Gems recorded at the last restart or end of session.
    pub fn total_gems(&self) -> u64 {
        self.total_gems
    }

    /// Turns summed over every finished board.
    pub fn total_turns_survived(&self) -> u64 {
        self.total_turns_survived
    }

    /// Current rung of the upgrade ladder, shared by both seats.
    pub fn player_kind(&self) -> PlayerKind {
        self.player_kind
    }

    /// Side length of the board.
    pub fn grid_size(&self) -> i32 {
        self.grid_size
    }

    /// Difficulty the board was laid out for.
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Position in the turn sequence.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Settings the game was built with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Live pieces and the board agree cell for cell, and every living
    /// player stands on its own label.
    pub fn occupancy_consistent(&self) -> bool {
        let pieces_placed = self
            .pieces
            .values()
            .filter(|p| !p.is_captured)
            .all(|p| self.board.get(p.position) == Some(Cell::Piece(p.id)));
        let players_placed = self
            .players()
            .filter(|p| p.is_alive)
            .all(|p| self.board.get(p.position) == Some(Cell::Player(p.slot)));
        let cells_owned = self.board.iter().all(|(v, cell)| match cell {
            Cell::Empty => true,
            Cell::Piece(id) => self
                .pieces
                .get(&id)
                .is_some_and(|p| !p.is_captured && p.position == v),
            Cell::Player(slot) => self
                .player(slot)
                .is_some_and(|p| p.is_alive && p.position == v),
        });
        pieces_placed && players_placed && cells_owned
    }
}
