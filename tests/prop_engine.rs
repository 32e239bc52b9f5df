//! Property-based tests for the turn engine.
//!
//! Random sessions on every difficulty, driven by random player actions
//! (legal and otherwise), must keep the board and the piece records in
//! agreement after every call.

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;

use proptest::prelude::*;

use grid_gambit::board::{Cell, PieceId, Slot, Vector};
use grid_gambit::config::Difficulty;
use grid_gambit::engine::{Game, MoveRequest, Phase};
use grid_gambit::kind::{EnemyKind, Facing, PieceKind};

#[derive(Clone, Debug)]
enum Action {
    /// Step to the n-th legal move, if any.
    Step(usize, bool),
    /// Capture the n-th reachable enemy, if any.
    Capture(usize, bool),
    Wait(bool),
    /// Arbitrary target, usually illegal.
    Raw(i32, i32, bool),
    Upgrade,
    Restart,
    Add(i32, i32, u8),
}

fn action() -> impl Strategy<Value = Action> {
    prop_oneof![
        4 => (0usize..16, any::<bool>()).prop_map(|(n, p2)| Action::Step(n, p2)),
        2 => (0usize..16, any::<bool>()).prop_map(|(n, p2)| Action::Capture(n, p2)),
        1 => any::<bool>().prop_map(Action::Wait),
        1 => (-2i32..12, -2i32..12, any::<bool>()).prop_map(|(x, y, p2)| Action::Raw(x, y, p2)),
        1 => Just(Action::Upgrade),
        1 => Just(Action::Restart),
        1 => (-1i32..11, -1i32..11, 0u8..8).prop_map(|(x, y, k)| Action::Add(x, y, k)),
    ]
}

fn difficulty() -> impl Strategy<Value = Difficulty> {
    prop::sample::select(Difficulty::ALL.to_vec())
}

fn slot(second: bool) -> Slot {
    if second { Slot::Two } else { Slot::One }
}

fn enemy_kind(k: u8) -> PieceKind {
    let kind = match k {
        0 => EnemyKind::Pawn(Facing::North),
        1 => EnemyKind::Pawn(Facing::East),
        2 => EnemyKind::Pawn(Facing::West),
        3 => EnemyKind::Pawn(Facing::South),
        4 => EnemyKind::Knight,
        5 => EnemyKind::Bishop,
        6 => EnemyKind::Rook,
        _ => EnemyKind::Queen,
    };
    kind.into()
}

/// Resolve an action into a player request, or apply it directly.
fn request_for(game: &mut Game, action: &Action) -> Option<MoveRequest> {
    let d = game.difficulty();
    match *action {
        Action::Step(n, p2) => {
            let slot = slot(p2);
            let targets = game.player_targets(slot)?;
            let target = *targets.moves.get(n % targets.moves.len().max(1))?;
            Some(MoveRequest::step(target, d).by(slot))
        }
        Action::Capture(n, p2) => {
            let slot = slot(p2);
            let targets = game.player_targets(slot)?;
            let enemies: Vec<Vector> = targets
                .captures
                .into_iter()
                .filter(|&v| matches!(game.board().get(v), Some(Cell::Piece(_))))
                .collect();
            let target = *enemies.get(n % enemies.len().max(1))?;
            Some(MoveRequest::capture(target, d).by(slot))
        }
        Action::Wait(p2) => {
            let slot = slot(p2);
            let here = game.player_position(slot)?;
            Some(MoveRequest::step(here, d).by(slot))
        }
        Action::Raw(x, y, p2) => Some(MoveRequest::step(Vector::new(x, y), d).by(slot(p2))),
        Action::Upgrade => {
            let _ = game.upgrade_player_kind();
            None
        }
        Action::Restart => {
            if game.is_game_over() {
                let _ = game.restart_session();
            }
            None
        }
        Action::Add(x, y, k) => {
            let _ = game.add_piece(x, y, enemy_kind(k));
            None
        }
    }
}

fn live_count(game: &Game) -> usize {
    game.pieces().values().filter(|p| !p.is_captured).count()
}

fn check_pieces(game: &Game) -> Result<(), TestCaseError> {
    for piece in game.pieces().values() {
        prop_assert!(!piece.kind.is_player(), "{:?} carries a player kind", piece.id);
        let base = piece.kind.base_cooldown().unwrap();
        prop_assert!(piece.cooldown <= base);
        prop_assert!(piece.attack_delay <= 1);
    }
    Ok(())
}

fn cooldowns(game: &Game) -> HashMap<PieceId, u32> {
    game.pieces().values().map(|p| (p.id, p.cooldown)).collect()
}

/// A sweep only lowers cooldowns; the one exception is a piece that just
/// captured, which starts over from its base.
fn check_cooldowns_fall(
    game: &Game,
    before: &HashMap<PieceId, u32>,
    captures: &[(PieceId, Slot)],
) -> Result<(), TestCaseError> {
    for piece in game.pieces().values() {
        let Some(&old) = before.get(&piece.id) else {
            continue;
        };
        if captures.iter().any(|&(id, _)| id == piece.id) {
            prop_assert_eq!(Some(piece.cooldown), piece.kind.base_cooldown());
        } else {
            prop_assert!(
                piece.cooldown <= old,
                "{} rose from {} to {}",
                piece.id,
                old,
                piece.cooldown
            );
        }
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// The board and the piece records agree after every engine call.
    #[test]
    fn prop_occupancy_holds(
        seed in any::<u64>(),
        d in difficulty(),
        actions in prop::collection::vec(action(), 1..60)
    ) {
        let mut game = Game::with_seed(d, seed);
        game.start_session(d);
        prop_assert!(game.occupancy_consistent());

        for action in &actions {
            let Some(request) = request_for(&mut game, action) else {
                prop_assert!(game.occupancy_consistent());
                continue;
            };

            let turn = game.turn_number();
            let outcome = game.move_player(request);
            prop_assert!(game.occupancy_consistent());
            if !outcome.is_accepted() {
                prop_assert_eq!(game.turn_number(), turn);
                continue;
            }
            prop_assert_eq!(game.turn_number(), turn + 1);

            let live_before = live_count(&game);
            let cap = game.config().spawn_cap(d, game.grid_size());
            let cooldowns_before = cooldowns(&game);
            let report = game.process_pieces(d);
            prop_assert!(game.occupancy_consistent());
            prop_assert!(report.spawned.len() <= 2);
            prop_assert!(report.spawned.len() <= cap.saturating_sub(live_before));
            check_pieces(&game)?;
            check_cooldowns_fall(&game, &cooldowns_before, &report.captures)?;

            game.update_capture_tiles();
            let size = game.grid_size();
            let in_bounds = game
                .capture_cells()
                .iter()
                .all(|v| v.x >= 0 && v.y >= 0 && v.x < size && v.y < size);
            prop_assert!(in_bounds);
            if game.is_game_over() {
                prop_assert_eq!(game.phase(), Phase::GameOver);
            } else {
                prop_assert_eq!(game.phase(), Phase::AwaitingPlayerInput);
            }
        }
    }

    /// Off-board and unreachable targets are refused without touching the
    /// world.
    #[test]
    fn prop_rejections_change_nothing(
        seed in any::<u64>(),
        d in difficulty(),
        warmup in prop::collection::vec(action(), 0..20),
        x in -3i32..13,
        y in -3i32..13,
        second in any::<bool>()
    ) {
        let mut game = Game::with_seed(d, seed);
        for action in &warmup {
            if let Some(request) = request_for(&mut game, action) {
                if game.move_player(request).is_accepted() {
                    game.process_pieces(d);
                    game.update_capture_tiles();
                }
            }
        }

        let before = game.snapshot();
        let request = MoveRequest::step(Vector::new(x, y), d).by(slot(second));
        if !game.move_player(request).is_accepted() {
            prop_assert_eq!(game.snapshot(), before);
        }
    }
}
