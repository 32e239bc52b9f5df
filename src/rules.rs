//! Movement and capture rules for every piece kind.
//!
//! Each kind has two pure functions: [`moves_from`] lists the cells the piece
//! may step onto, [`captures_from`] lists the cells it threatens. Capture
//! cells are not filtered by target; callers check whether the cell they
//! care about is in the list.
//!
//! The `ignore` position is removed from the obstacle set for movement so a
//! ray is not blocked by the cell it is being evaluated against. Capture
//! rays always see every real obstacle.

use crate::board::{Occupied, Vector, is_valid_cell};
use crate::kind::{EnemyKind, PieceKind, PlayerKind};

// =============================================================================
// Direction Tables
// =============================================================================

/// Orthogonal steps: down, up, right, left.
const PLUS: [(i32, i32); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];

/// Rook rays.
const ORTHOGONAL: [(i32, i32); 4] = [(1, 0), (0, 1), (-1, 0), (0, -1)];

/// Bishop rays.
const DIAGONAL: [(i32, i32); 4] = [(1, 1), (-1, 1), (-1, -1), (1, -1)];

/// Queen rays, clockwise from east.
const ALL_RAYS: [(i32, i32); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

/// Knight jumps.
const KNIGHT: [(i32, i32); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

/// How a kind moves, independent of which track it belongs to.
#[derive(Copy, Clone, Debug)]
enum Pattern {
    /// Plus-shaped steps; captures only onto occupied plus cells.
    PlusPawn,
    /// Plus-shaped steps; captures on the two forward diagonals.
    FacingPawn([(i32, i32); 2]),
    Jump(&'static [(i32, i32)]),
    Slide(&'static [(i32, i32)]),
}

fn pattern(kind: PieceKind) -> Pattern {
    match kind {
        PieceKind::Player(PlayerKind::Pawn) => Pattern::PlusPawn,
        PieceKind::Enemy(EnemyKind::Pawn(facing)) => Pattern::FacingPawn(facing.capture_offsets()),
        PieceKind::Player(PlayerKind::Knight) | PieceKind::Enemy(EnemyKind::Knight) => {
            Pattern::Jump(&KNIGHT)
        }
        PieceKind::Player(PlayerKind::Rook) | PieceKind::Enemy(EnemyKind::Rook) => {
            Pattern::Slide(&ORTHOGONAL)
        }
        PieceKind::Player(PlayerKind::Bishop) | PieceKind::Enemy(EnemyKind::Bishop) => {
            Pattern::Slide(&DIAGONAL)
        }
        PieceKind::Player(PlayerKind::Queen) | PieceKind::Enemy(EnemyKind::Queen) => {
            Pattern::Slide(&ALL_RAYS)
        }
    }
}

/// Cells `kind` may move to from `pos`.
pub fn moves_from(
    kind: PieceKind,
    pos: Vector,
    ignore: Vector,
    occupied: &Occupied,
    size: i32,
) -> Vec<Vector> {
    let blocked = |v: Vector| v != ignore && occupied.contains(&v);
    match pattern(kind) {
        Pattern::PlusPawn | Pattern::FacingPawn(_) => step_cells(pos, &PLUS, size)
            .filter(|&v| !blocked(v))
            .collect(),
        Pattern::Jump(offsets) => step_cells(pos, offsets, size)
            .filter(|&v| !blocked(v))
            .collect(),
        Pattern::Slide(rays) => {
            let mut out = Vec::new();
            for &(dx, dy) in rays {
                let mut cell = pos.offset(dx, dy);
                while is_valid_cell(cell, size) && !blocked(cell) {
                    out.push(cell);
                    cell = cell.offset(dx, dy);
                }
            }
            out
        }
    }
}

/// Cells `kind` threatens from `pos`.
///
/// `ignore` is accepted for symmetry with [`moves_from`] and does not affect
/// the result.
pub fn captures_from(
    kind: PieceKind,
    pos: Vector,
    _ignore: Vector,
    occupied: &Occupied,
    size: i32,
) -> Vec<Vector> {
    match pattern(kind) {
        Pattern::PlusPawn => step_cells(pos, &PLUS, size)
            .filter(|v| occupied.contains(v))
            .collect(),
        Pattern::FacingPawn(offsets) => step_cells(pos, &offsets, size).collect(),
        Pattern::Jump(offsets) => step_cells(pos, offsets, size).collect(),
        Pattern::Slide(rays) => {
            let mut out = Vec::new();
            for &(dx, dy) in rays {
                let mut cell = pos.offset(dx, dy);
                while is_valid_cell(cell, size) {
                    out.push(cell);
                    if occupied.contains(&cell) {
                        break;
                    }
                    cell = cell.offset(dx, dy);
                }
            }
            out
        }
    }
}

/// In-bounds cells one offset away from `pos`.
fn step_cells<'a>(
    pos: Vector,
    offsets: &'a [(i32, i32)],
    size: i32,
) -> impl Iterator<Item = Vector> + 'a {
    offsets
        .iter()
        .map(move |&(dx, dy)| pos.offset(dx, dy))
        .filter(move |&v| is_valid_cell(v, size))
}
