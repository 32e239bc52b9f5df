//! Enemy spawn policy.
//!
//! Every turn the engine asks [`spawn_count`] how many enemies to add, clamps
//! that to the population headroom, and calls [`piece_and_position`] for each
//! one. A spawn picks a board edge, a lane along that edge, and a kind drawn
//! from a weighted table that shifts away from pawns as the player climbs
//! the upgrade ladder.

use crate::board::Vector;
use crate::config::Difficulty;
use crate::constants::{
    KNIGHT_TIER_SCALE, OFFICER_TIER_SCALE, PAWN_TIER_SCALE, QUEEN_TIER_SCALE,
    SPAWN_COUNT_THRESHOLDS,
};
use crate::kind::{EnemyKind, Facing, PlayerKind};
use crate::rng::RandomSource;

/// Board edge a spawn enters from.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Edge {
    Top,
    Right,
    Left,
    Bottom,
}

impl Edge {
    const ALL: [Edge; 4] = [Edge::Top, Edge::Right, Edge::Left, Edge::Bottom];

    /// Pawns entering from this edge face the opposite side.
    pub const fn inward(self) -> Facing {
        match self {
            Edge::Top => Facing::South,
            Edge::Right => Facing::West,
            Edge::Left => Facing::East,
            Edge::Bottom => Facing::North,
        }
    }

    fn cell(self, lane: i32, grid_size: i32) -> Vector {
        match self {
            Edge::Top => Vector::new(lane, 0),
            Edge::Right => Vector::new(grid_size - 1, lane),
            Edge::Left => Vector::new(0, lane),
            Edge::Bottom => Vector::new(lane, grid_size - 1),
        }
    }
}

/// Spawn weights; pawn entries stand for "a pawn" and get their facing from
/// the edge afterwards.
const EASY_WEIGHTS: [(EnemyKind, f64); 8] = weights([0.03, 0.07, 0.10, 0.20, 0.15]);
const NORMAL_WEIGHTS: [(EnemyKind, f64); 8] = weights([0.08, 0.12, 0.15, 0.25, 0.10]);
const HARD_WEIGHTS: [(EnemyKind, f64); 8] = weights([0.15, 0.15, 0.20, 0.25, 0.0625]);

/// Table rows in draw order: queen, rook, bishop, knight, then four pawns.
const fn weights(w: [f64; 5]) -> [(EnemyKind, f64); 8] {
    [
        (EnemyKind::Queen, w[0]),
        (EnemyKind::Rook, w[1]),
        (EnemyKind::Bishop, w[2]),
        (EnemyKind::Knight, w[3]),
        (EnemyKind::Pawn(Facing::North), w[4]),
        (EnemyKind::Pawn(Facing::South), w[4]),
        (EnemyKind::Pawn(Facing::East), w[4]),
        (EnemyKind::Pawn(Facing::West), w[4]),
    ]
}

/// The unscaled kind table for a difficulty.
pub fn base_weights(difficulty: Difficulty) -> &'static [(EnemyKind, f64); 8] {
    match difficulty {
        Difficulty::Easy => &EASY_WEIGHTS,
        Difficulty::Normal => &NORMAL_WEIGHTS,
        Difficulty::Hard | Difficulty::Insane | Difficulty::Duos => &HARD_WEIGHTS,
    }
}

/// How strongly a kind's weight is scaled at the given player tier.
pub fn tier_multiplier(kind: EnemyKind, tier: usize) -> f64 {
    let tier = tier.min(4);
    match kind {
        EnemyKind::Pawn(_) => PAWN_TIER_SCALE[tier],
        EnemyKind::Knight => KNIGHT_TIER_SCALE[tier],
        EnemyKind::Rook | EnemyKind::Bishop => OFFICER_TIER_SCALE[tier],
        EnemyKind::Queen => QUEEN_TIER_SCALE[tier],
    }
}

/// Number of enemies to spawn this turn, before the population cap.
pub fn spawn_count<R: RandomSource + ?Sized>(rng: &mut R, difficulty: Difficulty) -> usize {
    let [two, one] = SPAWN_COUNT_THRESHOLDS[difficulty.index()];
    let roll = rng.next_f64();
    if roll < two {
        2
    } else if roll < one {
        1
    } else {
        0
    }
}

/// Pick a spawn cell on a random edge and the kind to put there.
pub fn piece_and_position<R: RandomSource + ?Sized>(
    rng: &mut R,
    difficulty: Difficulty,
    grid_size: i32,
    player_kind: PlayerKind,
) -> (EnemyKind, Vector) {
    let (edge, pos) = pick_spawn_point(rng, grid_size);
    let kind = choose_kind(rng, difficulty, player_kind);
    if kind.is_pawn() {
        return (EnemyKind::Pawn(edge.inward()), pos);
    }
    (kind, pos)
}

fn pick_spawn_point<R: RandomSource + ?Sized>(rng: &mut R, grid_size: i32) -> (Edge, Vector) {
    let edge = Edge::ALL[rng.below(Edge::ALL.len())];
    let side = usize::try_from(grid_size).unwrap_or(1).max(1);
    let lane = i32::try_from(rng.below(side)).unwrap_or(0);
    (edge, edge.cell(lane, grid_size))
}

fn choose_kind<R: RandomSource + ?Sized>(
    rng: &mut R,
    difficulty: Difficulty,
    player_kind: PlayerKind,
) -> EnemyKind {
    let table = base_weights(difficulty);
    let tier = player_kind.tier();
    let adjusted: Vec<(EnemyKind, f64)> = table
        .iter()
        .map(|&(kind, weight)| (kind, weight * tier_multiplier(kind, tier)))
        .collect();

    let total: f64 = adjusted.iter().map(|(_, w)| w).sum();
    if total > 0.0 {
        let roll = rng.next_f64() * total;
        cumulative_pick(&adjusted, roll)
    } else {
        cumulative_pick(table, rng.next_f64())
    }
}

/// First entry whose running weight exceeds `roll`; the last entry absorbs
/// rounding leftovers.
fn cumulative_pick(table: &[(EnemyKind, f64)], roll: f64) -> EnemyKind {
    let mut acc = 0.0;
    for &(kind, weight) in table {
        acc += weight;
        if roll < acc {
            return kind;
        }
    }
    table.last().map_or(EnemyKind::Knight, |&(kind, _)| kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::is_valid_cell;
    use crate::rng::ScriptedRandom;

    #[test]
    fn test_base_tables_sum_to_one() {
        for difficulty in Difficulty::ALL {
            let total: f64 = base_weights(difficulty).iter().map(|(_, w)| w).sum();
            assert!((total - 1.0).abs() < 1e-9, "{difficulty}: {total}");
        }
    }

    #[test]
    fn test_spawn_count_thresholds() {
        let mut rng = ScriptedRandom::new(vec![0.05, 0.3, 0.9]);
        assert_eq!(spawn_count(&mut rng, Difficulty::Easy), 2);
        assert_eq!(spawn_count(&mut rng, Difficulty::Easy), 1);
        assert_eq!(spawn_count(&mut rng, Difficulty::Easy), 0);
    }

    #[test]
    fn test_insane_always_spawns() {
        let mut rng = fastrand::Rng::with_seed(3);
        for _ in 0..500 {
            let n = spawn_count(&mut rng, Difficulty::Insane);
            assert!(n == 1 || n == 2);
        }
    }

    #[test]
    fn test_pawn_facing_follows_edge() {
        // edge 0 (top), lane 3, roll 0.99 lands in the pawn tail of the table
        let mut rng = ScriptedRandom::new(vec![0.0, 0.3, 0.99]);
        let (kind, pos) = piece_and_position(&mut rng, Difficulty::Easy, 10, PlayerKind::Pawn);
        assert_eq!(kind, EnemyKind::Pawn(Facing::South));
        assert_eq!(pos, Vector::new(3, 0));

        // edge 3 (bottom)
        let mut rng = ScriptedRandom::new(vec![0.8, 0.0, 0.99]);
        let (kind, pos) = piece_and_position(&mut rng, Difficulty::Easy, 8, PlayerKind::Pawn);
        assert_eq!(kind, EnemyKind::Pawn(Facing::North));
        assert_eq!(pos, Vector::new(0, 7));
    }

    #[test]
    fn test_first_entry_is_queen() {
        let mut rng = ScriptedRandom::new(vec![0.3, 0.5, 0.0]);
        let (kind, pos) = piece_and_position(&mut rng, Difficulty::Hard, 8, PlayerKind::Queen);
        assert_eq!(kind, EnemyKind::Queen);
        assert_eq!(pos, Vector::new(7, 4));
    }

    #[test]
    fn test_spawn_points_on_edge() {
        let mut rng = fastrand::Rng::with_seed(11);
        for _ in 0..500 {
            let (_, pos) = piece_and_position(&mut rng, Difficulty::Normal, 8, PlayerKind::Pawn);
            assert!(is_valid_cell(pos, 8));
            assert!(pos.x == 0 || pos.y == 0 || pos.x == 7 || pos.y == 7);
        }
    }

    #[test]
    fn test_upgrades_shift_weights_away_from_pawns() {
        let pawn_share = |tier: usize| {
            let table = base_weights(Difficulty::Normal);
            let total: f64 = table.iter().map(|&(k, w)| w * tier_multiplier(k, tier)).sum();
            let pawns: f64 = table
                .iter()
                .filter(|(k, _)| k.is_pawn())
                .map(|&(k, w)| w * tier_multiplier(k, tier))
                .sum();
            pawns / total
        };
        assert!(pawn_share(4) < pawn_share(2));
        assert!(pawn_share(2) < pawn_share(0));
    }

    #[test]
    fn test_cumulative_pick_zero_weights_falls_to_last() {
        let table = [(EnemyKind::Queen, 0.0), (EnemyKind::Rook, 0.0)];
        assert_eq!(cumulative_pick(&table, 0.5), EnemyKind::Rook);
    }
}
