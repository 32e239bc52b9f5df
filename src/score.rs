//! XP and gem rewards.

use crate::config::Difficulty;
use crate::constants::{PASSIVE_XP_BASE, PASSIVE_XP_RAMP, PER_SECOND_XP};
use crate::kind::EnemyKind;

/// XP for surviving a turn. Grows by one base step every
/// [`PASSIVE_XP_RAMP`] turns.
pub fn passive_xp(difficulty: Difficulty, turn_number: u32) -> u64 {
    let base = PASSIVE_XP_BASE[difficulty.index()];
    base * (1 + u64::from(turn_number) / PASSIVE_XP_RAMP)
}

/// XP a real-time host awards per second of play.
pub fn per_second_xp(difficulty: Difficulty) -> u64 {
    PER_SECOND_XP[difficulty.index()]
}

pub fn capture_xp(kind: EnemyKind) -> u64 {
    match kind {
        EnemyKind::Pawn(_) => 10,
        EnemyKind::Knight => 30,
        EnemyKind::Bishop => 35,
        EnemyKind::Rook => 50,
        EnemyKind::Queen => 90,
    }
}

pub fn capture_gems(kind: EnemyKind) -> u64 {
    match kind {
        EnemyKind::Pawn(_) => 1,
        EnemyKind::Knight => 3,
        EnemyKind::Bishop => 3,
        EnemyKind::Rook => 5,
        EnemyKind::Queen => 9,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::Facing;

    #[test]
    fn test_passive_xp_ramps() {
        assert_eq!(passive_xp(Difficulty::Easy, 1), 1);
        assert_eq!(passive_xp(Difficulty::Easy, 25), 2);
        assert_eq!(passive_xp(Difficulty::Hard, 60), 9);
    }

    #[test]
    fn test_harder_pays_more() {
        for pair in Difficulty::ALL.windows(2) {
            assert!(passive_xp(pair[0], 10) <= passive_xp(pair[1], 10));
            assert!(per_second_xp(pair[0]) <= per_second_xp(pair[1]));
        }
    }

    #[test]
    fn test_queen_is_most_valuable() {
        let pawn = EnemyKind::Pawn(Facing::East);
        assert!(capture_xp(EnemyKind::Queen) > capture_xp(pawn));
        assert!(capture_gems(EnemyKind::Queen) > capture_gems(pawn));
    }
}
