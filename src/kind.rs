//! Piece kinds: the enemy population and the player's upgrade track.
//!
//! Both tracks share the five chess archetypes, but they are kept apart in
//! the type so that a player-only kind is always recognizable. Enemy
//! records are normalized through [`PieceKind::to_enemy`] whenever they are
//! created.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::constants::{
    BISHOP_COOLDOWN, KNIGHT_COOLDOWN, PAWN_COOLDOWN, QUEEN_COOLDOWN, ROOK_COOLDOWN,
};
use crate::error::ParseKindError;

/// Direction an enemy pawn faces. Pawns spawned from an edge face inward.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Facing {
    North,
    East,
    West,
    South,
}

impl Facing {
    /// The two forward-diagonal capture offsets.
    pub const fn capture_offsets(self) -> [(i32, i32); 2] {
        match self {
            Facing::North => [(-1, -1), (1, -1)],
            Facing::East => [(1, -1), (1, 1)],
            Facing::West => [(-1, -1), (-1, 1)],
            Facing::South => [(-1, 1), (1, 1)],
        }
    }

    const fn letter(self) -> char {
        match self {
            Facing::North => 'N',
            Facing::East => 'E',
            Facing::West => 'W',
            Facing::South => 'S',
        }
    }
}

/// Kinds that may appear in the enemy population.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EnemyKind {
    Pawn(Facing),
    Knight,
    Bishop,
    Rook,
    Queen,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 8] = [
        EnemyKind::Pawn(Facing::North),
        EnemyKind::Pawn(Facing::East),
        EnemyKind::Pawn(Facing::West),
        EnemyKind::Pawn(Facing::South),
        EnemyKind::Knight,
        EnemyKind::Bishop,
        EnemyKind::Rook,
        EnemyKind::Queen,
    ];

    /// Sweeps an enemy must wait after spawning or capturing before its
    /// next capture attempt.
    pub const fn base_cooldown(self) -> u32 {
        match self {
            EnemyKind::Pawn(_) => PAWN_COOLDOWN,
            EnemyKind::Knight => KNIGHT_COOLDOWN,
            EnemyKind::Bishop => BISHOP_COOLDOWN,
            EnemyKind::Rook => ROOK_COOLDOWN,
            EnemyKind::Queen => QUEEN_COOLDOWN,
        }
    }

    pub const fn is_pawn(self) -> bool {
        matches!(self, EnemyKind::Pawn(_))
    }

    /// Single-letter glyph used by text renderings.
    pub const fn glyph(self) -> char {
        match self {
            EnemyKind::Pawn(_) => 'p',
            EnemyKind::Knight => 'n',
            EnemyKind::Bishop => 'b',
            EnemyKind::Rook => 'r',
            EnemyKind::Queen => 'q',
        }
    }
}

/// The player's upgrade ladder, in purchase order.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum PlayerKind {
    #[default]
    Pawn,
    Knight,
    Rook,
    Bishop,
    Queen,
}

impl PlayerKind {
    pub const LADDER: [PlayerKind; 5] = [
        PlayerKind::Pawn,
        PlayerKind::Knight,
        PlayerKind::Rook,
        PlayerKind::Bishop,
        PlayerKind::Queen,
    ];

    /// Position on the ladder, 0 for the pawn up to 4 for the queen.
    pub const fn tier(self) -> usize {
        match self {
            PlayerKind::Pawn => 0,
            PlayerKind::Knight => 1,
            PlayerKind::Rook => 2,
            PlayerKind::Bishop => 3,
            PlayerKind::Queen => 4,
        }
    }

    /// The next rung, or `None` at the top.
    pub fn next(self) -> Option<PlayerKind> {
        Self::LADDER.get(self.tier() + 1).copied()
    }

    /// The enemy kind with the same archetype. Pawns have no facing on the
    /// upgrade track, so they map to a north-facing pawn.
    pub const fn to_enemy(self) -> EnemyKind {
        match self {
            PlayerKind::Pawn => EnemyKind::Pawn(Facing::North),
            PlayerKind::Knight => EnemyKind::Knight,
            PlayerKind::Rook => EnemyKind::Rook,
            PlayerKind::Bishop => EnemyKind::Bishop,
            PlayerKind::Queen => EnemyKind::Queen,
        }
    }
}

/// Any piece kind, tagged with the track it belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Enemy(EnemyKind),
    Player(PlayerKind),
}

impl PieceKind {
    pub const fn is_player(self) -> bool {
        matches!(self, PieceKind::Player(_))
    }

    /// Base cooldown; upgrade-track kinds have none.
    pub const fn base_cooldown(self) -> Option<u32> {
        match self {
            PieceKind::Enemy(kind) => Some(kind.base_cooldown()),
            PieceKind::Player(_) => None,
        }
    }

    /// Coerce onto the enemy track.
    pub const fn to_enemy(self) -> EnemyKind {
        match self {
            PieceKind::Enemy(kind) => kind,
            PieceKind::Player(kind) => kind.to_enemy(),
        }
    }

    pub const fn glyph(self) -> char {
        self.to_enemy().glyph()
    }
}

impl From<EnemyKind> for PieceKind {
    fn from(kind: EnemyKind) -> Self {
        PieceKind::Enemy(kind)
    }
}

impl From<PlayerKind> for PieceKind {
    fn from(kind: PlayerKind) -> Self {
        PieceKind::Player(kind)
    }
}

impl fmt::Display for EnemyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnemyKind::Pawn(facing) => write!(f, "Pawn{}", facing.letter()),
            EnemyKind::Knight => f.write_str("Knight"),
            EnemyKind::Bishop => f.write_str("Bishop"),
            EnemyKind::Rook => f.write_str("Rook"),
            EnemyKind::Queen => f.write_str("Queen"),
        }
    }
}

impl fmt::Display for PlayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlayerKind::Pawn => "BlackPawn",
            PlayerKind::Knight => "BlackKnight",
            PlayerKind::Rook => "BlackRook",
            PlayerKind::Bishop => "BlackBishop",
            PlayerKind::Queen => "BlackQueen",
        };
        f.write_str(name)
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PieceKind::Enemy(kind) => kind.fmt(f),
            PieceKind::Player(kind) => kind.fmt(f),
        }
    }
}

impl FromStr for PieceKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s {
            "PawnN" => EnemyKind::Pawn(Facing::North).into(),
            "PawnE" => EnemyKind::Pawn(Facing::East).into(),
            "PawnW" => EnemyKind::Pawn(Facing::West).into(),
            "PawnS" => EnemyKind::Pawn(Facing::South).into(),
            "Knight" => EnemyKind::Knight.into(),
            "Bishop" => EnemyKind::Bishop.into(),
            "Rook" => EnemyKind::Rook.into(),
            "Queen" => EnemyKind::Queen.into(),
            "BlackPawn" => PlayerKind::Pawn.into(),
            "BlackKnight" => PlayerKind::Knight.into(),
            "BlackRook" => PlayerKind::Rook.into(),
            "BlackBishop" => PlayerKind::Bishop.into(),
            "BlackQueen" => PlayerKind::Queen.into(),
            _ => return Err(ParseKindError(s.to_string())),
        };
        Ok(kind)
    }
}

impl Serialize for PieceKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PieceKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl Serialize for PlayerKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_roundtrip() {
        for kind in EnemyKind::ALL {
            let parsed: PieceKind = kind.to_string().parse().unwrap();
            assert_eq!(parsed, PieceKind::Enemy(kind));
        }
        for kind in PlayerKind::LADDER {
            let parsed: PieceKind = kind.to_string().parse().unwrap();
            assert_eq!(parsed, PieceKind::Player(kind));
        }
    }

    #[test]
    fn test_unknown_name() {
        assert!("King".parse::<PieceKind>().is_err());
    }

    #[test]
    fn test_ladder_order() {
        assert_eq!(PlayerKind::Pawn.next(), Some(PlayerKind::Knight));
        assert_eq!(PlayerKind::Knight.next(), Some(PlayerKind::Rook));
        assert_eq!(PlayerKind::Rook.next(), Some(PlayerKind::Bishop));
        assert_eq!(PlayerKind::Bishop.next(), Some(PlayerKind::Queen));
        assert_eq!(PlayerKind::Queen.next(), None);
    }

    #[test]
    fn test_player_kinds_have_no_cooldown() {
        for kind in PlayerKind::LADDER {
            assert_eq!(PieceKind::Player(kind).base_cooldown(), None);
        }
        assert_eq!(PieceKind::Enemy(EnemyKind::Queen).base_cooldown(), Some(5));
    }

    #[test]
    fn test_to_enemy() {
        assert_eq!(
            PieceKind::Player(PlayerKind::Queen).to_enemy(),
            EnemyKind::Queen
        );
        assert_eq!(
            PieceKind::Player(PlayerKind::Pawn).to_enemy(),
            EnemyKind::Pawn(Facing::North)
        );
    }
}
