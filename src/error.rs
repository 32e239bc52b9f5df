//! Error types for the engine and its configuration.
//!
//! Engine actions never fail loudly: a refused action leaves the world
//! untouched and reports a [`Rejection`] that hosts are free to ignore.

use thiserror::Error;

use crate::board::{Slot, Vector};

/// Why an engine action was refused. The world is unchanged in every case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    /// The acting slot has no player in this session.
    #[error("{0} is not in this session")]
    AbsentPlayer(Slot),
    /// The acting player has already been captured.
    #[error("{0} has been captured")]
    DeadPlayer(Slot),
    /// The target cell lies outside the board.
    #[error("{0} is off the board")]
    OutOfBounds(Vector),
    /// The target is not reachable by the player's piece.
    #[error("{0} is not a legal move")]
    IllegalMove(Vector),
    /// The target does not hold a capturable enemy piece.
    #[error("{0} is not a legal capture")]
    IllegalCapture(Vector),
    /// Upgrade-track kinds never enter the enemy population.
    #[error("player pieces cannot be placed as enemies")]
    PlayerKind,
    /// Another piece or a player already stands on the cell.
    #[error("{0} is occupied")]
    Occupied(Vector),
    /// Not enough gems for the next upgrade.
    #[error("upgrade needs {cost} gems, have {have}")]
    InsufficientGems {
        /// Price of the next step.
        cost: u64,
        /// Gems currently held.
        have: u64,
    },
    /// The player already holds the last upgrade.
    #[error("already at the top of the upgrade ladder")]
    MaxUpgrade,
    /// A restart needs at least one spare life.
    #[error("no lives left")]
    NoLivesLeft,
    /// The session is over; only a restart or a new session accepts moves.
    #[error("the game is over")]
    GameOver,
}

/// Invalid engine configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("spawn_cap_ratio must be in (0, 1], got {0}")]
    SpawnCapRatio(f64),
    #[error("upgrade costs must be strictly increasing: {0:?}")]
    UpgradeCosts([u64; 4]),
    #[error("max_lives must be at least 1")]
    NoLives,
}

/// A piece name that is not part of the kind table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown piece kind: {0}")]
pub struct ParseKindError(pub String);

/// A difficulty name that is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown difficulty: {0}")]
pub struct ParseDifficultyError(pub String);
