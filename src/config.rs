//! Difficulty selection and tunable engine settings.
//!
//! [`EngineConfig`] is plain JSON; every field is optional and falls back to
//! the defaults in [`constants`](crate::constants).
//!
//! ```
//! use grid_gambit::config::EngineConfig;
//!
//! let config = EngineConfig::from_json(r#"{ "max_lives": 2 }"#).unwrap();
//! assert_eq!(config.max_lives, 2);
//! assert_eq!(config.player_capture_cooldown, 6);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{
    LARGE_GRID, MAX_LIVES, MOVE_CADENCE, PLAYER_CAPTURE_COOLDOWN, SMALL_GRID, SPAWN_CAP_CEILING,
    SPAWN_CAP_RATIO, SPAWN_RETRIES, SURVIVAL_GEMS, UPGRADE_COSTS,
};
use crate::error::{ConfigError, ParseDifficultyError};

/// Game mode. Insane and Duos play on the large board; Duos adds a second
/// player.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
    Insane,
    Duos,
}

impl Difficulty {
    pub const ALL: [Difficulty; 5] = [
        Difficulty::Easy,
        Difficulty::Normal,
        Difficulty::Hard,
        Difficulty::Insane,
        Difficulty::Duos,
    ];

    /// Row into the per-difficulty tables.
    pub const fn index(self) -> usize {
        match self {
            Difficulty::Easy => 0,
            Difficulty::Normal => 1,
            Difficulty::Hard => 2,
            Difficulty::Insane => 3,
            Difficulty::Duos => 4,
        }
    }

    pub const fn grid_size(self) -> i32 {
        match self {
            Difficulty::Insane | Difficulty::Duos => LARGE_GRID,
            _ => SMALL_GRID,
        }
    }

    pub const fn is_duo(self) -> bool {
        matches!(self, Difficulty::Duos)
    }

    /// Enemies may move only on turns divisible by this number.
    pub const fn move_cadence(self) -> u32 {
        MOVE_CADENCE[self.index()]
    }

    /// Upper bound on the live enemy population, before the area cap.
    pub const fn spawn_ceiling(self) -> usize {
        SPAWN_CAP_CEILING[self.index()]
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
            Difficulty::Insane => "insane",
            Difficulty::Duos => "duos",
        };
        f.write_str(name)
    }
}

impl FromStr for Difficulty {
    type Err = ParseDifficultyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "easy" | "0" => Ok(Difficulty::Easy),
            "normal" | "1" => Ok(Difficulty::Normal),
            "hard" | "2" => Ok(Difficulty::Hard),
            "insane" | "3" => Ok(Difficulty::Insane),
            "duos" | "duo" | "4" => Ok(Difficulty::Duos),
            _ => Err(ParseDifficultyError(s.to_string())),
        }
    }
}

/// Tunable engine settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Turns between player captures, shown by hosts as a countdown.
    pub player_capture_cooldown: u32,
    /// Lives at the start of a session.
    pub max_lives: u32,
    /// Placement attempts per spawned enemy.
    pub spawn_retries: u32,
    /// Share of the board area enemies may fill.
    pub spawn_cap_ratio: f64,
    /// Gem price of each rung of the upgrade ladder.
    pub upgrade_costs: [u64; 4],
    /// Gems granted per accepted turn.
    pub survival_gems: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            player_capture_cooldown: PLAYER_CAPTURE_COOLDOWN,
            max_lives: MAX_LIVES,
            spawn_retries: SPAWN_RETRIES,
            spawn_cap_ratio: SPAWN_CAP_RATIO,
            upgrade_costs: UPGRADE_COSTS,
            survival_gems: SURVIVAL_GEMS,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON document.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.spawn_cap_ratio > 0.0 && self.spawn_cap_ratio <= 1.0) {
            return Err(ConfigError::SpawnCapRatio(self.spawn_cap_ratio));
        }
        if self.upgrade_costs.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ConfigError::UpgradeCosts(self.upgrade_costs));
        }
        if self.max_lives == 0 {
            return Err(ConfigError::NoLives);
        }
        Ok(())
    }

    /// Soft cap on live enemies for a board and difficulty.
    pub fn spawn_cap(&self, difficulty: Difficulty, grid_size: i32) -> usize {
        let area = f64::from(grid_size * grid_size);
        let by_area = (area * self.spawn_cap_ratio).floor() as usize;
        by_area.min(difficulty.spawn_ceiling())
    }

    /// Cost of the upgrade *from* the given tier, if there is one.
    pub fn upgrade_cost(&self, tier: usize) -> Option<u64> {
        self.upgrade_costs.get(tier).copied()
    }
}
