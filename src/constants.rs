//! Constants for board geometry, piece timing, spawning, and progression.
//!
//! Tables indexed by difficulty follow the order of
//! [`Difficulty::ALL`](crate::config::Difficulty::ALL):
//! Easy, Normal, Hard, Insane, Duos.
//!
//! Values that a host may want to tune without recompiling are mirrored in
//! [`EngineConfig`](crate::config::EngineConfig), which uses the constants
//! below as its defaults.

// =============================================================================
// Board Geometry
// =============================================================================

/// Side length of the standard board.
pub const SMALL_GRID: i32 = 8;

/// Side length of the board used by the large-board modes (Insane, Duos).
pub const LARGE_GRID: i32 = 10;

// =============================================================================
// Piece Timing
// =============================================================================

/// Base capture cooldown for enemy queens.
pub const QUEEN_COOLDOWN: u32 = 5;

/// Base capture cooldown for enemy rooks.
pub const ROOK_COOLDOWN: u32 = 4;

/// Base capture cooldown for enemy bishops.
pub const BISHOP_COOLDOWN: u32 = 4;

/// Base capture cooldown for enemy knights.
pub const KNIGHT_COOLDOWN: u32 = 3;

/// Base capture cooldown for enemy pawns of every facing.
pub const PAWN_COOLDOWN: u32 = 2;

/// Sweeps a freshly created enemy waits before it may attempt a capture.
pub const SPAWN_ATTACK_DELAY: u32 = 1;

/// Turns the player waits between captures (advisory, shown by hosts).
pub const PLAYER_CAPTURE_COOLDOWN: u32 = 6;

/// Enemies only move on turns divisible by this cadence.
pub const MOVE_CADENCE: [u32; 5] = [4, 3, 3, 2, 2];

// =============================================================================
// Spawning
// =============================================================================

/// Fraction of the board area that may be populated by enemies.
pub const SPAWN_CAP_RATIO: f64 = 0.18;

/// Hard ceiling on the live enemy population per difficulty.
pub const SPAWN_CAP_CEILING: [usize; 5] = [10, 12, 14, 16, 18];

/// Placement attempts per spawned piece before giving up.
pub const SPAWN_RETRIES: u32 = 3;

/// Cumulative thresholds for the spawn-count draw: `[p(two), p(two or one)]`.
pub const SPAWN_COUNT_THRESHOLDS: [[f64; 2]; 5] = [
    [0.10, 0.60], // Easy
    [0.20, 0.70], // Normal
    [0.25, 0.80], // Hard
    [0.50, 1.00], // Insane
    [0.50, 1.00], // Duos
];

/// Spawn weights per upgrade tier (0..=4) for pawns.
pub const PAWN_TIER_SCALE: [f64; 5] = [1.00, 0.85, 0.70, 0.55, 0.40];

/// Spawn weights per upgrade tier for knights.
pub const KNIGHT_TIER_SCALE: [f64; 5] = [1.00, 1.10, 1.20, 1.30, 1.40];

/// Spawn weights per upgrade tier for rooks and bishops.
pub const OFFICER_TIER_SCALE: [f64; 5] = [1.00, 1.20, 1.40, 1.60, 1.80];

/// Spawn weights per upgrade tier for queens.
pub const QUEEN_TIER_SCALE: [f64; 5] = [1.00, 1.30, 1.60, 1.90, 2.20];

// =============================================================================
// Progression
// =============================================================================

/// Lives granted at the start of a session.
pub const MAX_LIVES: u32 = 4;

/// Gem cost of each step along the upgrade ladder.
pub const UPGRADE_COSTS: [u64; 4] = [20, 30, 50, 80];

/// Gems granted for every accepted player turn.
pub const SURVIVAL_GEMS: u64 = 1;

/// Base passive XP per accepted turn, by difficulty.
pub const PASSIVE_XP_BASE: [u64; 5] = [1, 2, 3, 4, 4];

/// Turns after which the passive XP grows by one more base step.
pub const PASSIVE_XP_RAMP: u64 = 25;

/// XP awarded per second of play by hosts with a real-time clock.
pub const PER_SECOND_XP: [u64; 5] = [1, 2, 3, 5, 5];
