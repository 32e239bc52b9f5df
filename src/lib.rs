//! Grid Gambit: a turn-based survival game on a chess board.
//!
//! One or two player pieces stand on a square grid while enemy chess pieces
//! stream in from the edges, chase them, and capture on sight. The player
//! moves, captures enemies for XP and gems, and spends gems to climb a
//! ladder of stronger pieces.
//!
//! ## Modules
//!
//! - [`engine`] - The [`Game`] world and the three-call turn sequence
//! - [`session`] - Start, upgrade, end, restart and snapshots
//! - [`rules`] - Move and capture reach for every piece kind
//! - [`spawn`] - Enemy spawn counts, edges and kind weights
//! - [`score`] - XP and gem rewards
//! - [`board`] - Coordinates and the occupancy matrix
//! - [`kind`] - Enemy and player piece kinds
//! - [`config`] - Difficulty and tunable settings
//! - [`rng`] - Injectable random sources
//! - [`console`] - Line-oriented text host
//!
//! ## Example
//!
//! ```
//! use grid_gambit::board::Slot;
//! use grid_gambit::config::Difficulty;
//! use grid_gambit::engine::{Game, MoveRequest};
//!
//! let mut game = Game::with_seed(Difficulty::Easy, 7);
//! let start = game.player_position(Slot::One).unwrap();
//!
//! let outcome = game.move_player(MoveRequest::step(start.offset(0, -1), Difficulty::Easy));
//! assert!(outcome.is_accepted());
//! game.process_pieces(Difficulty::Easy);
//! game.update_capture_tiles();
//!
//! assert_eq!(game.turn_number(), 1);
//! assert!(game.occupancy_consistent());
//! ```

pub mod board;
pub mod config;
pub mod console;
pub mod constants;
pub mod engine;
pub mod error;
pub mod kind;
pub mod rng;
pub mod rules;
pub mod score;
pub mod session;
pub mod spawn;

pub use engine::Game;
