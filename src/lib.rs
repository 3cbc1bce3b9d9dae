//! A perfect-play solver for the board game Connect 4
//!
//! The solver runs an optimised negamax search over a bitboard
//! representation of the position and returns the mathematically
//! exact outcome with best play from both sides.
//!
//! # Basic Usage
//!
//! ```
//! use connect_four::{position::Position, solver::Solver};
//!
//!# use std::error::Error;
//!# fn main() -> Result<(), Box<dyn Error>> {
//! let mut solver = Solver::new(Position::from_moves("112233")?);
//! let (score, best_column) = solver.solve();
//!
//! assert!((score, best_column) == (18, 3));
//!# Ok(())
//!# }
//! ```

use static_assertions::*;
pub use anyhow;

pub mod move_sorter;

pub mod opening_book;

pub mod position;

pub mod solver;

pub mod transposition_table;

mod test;

/// The width of the game board in tiles
pub const WIDTH: usize = 7;

/// The height of the game board in tiles
pub const HEIGHT: usize = 6;

// each column takes HEIGHT + 1 bits, the whole board must fit in a u64
const_assert!(WIDTH * (HEIGHT + 1) < 64);
