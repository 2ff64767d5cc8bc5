//! Pure tic-tac-toe rules for two seated players.
//!
//! This crate knows nothing about sockets or sessions. It owns the 3x3
//! board, the legality of a single placement, and the evaluation of a
//! board into an [`Outcome`].
//!
//! # Example
//!
//! ```
//! use tictac_board::{evaluate, Board, Outcome, Slot};
//!
//! let mut board = Board::new();
//! board.place(0, 0, Slot::One).unwrap();
//! board.place(0, 1, Slot::One).unwrap();
//! board.place(0, 2, Slot::One).unwrap();
//! assert_eq!(evaluate(&board), Outcome::Win(Slot::One));
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod types;

pub mod rules;

pub use rules::{check_winner, evaluate, is_full};
pub use types::{BOARD_SIDE, Board, Outcome, PlaceError, Slot, Square};
