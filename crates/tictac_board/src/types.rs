//! Core domain types for the board.

use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};

/// Number of cells along one side of the board.
pub const BOARD_SIDE: usize = 3;

/// One of the two player positions in a game.
///
/// Slot one plays the Xs and always moves first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display,
    strum::EnumIter,
)]
pub enum Slot {
    /// First seated player (Xs).
    #[display("Player 1")]
    One,
    /// Second seated player (Os).
    #[display("Player 2")]
    Two,
}

impl Slot {
    /// Returns the opposing slot.
    pub fn other(self) -> Self {
        match self {
            Slot::One => Slot::Two,
            Slot::Two => Slot::One,
        }
    }

    /// Zero-based index, handy for per-slot arrays.
    pub fn index(self) -> usize {
        match self {
            Slot::One => 0,
            Slot::Two => 1,
        }
    }

    /// Letter drawn on the board for this slot.
    pub fn mark(self) -> char {
        match self {
            Slot::One => 'X',
            Slot::Two => 'O',
        }
    }
}

/// A cell on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Square {
    /// Nobody owns the cell.
    #[default]
    Empty,
    /// Cell owned by a player.
    Occupied(Slot),
}

impl Square {
    /// Owner of the cell, if any.
    pub fn owner(self) -> Option<Slot> {
        match self {
            Square::Empty => None,
            Square::Occupied(slot) => Some(slot),
        }
    }
}

/// Reason a placement was refused.
///
/// Refusals are expected during play and carry no side effects; the board
/// is left exactly as it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum PlaceError {
    /// Coordinates fall outside the board.
    #[display("cell ({x}, {y}) is off the board")]
    OutOfBounds {
        /// Requested row.
        x: usize,
        /// Requested column.
        y: usize,
    },
    /// The cell already has a mark.
    #[display("cell ({x}, {y}) is already owned by {owner}")]
    Occupied {
        /// Requested row.
        x: usize,
        /// Requested column.
        y: usize,
        /// Current owner of the cell.
        owner: Slot,
    },
}

/// 3x3 board, indexed `[x][y]` where `x` is the row and `y` the column.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Board {
    cells: [[Square; BOARD_SIDE]; BOARD_SIDE],
}

impl Board {
    /// Creates an empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Square at `(x, y)`, or `None` when off the board.
    pub fn get(&self, x: usize, y: usize) -> Option<Square> {
        self.cells.get(x).and_then(|row| row.get(y)).copied()
    }

    /// Whether `(x, y)` is on the board and unowned.
    pub fn is_empty(&self, x: usize, y: usize) -> bool {
        matches!(self.get(x, y), Some(Square::Empty))
    }

    /// Puts `slot`'s mark on `(x, y)`.
    pub fn place(&mut self, x: usize, y: usize, slot: Slot) -> Result<(), PlaceError> {
        match self.get(x, y) {
            None => Err(PlaceError::OutOfBounds { x, y }),
            Some(Square::Occupied(owner)) => Err(PlaceError::Occupied { x, y, owner }),
            Some(Square::Empty) => {
                self.cells[x][y] = Square::Occupied(slot);
                Ok(())
            }
        }
    }

    /// Wipes every mark.
    pub fn clear(&mut self) {
        self.cells = Default::default();
    }

    /// Rows of the board, top to bottom.
    pub fn rows(&self) -> &[[Square; BOARD_SIDE]; BOARD_SIDE] {
        &self.cells
    }

    /// Number of unowned cells.
    pub fn empty_cells(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|square| **square == Square::Empty)
            .count()
    }
}

/// Result of evaluating a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Outcome {
    /// No line completed and cells remain.
    #[display("in progress")]
    InProgress,
    /// A player completed a line.
    #[display("{_0} wins")]
    Win(Slot),
    /// Board full without a line.
    #[display("tie")]
    Tie,
}

impl Outcome {
    /// Whether the round is over.
    pub fn is_over(self) -> bool {
        !matches!(self, Outcome::InProgress)
    }

    /// Winning slot, if any.
    pub fn winner(self) -> Option<Slot> {
        match self {
            Outcome::Win(slot) => Some(slot),
            Outcome::InProgress | Outcome::Tie => None,
        }
    }
}
