//! Game rules for tic-tac-toe.
//!
//! Pure functions evaluating a board. Nothing here mutates state, so the
//! result depends on the board alone.

pub mod draw;
pub mod win;

pub use draw::is_full;
pub use win::check_winner;

use crate::{Board, Outcome};
use tracing::instrument;

/// Evaluates a board into an [`Outcome`].
///
/// A completed line wins even on a full board; a full board without a line
/// is a tie.
#[instrument(level = "trace")]
pub fn evaluate(board: &Board) -> Outcome {
    if let Some(slot) = check_winner(board) {
        Outcome::Win(slot)
    } else if is_full(board) {
        Outcome::Tie
    } else {
        Outcome::InProgress
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Slot;

    fn board_from(rows: [&str; 3]) -> Board {
        let mut board = Board::new();
        for (x, row) in rows.iter().enumerate() {
            for (y, c) in row.chars().enumerate() {
                let slot = match c {
                    'X' => Slot::One,
                    'O' => Slot::Two,
                    _ => continue,
                };
                board.place(x, y, slot).unwrap();
            }
        }
        board
    }

    #[test]
    fn test_empty_board_in_progress() {
        assert_eq!(evaluate(&Board::new()), Outcome::InProgress);
    }

    #[test]
    fn test_full_board_without_line_is_tie() {
        let board = board_from(["XOX", "XOO", "OXX"]);
        assert_eq!(evaluate(&board), Outcome::Tie);
    }

    #[test]
    fn test_win_on_last_cell_beats_tie() {
        let board = board_from(["XOX", "OXO", "OXX"]);
        assert_eq!(evaluate(&board), Outcome::Win(Slot::One));
    }

    #[test]
    fn test_column_win_for_second_slot() {
        let board = board_from(["XO.", "XO.", ".OX"]);
        assert_eq!(evaluate(&board), Outcome::Win(Slot::Two));
    }
}
