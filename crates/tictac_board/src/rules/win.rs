//! Win detection.

use crate::{BOARD_SIDE, Board, Slot, Square};
use tracing::instrument;

/// Every line that wins: 3 rows, 3 columns, 2 diagonals.
const LINES: [[(usize, usize); BOARD_SIDE]; 8] = [
    // Rows
    [(0, 0), (0, 1), (0, 2)],
    [(1, 0), (1, 1), (1, 2)],
    [(2, 0), (2, 1), (2, 2)],
    // Columns
    [(0, 0), (1, 0), (2, 0)],
    [(0, 1), (1, 1), (2, 1)],
    [(0, 2), (1, 2), (2, 2)],
    // Diagonals
    [(0, 0), (1, 1), (2, 2)],
    [(0, 2), (1, 1), (2, 0)],
];

/// Returns the slot owning all three cells of some line.
///
/// Boards reached by legal alternating play hold at most one such slot, so
/// scan order does not matter.
#[instrument(level = "trace")]
pub fn check_winner(board: &Board) -> Option<Slot> {
    LINES.iter().find_map(|line| line_owner(board, line))
}

fn line_owner(board: &Board, line: &[(usize, usize); BOARD_SIDE]) -> Option<Slot> {
    let [(ax, ay), (bx, by), (cx, cy)] = *line;
    match board.get(ax, ay)? {
        Square::Occupied(slot)
            if board.get(bx, by) == Some(Square::Occupied(slot))
                && board.get(cx, cy) == Some(Square::Occupied(slot)) =>
        {
            Some(slot)
        }
        _ => None,
    }
}
