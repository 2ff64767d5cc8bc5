//! Draw detection.

use crate::Board;
use tracing::instrument;

/// Checks if every cell is owned.
///
/// A full board with no winner is a tie.
#[instrument(level = "trace")]
pub fn is_full(board: &Board) -> bool {
    board.empty_cells() == 0
}
