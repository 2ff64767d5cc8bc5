//! Text rendering of a state update, from the viewer's seat.

use crate::input::cell_to_numpad;
use std::fmt::Write;
use strum::IntoEnumIterator;
use tictac_board::{BOARD_SIDE, Slot, Square};
use tictac_protocol::StateUpdate;

const INSTRUCTIONS: &str = "Type a digit from your numeric pad (numpad) to choose a cell.\n\
Digits correspond to cells so that the game board resembles the numpad.\n";

/// What `viewer` calls the player in `slot`.
fn name_for(viewer: Slot, slot: Slot) -> &'static str {
    if viewer == slot { "you" } else { "your opponent" }
}

/// Renders the full screen for one update.
pub fn render(update: &StateUpdate) -> String {
    let mut out = String::new();

    let names: Vec<&str> = Slot::iter().map(|slot| name_for(update.viewer, slot)).collect();
    let header = format!(
        "Player 1 (Xs, {}) vs Player 2 (Os, {})",
        names[0], names[1]
    );
    let rule = "*".repeat(header.len());
    let _ = write!(out, "\n{rule}\n{header}\n{rule}\n\n");

    out.push_str(&render_board(update));
    out.push('\n');

    if update.is_viewers_turn() {
        out.push_str(INSTRUCTIONS);
        out.push('\n');
    }

    out.push_str(&footer(update));
    out.push_str("\n\n");
    out
}

/// Board as a grid; empty cells show the digit that selects them.
pub fn render_board(update: &StateUpdate) -> String {
    let rows: Vec<String> = update
        .board
        .rows()
        .iter()
        .enumerate()
        .map(|(x, row)| {
            let cells: Vec<String> = row
                .iter()
                .enumerate()
                .map(|(y, square)| match square {
                    Square::Occupied(slot) => format!(" {} ", slot.mark()),
                    Square::Empty => format!(" {} ", cell_to_numpad(x, y).unwrap_or(0)),
                })
                .collect();
            cells.join("|")
        })
        .collect();

    let separator = format!("\n{}\n", vec!["---"; BOARD_SIDE].join("+"));
    let mut out = rows.join(separator.as_str());
    out.push('\n');
    out
}

/// Last line of the screen: whose turn it is, or how the game ended.
pub fn footer(update: &StateUpdate) -> String {
    if update.playing {
        format!(
            "Waiting for {} to move",
            name_for(update.viewer, update.current_player)
        )
    } else {
        match update.winner {
            None => "GAME OVER, you tied!".to_string(),
            Some(winner) if winner == update.viewer => "GAME OVER, you won!".to_string(),
            Some(_) => "GAME OVER, you lost!".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tictac_board::Board;

    fn update(playing: bool, viewer: Slot, current: Slot, winner: Option<Slot>) -> StateUpdate {
        StateUpdate::new(playing, viewer, current, winner, Board::new())
    }

    #[test]
    fn test_header_names_viewer() {
        let text = render(&update(true, Slot::Two, Slot::One, None));
        assert!(text.contains("Player 1 (Xs, your opponent) vs Player 2 (Os, you)"));
        let rule = "*".repeat("Player 1 (Xs, your opponent) vs Player 2 (Os, you)".len());
        assert!(text.contains(&rule));
    }

    #[test]
    fn test_empty_board_shows_numpad() {
        let board = render_board(&update(true, Slot::One, Slot::One, None));
        assert_eq!(
            board,
            " 7 | 8 | 9 \n---+---+---\n 4 | 5 | 6 \n---+---+---\n 1 | 2 | 3 \n"
        );
    }

    #[test]
    fn test_marks_replace_digits() {
        let mut board = Board::new();
        board.place(0, 0, Slot::One).unwrap();
        board.place(2, 2, Slot::Two).unwrap();
        let state = StateUpdate::new(true, Slot::One, Slot::One, None, board);
        let text = render_board(&state);
        assert!(text.starts_with(" X | 8 | 9 "));
        assert!(text.ends_with(" 1 | 2 | O \n"));
    }

    #[test]
    fn test_instructions_only_on_own_turn() {
        assert!(render(&update(true, Slot::One, Slot::One, None)).contains("numeric pad"));
        assert!(!render(&update(true, Slot::Two, Slot::One, None)).contains("numeric pad"));
    }

    #[test]
    fn test_footers() {
        assert_eq!(
            footer(&update(true, Slot::One, Slot::One, None)),
            "Waiting for you to move"
        );
        assert_eq!(
            footer(&update(true, Slot::One, Slot::Two, None)),
            "Waiting for your opponent to move"
        );
        assert_eq!(footer(&update(false, Slot::One, Slot::One, None)), "GAME OVER, you tied!");
        assert_eq!(
            footer(&update(false, Slot::One, Slot::Two, Some(Slot::One))),
            "GAME OVER, you won!"
        );
        assert_eq!(
            footer(&update(false, Slot::Two, Slot::Two, Some(Slot::One))),
            "GAME OVER, you lost!"
        );
    }
}
