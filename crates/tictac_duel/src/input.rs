//! Keyboard input for the terminal client.
//!
//! Cells are picked with numpad digits so the board reads like the keypad:
//!
//! ```text
//! 7 8 9    row 0
//! 4 5 6    row 1
//! 1 2 3    row 2
//! ```

use crate::client::Client;
use std::io::BufRead;
use tictac_protocol::MoveRequest;
use tracing::{debug, info, warn};

/// Cell selected by a numpad digit, as `(row, column)`.
pub fn numpad_to_cell(digit: u8) -> Option<(usize, usize)> {
    match digit {
        7 => Some((0, 0)),
        8 => Some((0, 1)),
        9 => Some((0, 2)),
        4 => Some((1, 0)),
        5 => Some((1, 1)),
        6 => Some((1, 2)),
        1 => Some((2, 0)),
        2 => Some((2, 1)),
        3 => Some((2, 2)),
        _ => None,
    }
}

/// Numpad digit selecting cell `(x, y)`.
pub fn cell_to_numpad(x: usize, y: usize) -> Option<u8> {
    (1..=9).find(|&digit| numpad_to_cell(digit) == Some((x, y)))
}

/// Turns one whitespace-separated token into a move. Tokens that do not read
/// as a number from 1 to 9 are ignored.
pub fn parse_token(token: &str) -> Option<MoveRequest> {
    let digit: u8 = token.parse().ok()?;
    let (x, y) = numpad_to_cell(digit)?;
    Some(MoveRequest::new(x, y))
}

/// Reads tokens from stdin on a dedicated thread and sends each valid move
/// through `client`.
///
/// The thread stops at end of input or once the client is closed.
pub fn spawn_stdin_reader(client: Client) -> std::io::Result<std::thread::JoinHandle<()>> {
    std::thread::Builder::new()
        .name("stdin-reader".to_string())
        .spawn(move || read_moves(std::io::stdin().lock(), &client))
}

/// Feeds every move found in `source` to `client`.
pub fn read_moves<B: BufRead>(source: B, client: &Client) {
    for line in source.lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                warn!(error = %err, "Could not read input");
                return;
            }
        };

        for token in line.split_whitespace() {
            if client.is_closed() {
                info!("Client closed, input stopped");
                return;
            }
            match parse_token(token) {
                Some(request) => {
                    if let Err(err) = client.take(request.x, request.y) {
                        warn!(error = %err, "Could not send move");
                    }
                }
                None => debug!(token, "Ignoring input"),
            }
        }
    }
    debug!("End of input");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numpad_layout() {
        assert_eq!(numpad_to_cell(7), Some((0, 0)));
        assert_eq!(numpad_to_cell(5), Some((1, 1)));
        assert_eq!(numpad_to_cell(3), Some((2, 2)));
        assert_eq!(numpad_to_cell(1), Some((2, 0)));
        assert_eq!(numpad_to_cell(0), None);
        assert_eq!(numpad_to_cell(10), None);
    }

    #[test]
    fn test_numpad_inverse() {
        for digit in 1..=9 {
            let (x, y) = numpad_to_cell(digit).unwrap();
            assert_eq!(cell_to_numpad(x, y), Some(digit));
        }
        assert_eq!(cell_to_numpad(3, 0), None);
    }

    #[test]
    fn test_parse_token() {
        assert_eq!(parse_token("9"), Some(MoveRequest::new(0, 2)));
        assert_eq!(parse_token("2"), Some(MoveRequest::new(2, 1)));
        for token in ["0", "10", "-1", "x", "", "5a", "+5 "] {
            assert_eq!(parse_token(token), None, "{token:?}");
        }
    }
}
