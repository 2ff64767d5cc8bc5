//! State update payload.
//!
//! An update body is the protocol preamble followed by a JSON record of the
//! game state. JSON describes itself but does not delimit itself; the
//! surrounding frame supplies the length.
//!
//! ```text
//! 37ffb46b-5005-4b46-bbf2-d6595d1c3cb1{"playing":true,"viewer":"Two",...}
//! ```

use derive_more::{Display, Error};
use derive_new::new;
use serde::{Deserialize, Serialize};
use tictac_board::{Board, Slot};
use tracing::instrument;

/// Version tag every update starts with. Anything else on the port is
/// rejected before deserialization is attempted.
pub const PREAMBLE: &str = "37ffb46b-5005-4b46-bbf2-d6595d1c3cb1";

/// Authoritative game state as seen by one recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, new)]
pub struct StateUpdate {
    /// Whether a game is in progress.
    pub playing: bool,
    /// Slot occupied by the recipient of this copy.
    pub viewer: Slot,
    /// Slot whose turn it is.
    pub current_player: Slot,
    /// Winner of a finished game; `None` while playing or after a tie.
    pub winner: Option<Slot>,
    /// Board contents, identical for both recipients.
    pub board: Board,
}

impl StateUpdate {
    /// Whether it is the recipient's turn in a running game.
    pub fn is_viewers_turn(&self) -> bool {
        self.playing && self.current_player == self.viewer
    }
}

/// Why a body could not be turned into a [`StateUpdate`].
#[derive(Debug, Display, Error)]
pub enum CodecError {
    /// The body does not begin with [`PREAMBLE`].
    #[display("state update does not start with the protocol preamble")]
    PreambleMismatch,
    /// The body is shorter than [`PREAMBLE`].
    #[display("state update of {len} bytes is shorter than the preamble")]
    Truncated {
        /// Body length received.
        len: usize,
    },
    /// The record after the preamble failed to deserialize.
    #[display("malformed state update: {_0}")]
    Malformed(serde_json::Error),
    /// The record could not be serialized.
    #[display("could not encode state update: {_0}")]
    Encode(serde_json::Error),
}

/// Serializes `update` behind the preamble.
#[instrument(level = "trace", skip(update))]
pub fn encode(update: &StateUpdate) -> Result<Vec<u8>, CodecError> {
    let mut body = PREAMBLE.as_bytes().to_vec();
    serde_json::to_writer(&mut body, update).map_err(CodecError::Encode)?;
    Ok(body)
}

/// Parses a body produced by [`encode`].
///
/// Either the whole update is returned or nothing is; callers keep their
/// previous state on error.
#[instrument(level = "trace", skip(body), fields(len = body.len()))]
pub fn decode(body: &[u8]) -> Result<StateUpdate, CodecError> {
    let preamble = PREAMBLE.as_bytes();
    if body.len() < preamble.len() {
        return Err(CodecError::Truncated { len: body.len() });
    }

    let (tag, record) = body.split_at(preamble.len());
    if tag != preamble {
        return Err(CodecError::PreambleMismatch);
    }

    serde_json::from_slice(record).map_err(CodecError::Malformed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::MAX_BODY_LEN;

    fn sample() -> StateUpdate {
        let mut board = Board::new();
        board.place(0, 0, Slot::One).unwrap();
        board.place(1, 1, Slot::Two).unwrap();
        StateUpdate::new(true, Slot::Two, Slot::One, None, board)
    }

    #[test]
    fn test_round_trip() {
        let update = sample();
        let body = encode(&update).unwrap();
        assert!(body.starts_with(PREAMBLE.as_bytes()));
        assert_eq!(decode(&body).unwrap(), update);
    }

    #[test]
    fn test_round_trip_finished_game() {
        let mut board = Board::new();
        for (y, slot) in [Slot::One, Slot::One, Slot::One].into_iter().enumerate() {
            board.place(0, y, slot).unwrap();
        }
        let update = StateUpdate::new(false, Slot::One, Slot::One, Some(Slot::One), board);
        assert_eq!(decode(&encode(&update).unwrap()).unwrap(), update);
    }

    #[test]
    fn test_round_trip_every_field_combination() {
        let mut partial = Board::new();
        partial.place(2, 0, Slot::One).unwrap();
        partial.place(0, 2, Slot::Two).unwrap();
        let mut full = Board::new();
        for (i, slot) in [
            Slot::One,
            Slot::Two,
            Slot::One,
            Slot::One,
            Slot::Two,
            Slot::Two,
            Slot::Two,
            Slot::One,
            Slot::One,
        ]
        .into_iter()
        .enumerate()
        {
            full.place(i / 3, i % 3, slot).unwrap();
        }

        for board in [Board::new(), partial, full] {
            for playing in [true, false] {
                for viewer in [Slot::One, Slot::Two] {
                    for current in [Slot::One, Slot::Two] {
                        for winner in [None, Some(Slot::One), Some(Slot::Two)] {
                            let update =
                                StateUpdate::new(playing, viewer, current, winner, board.clone());
                            let body = encode(&update).unwrap();
                            assert_eq!(decode(&body).unwrap(), update, "{update:?}");
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_largest_update_fits_in_a_frame() {
        let mut board = Board::new();
        for x in 0..3 {
            for y in 0..3 {
                board.place(x, y, Slot::Two).unwrap();
            }
        }
        let update = StateUpdate::new(false, Slot::Two, Slot::Two, Some(Slot::Two), board);
        assert!(encode(&update).unwrap().len() <= MAX_BODY_LEN);
    }

    #[test]
    fn test_short_body_is_truncated() {
        let err = decode(&PREAMBLE.as_bytes()[..10]).unwrap_err();
        assert!(matches!(err, CodecError::Truncated { len: 10 }));
    }

    #[test]
    fn test_foreign_preamble_is_rejected() {
        let mut body = encode(&sample()).unwrap();
        body[0] = b'X';
        assert!(matches!(decode(&body), Err(CodecError::PreambleMismatch)));
    }

    #[test]
    fn test_bare_preamble_is_malformed() {
        let err = decode(PREAMBLE.as_bytes()).unwrap_err();
        assert!(matches!(err, CodecError::Malformed(_)));
    }

    #[test]
    fn test_garbage_record_is_malformed() {
        let mut body = PREAMBLE.as_bytes().to_vec();
        body.extend_from_slice(br#"{"playing":"yes"}"#);
        assert!(matches!(decode(&body), Err(CodecError::Malformed(_))));
    }

    #[test]
    fn test_trailing_bytes_are_malformed() {
        let mut body = encode(&sample()).unwrap();
        body.extend_from_slice(b"junk");
        assert!(matches!(decode(&body), Err(CodecError::Malformed(_))));
    }

    #[test]
    fn test_viewers_turn() {
        let mut update = sample();
        assert!(!update.is_viewers_turn());
        update.viewer = Slot::One;
        assert!(update.is_viewers_turn());
        update.playing = false;
        assert!(!update.is_viewers_turn());
    }
}
