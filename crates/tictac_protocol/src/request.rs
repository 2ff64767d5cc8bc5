//! Move requests sent from client to server.
//!
//! The body is plain decimal text, `"<x>, <y>"`, with no preamble. The
//! server treats anything it cannot parse as noise and drops it.

use crate::frame::{self, Frame, FrameError};
use derive_more::Display;
use derive_new::new;

/// A request to mark cell `(x, y)`, `x` being the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, new)]
#[display("{x}, {y}")]
pub struct MoveRequest {
    /// Row index.
    pub x: usize,
    /// Column index.
    pub y: usize,
}

impl MoveRequest {
    /// Body text for the wire.
    pub fn to_body(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }

    /// Body wrapped in a frame.
    pub fn to_frame(&self) -> Result<Frame, FrameError> {
        frame::encode(&self.to_body())
    }

    /// Parses a request body. Whitespace around either number is tolerated;
    /// anything else, a sign included, yields `None`.
    pub fn parse(body: &[u8]) -> Option<Self> {
        let text = std::str::from_utf8(body).ok()?;
        let (x, y) = text.split_once(',')?;
        Some(Self {
            x: parse_index(x)?,
            y: parse_index(y)?,
        })
    }
}

/// Bare decimal digits, surrounding whitespace allowed.
fn parse_index(text: &str) -> Option<usize> {
    let digits = text.trim();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
