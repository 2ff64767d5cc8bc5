//! Wire format shared by the tictac_duel server and client.
//!
//! # Architecture
//!
//! - **frame**: 4 byte decimal length header plus body, max 768 bytes
//! - **codec**: preamble-tagged JSON state updates (server to client)
//! - **request**: `"x, y"` move requests (client to server)

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod codec;
pub mod frame;
pub mod request;

pub use codec::{CodecError, PREAMBLE, StateUpdate};
pub use frame::{Frame, FrameError, HEADER_LEN, MAX_BODY_LEN, WireError, read_frame, write_frame};
pub use request::MoveRequest;
