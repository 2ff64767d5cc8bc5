//! Tictac Duel - two-player tic-tac-toe over TCP.
//!
//! # Architecture
//!
//! - **Server**: one listener per port, each feeding a single [`Session`]
//! - **Session**: matchmaking, turn order and teardown, run as an actor task
//! - **Connection**: per-player reader and writer tasks bridging socket and session
//! - **Client**: terminal player with numpad input and text rendering
//!
//! # Example
//!
//! ```no_run
//! use tictac_duel::{Client, Server};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let server = Server::bind("127.0.0.1", 0).await?;
//! let port = server.port();
//! tokio::spawn(server.run());
//!
//! let (client, _events) = Client::connect("127.0.0.1", port).await?;
//! client.take(1, 1)?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod actor;
mod client;
mod config;
mod connection;
mod input;
mod render;
mod server;
mod session;

// Crate-level exports - Session management
pub use session::{
    ConnectionId, IgnoreReason, JoinOutcome, LeaveOutcome, MoveOutcome, Outbound, PeerHandle,
    Phase, Session, SessionError,
};

// Crate-level exports - Session actor
pub use actor::{SessionClosed, SessionHandle, spawn as spawn_session};

// Crate-level exports - Networking
pub use connection::LeaveGuard;
pub use server::{ACCEPT_RETRY_DELAY, Server, ServerError};

// Crate-level exports - Client
pub use client::{Client, ClientError, ClientEvent};
pub use input::{cell_to_numpad, numpad_to_cell, parse_token, read_moves, spawn_stdin_reader};
pub use render::{footer, render, render_board};

// Crate-level exports - Configuration
pub use config::{ClientSettings, ConfigError, DuelConfig, LoggingSettings, ServerSettings};
