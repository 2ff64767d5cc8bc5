//! TCP listener hosting one session.

use crate::actor::{self, SessionClosed};
use crate::connection;
use crate::session::{ConnectionId, JoinOutcome, PeerHandle, Session};
use derive_more::{Display, Error};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{info, instrument, warn};

/// Pause after a failed `accept`, so running out of file descriptors does not
/// turn the loop into a busy spin.
pub const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Failure to set up or keep running a server.
#[derive(Debug, Display, Error)]
pub enum ServerError {
    /// The listener could not be bound.
    #[display("could not bind {addr}: {source}")]
    Bind {
        /// Requested address.
        addr: String,
        /// Underlying failure.
        source: std::io::Error,
    },
    /// The listener failed after binding.
    #[display("listener failed: {_0}")]
    Io(std::io::Error),
    /// The session task stopped unexpectedly.
    #[display("{_0}")]
    Session(SessionClosed),
}

impl From<std::io::Error> for ServerError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<SessionClosed> for ServerError {
    fn from(err: SessionClosed) -> Self {
        Self::Session(err)
    }
}

/// A bound listener plus the session it feeds.
#[derive(Debug)]
pub struct Server {
    listener: TcpListener,
    port: u16,
}

impl Server {
    /// Binds `host:port`. Port 0 picks a free port.
    #[instrument]
    pub async fn bind(host: &str, port: u16) -> Result<Self, ServerError> {
        let listener = TcpListener::bind((host, port))
            .await
            .map_err(|source| ServerError::Bind {
                addr: format!("{host}:{port}"),
                source,
            })?;
        let port = listener.local_addr()?.port();
        info!(port, "Listening");
        Ok(Self { listener, port })
    }

    /// Address actually bound.
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Port actually bound.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Accepts players forever, two at a time.
    ///
    /// New connections are only accepted while the session has a free
    /// seat; later arrivals wait in the listen backlog until the current
    /// round is torn down.
    #[instrument(skip(self), fields(port = self.port))]
    pub async fn run(self) -> Result<(), ServerError> {
        let (session, _task) = actor::spawn(Session::new(self.port));
        let mut next_id = 0u64;

        loop {
            if !session.is_open() {
                info!("Game in progress, waiting for it to end");
            }
            session.wait_until_open().await?;
            info!("Looking for a player...");

            let (stream, addr) = match self.listener.accept().await {
                Ok(accepted) => accepted,
                Err(err) => {
                    warn!(error = %err, delay = ?ACCEPT_RETRY_DELAY, "Accept failed, retrying");
                    tokio::time::sleep(ACCEPT_RETRY_DELAY).await;
                    continue;
                }
            };

            next_id += 1;
            let id = ConnectionId::from(next_id);
            info!(%id, %addr, "A player connected");

            let (peer, inbox) = PeerHandle::channel(id);
            match session.join(peer).await? {
                JoinOutcome::Seated(slot) => {
                    info!(%id, %slot, "A player joined the game");
                    connection::spawn(id, stream, inbox, session.clone());
                }
                outcome => {
                    warn!(%id, ?outcome, "Session refused player, dropping connection");
                }
            }
        }
    }
}
