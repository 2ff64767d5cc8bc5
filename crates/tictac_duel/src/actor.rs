//! Single-writer access to a [`Session`].
//!
//! The session lives inside one task. Connections and the accept loop talk
//! to it through a cloneable [`SessionHandle`]; requests are queued and
//! applied one at a time, so a move is always judged against the state left
//! by the previous request.

use crate::session::{ConnectionId, JoinOutcome, PeerHandle, Session};
use derive_more::{Display, Error};
use tictac_protocol::MoveRequest;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument};

/// The session task has stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
#[display("session task has stopped")]
pub struct SessionClosed;

#[derive(Debug)]
enum Command {
    Join {
        peer: PeerHandle,
        reply: oneshot::Sender<JoinOutcome>,
    },
    Move {
        id: ConnectionId,
        request: MoveRequest,
    },
    Leave {
        id: ConnectionId,
    },
}

/// Cloneable sender side of the session task.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<Command>,
    open: watch::Receiver<bool>,
}

impl SessionHandle {
    /// Seats `peer`, waiting until the session has processed the request.
    pub async fn join(&self, peer: PeerHandle) -> Result<JoinOutcome, SessionClosed> {
        let (reply, outcome) = oneshot::channel();
        self.send(Command::Join { peer, reply })?;
        outcome.await.map_err(|_| SessionClosed)
    }

    /// Queues a move request from connection `id`.
    pub fn make_move(&self, id: ConnectionId, request: MoveRequest) -> Result<(), SessionClosed> {
        self.send(Command::Move { id, request })
    }

    /// Queues the departure of connection `id`.
    pub fn leave(&self, id: ConnectionId) -> Result<(), SessionClosed> {
        self.send(Command::Leave { id })
    }

    /// Whether matchmaking was open after the last processed request.
    pub fn is_open(&self) -> bool {
        *self.open.borrow()
    }

    /// Resolves once matchmaking is open.
    pub async fn wait_until_open(&self) -> Result<(), SessionClosed> {
        let mut open = self.open.clone();
        open.wait_for(|open| *open)
            .await
            .map(|_| ())
            .map_err(|_| SessionClosed)
    }

    fn send(&self, command: Command) -> Result<(), SessionClosed> {
        self.commands.send(command).map_err(|_| SessionClosed)
    }
}

/// Moves `session` into its own task.
///
/// The task ends once every handle is dropped and hands the session back.
pub fn spawn(session: Session) -> (SessionHandle, JoinHandle<Session>) {
    let (commands, inbox) = mpsc::unbounded_channel();
    let (open_tx, open) = watch::channel(session.looking_for_players());
    let task = tokio::spawn(run(session, inbox, open_tx));
    (SessionHandle { commands, open }, task)
}

#[instrument(skip_all, fields(port = session.port()))]
async fn run(
    mut session: Session,
    mut inbox: mpsc::UnboundedReceiver<Command>,
    open: watch::Sender<bool>,
) -> Session {
    debug!("Session task started");
    while let Some(command) = inbox.recv().await {
        let pending_reply = match command {
            Command::Join { peer, reply } => Some((reply, session.join(peer))),
            Command::Move { id, request } => {
                session.make_move(id, request.x, request.y);
                None
            }
            Command::Leave { id } => {
                session.leave(id);
                None
            }
        };

        // Publish before replying so a caller that saw the reply never
        // reads a stale matchmaking flag.
        open.send_replace(session.looking_for_players());

        if let Some((reply, outcome)) = pending_reply {
            let _ = reply.send(outcome);
        }
    }
    info!("Session task stopped");
    session
}
