//! Server side of one player's connection.
//!
//! Each seated connection runs two tasks over the split stream:
//! - reader: frame → move request → session, until the stream fails
//! - writer: drains the outbox in order, one write in flight at a time
//!
//! Whichever task sees the connection die first tells the session; the
//! other one stays quiet thanks to a per-connection [`LeaveGuard`].

use crate::actor::SessionHandle;
use crate::session::{ConnectionId, Outbound};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tictac_protocol::{MoveRequest, read_frame, write_frame};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tracing::{debug, info, instrument, warn};

/// One-shot flag making `leave` fire at most once per connection.
#[derive(Debug, Default)]
pub struct LeaveGuard {
    fired: AtomicBool,
}

impl LeaveGuard {
    /// Returns `true` for the first caller only.
    pub fn fire(&self) -> bool {
        !self.fired.swap(true, Ordering::AcqRel)
    }

    /// Whether the guard has fired.
    pub fn has_fired(&self) -> bool {
        self.fired.load(Ordering::Acquire)
    }
}

/// Starts the reader and writer tasks for a seated connection.
///
/// `inbox` is the receiving end of the outbox the session already holds,
/// so anything broadcast before this call is written first.
pub fn spawn<S>(
    id: ConnectionId,
    stream: S,
    inbox: mpsc::UnboundedReceiver<Outbound>,
    session: SessionHandle,
) where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    let (reader, writer) = tokio::io::split(stream);
    let guard = Arc::new(LeaveGuard::default());

    let read_task = tokio::spawn(read_loop(id, reader, session.clone(), guard.clone()));
    tokio::spawn(write_loop(
        id,
        writer,
        inbox,
        session,
        guard,
        read_task.abort_handle(),
    ));
}

fn leave_once(id: ConnectionId, session: &SessionHandle, guard: &LeaveGuard) {
    if guard.fire() && session.leave(id).is_err() {
        debug!(%id, "Session already stopped");
    }
}

#[instrument(skip(reader, session, guard))]
async fn read_loop<R>(id: ConnectionId, mut reader: R, session: SessionHandle, guard: Arc<LeaveGuard>)
where
    R: AsyncRead + Unpin,
{
    loop {
        match read_frame(&mut reader).await {
            Ok(body) => match MoveRequest::parse(&body) {
                Some(request) => {
                    debug!(%request, "Move request received");
                    if session.make_move(id, request).is_err() {
                        debug!("Session stopped, dropping connection");
                        return;
                    }
                }
                None => debug!(len = body.len(), "Dropping unparsable move request"),
            },
            Err(err) => {
                info!(error = %err, "Connection read failed");
                leave_once(id, &session, &guard);
                return;
            }
        }
    }
}

#[instrument(skip(writer, inbox, session, guard, reader))]
async fn write_loop<W>(
    id: ConnectionId,
    mut writer: W,
    mut inbox: mpsc::UnboundedReceiver<Outbound>,
    session: SessionHandle,
    guard: Arc<LeaveGuard>,
    reader: AbortHandle,
) where
    W: AsyncWrite + Unpin,
{
    while let Some(message) = inbox.recv().await {
        match message {
            Outbound::Frame(frame) => {
                if let Err(err) = write_frame(&mut writer, &frame).await {
                    warn!(error = %err, "Connection write failed");
                    leave_once(id, &session, &guard);
                    break;
                }
            }
            Outbound::Close => {
                // The session has already forgotten this connection.
                guard.fire();
                if let Err(err) = writer.shutdown().await {
                    debug!(error = %err, "Shutdown failed");
                }
                break;
            }
        }
    }
    reader.abort();
    debug!("Connection closed");
}
