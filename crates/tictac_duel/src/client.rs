//! Client side connection to a game server.
//!
//! The client keeps the last state update it managed to decode. Updates
//! that fail to decode are logged and dropped so a foreign or garbled
//! payload never replaces a good state.

use derive_more::{Display, Error};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tictac_protocol::{Frame, FrameError, MoveRequest, StateUpdate, codec, read_frame, write_frame};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio::task::AbortHandle;
use tracing::{debug, info, instrument, warn};

/// Client failure.
#[derive(Debug, Display, Error)]
pub enum ClientError {
    /// The server could not be reached.
    #[display("could not connect to {addr}: {source}")]
    Connect {
        /// Address attempted.
        addr: String,
        /// Underlying failure.
        source: std::io::Error,
    },
    /// A move could not be framed.
    #[display("{_0}")]
    Frame(FrameError),
    /// The connection is closed.
    #[display("not connected to the server")]
    Closed,
}

/// Something the application should react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// A state update was received and decoded.
    Update(StateUpdate),
    /// The connection is gone. Sent exactly once.
    Disconnected,
}

#[derive(Debug)]
struct Shared {
    closed: AtomicBool,
    last_update: watch::Sender<Option<StateUpdate>>,
    events: mpsc::UnboundedSender<ClientEvent>,
    tasks: Mutex<Vec<AbortHandle>>,
}

impl Shared {
    /// Tears the connection down. Only the first call has any effect.
    fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Ok(tasks) = self.tasks.lock() {
            tasks.iter().for_each(AbortHandle::abort);
        }
        info!("Disconnected from the server");
        let _ = self.events.send(ClientEvent::Disconnected);
    }
}

/// Handle to a live connection. Cheap to clone; all clones share one
/// connection.
#[derive(Debug, Clone)]
pub struct Client {
    outbox: mpsc::UnboundedSender<Frame>,
    shared: Arc<Shared>,
}

impl Client {
    /// Connects to `host:port`.
    #[instrument]
    pub async fn connect(
        host: &str,
        port: u16,
    ) -> Result<(Self, mpsc::UnboundedReceiver<ClientEvent>), ClientError> {
        let stream = TcpStream::connect((host, port))
            .await
            .map_err(|source| ClientError::Connect {
                addr: format!("{host}:{port}"),
                source,
            })?;
        info!("Connected to the server");
        Ok(Self::from_stream(stream))
    }

    /// Runs the client over an already established stream.
    pub fn from_stream<S>(stream: S) -> (Self, mpsc::UnboundedReceiver<ClientEvent>)
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let (reader, writer) = tokio::io::split(stream);
        let (outbox, inbox) = mpsc::unbounded_channel();
        let (events, event_rx) = mpsc::unbounded_channel();
        let (last_update, _) = watch::channel(None);

        let shared = Arc::new(Shared {
            closed: AtomicBool::new(false),
            last_update,
            events,
            tasks: Mutex::new(Vec::new()),
        });

        let read_task = tokio::spawn(read_loop(reader, shared.clone()));
        let write_task = tokio::spawn(write_loop(writer, inbox, shared.clone()));
        if let Ok(mut tasks) = shared.tasks.lock() {
            tasks.push(read_task.abort_handle());
            tasks.push(write_task.abort_handle());
            // The reader may have failed before the handles were stored.
            if shared.closed.load(Ordering::Acquire) {
                tasks.iter().for_each(AbortHandle::abort);
            }
        }

        (Self { outbox, shared }, event_rx)
    }

    /// Asks the server to mark cell `(x, y)`.
    pub fn take(&self, x: usize, y: usize) -> Result<(), ClientError> {
        if self.is_closed() {
            return Err(ClientError::Closed);
        }
        let request = MoveRequest::new(x, y);
        let frame = request.to_frame().map_err(ClientError::Frame)?;
        debug!(%request, "Queueing move");
        self.outbox.send(frame).map_err(|_| ClientError::Closed)
    }

    /// Most recent state successfully decoded.
    pub fn last_update(&self) -> Option<StateUpdate> {
        self.shared.last_update.borrow().clone()
    }

    /// Whether the connection has been closed.
    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::Acquire)
    }

    /// Closes the connection. Repeated calls are harmless.
    pub fn close(&self) {
        self.shared.close();
    }
}

async fn read_loop<R>(mut reader: R, shared: Arc<Shared>)
where
    R: AsyncRead + Unpin,
{
    loop {
        let body = match read_frame(&mut reader).await {
            Ok(body) => body,
            Err(err) => {
                warn!(error = %err, "An error occurred while listening to the server");
                shared.close();
                return;
            }
        };

        match codec::decode(&body) {
            Ok(update) => {
                debug!(playing = update.playing, viewer = %update.viewer, "Received state update");
                shared.last_update.send_replace(Some(update.clone()));
                let _ = shared.events.send(ClientEvent::Update(update));
            }
            Err(err) => warn!(error = %err, "Discarding state update"),
        }
    }
}

async fn write_loop<W>(mut writer: W, mut inbox: mpsc::UnboundedReceiver<Frame>, shared: Arc<Shared>)
where
    W: AsyncWrite + Unpin,
{
    while let Some(frame) = inbox.recv().await {
        if let Err(err) = write_frame(&mut writer, &frame).await {
            warn!(error = %err, "An error occurred while writing to the server");
            shared.close();
            return;
        }
        debug!("A message was sent");
    }
}
