//! Matchmaking and turn arbitration for one listening port.
//!
//! A [`Session`] seats at most two connections, starts a round as soon as
//! both seats are filled, applies moves in turn order and tears everything
//! down when the round ends. It never touches a socket: seated connections
//! are reached through their [`PeerHandle`] outbox.

use derive_more::{Display, Error, From};
use derive_new::new;
use strum::IntoEnumIterator;
use tictac_board::{Board, Outcome, PlaceError, Slot, evaluate};
use tictac_protocol::{Frame, StateUpdate, codec, frame};
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};

/// Stable identifier of an accepted connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From)]
#[display("#{_0}")]
pub struct ConnectionId(u64);

/// Message queued for a connection's writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// Write this frame.
    Frame(Frame),
    /// Shut the connection down.
    Close,
}

/// The session's reference to a seated connection.
///
/// Holds the outbox only; the socket stays with the connection's tasks.
#[derive(Debug, Clone, new)]
pub struct PeerHandle {
    id: ConnectionId,
    outbox: mpsc::UnboundedSender<Outbound>,
}

impl PeerHandle {
    /// Creates a handle together with the receiving end of its outbox.
    pub fn channel(id: ConnectionId) -> (Self, mpsc::UnboundedReceiver<Outbound>) {
        let (outbox, inbox) = mpsc::unbounded_channel();
        (Self { id, outbox }, inbox)
    }

    /// Connection this handle points at.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Queues a frame. Returns `false` if the writer is gone.
    pub fn deliver(&self, frame: Frame) -> bool {
        self.outbox.send(Outbound::Frame(frame)).is_ok()
    }

    /// Asks the writer to shut the connection down.
    pub fn close(&self) -> bool {
        self.outbox.send(Outbound::Close).is_ok()
    }
}

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum Phase {
    /// Zero or one seat filled, matchmaking open.
    Idle,
    /// Both seats filled and a round running.
    Playing,
    /// Round decided; teardown follows immediately.
    GameOver,
}

/// Result of [`Session::join`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// The connection took this seat.
    Seated(Slot),
    /// The connection already held this seat; nothing changed.
    AlreadySeated(Slot),
    /// No seat is available.
    Full,
}

/// Why a move request was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum IgnoreReason {
    /// No round is running.
    #[display("no game in progress")]
    NotPlaying,
    /// The connection holds no seat.
    #[display("connection is not seated")]
    NotSeated,
    /// The other slot is to move.
    #[display("not this player's turn")]
    NotYourTurn,
    /// Coordinates fall outside the board.
    #[display("cell is off the board")]
    OffBoard,
    /// The cell is owned already.
    #[display("cell is already owned")]
    Occupied,
}

impl From<PlaceError> for IgnoreReason {
    fn from(err: PlaceError) -> Self {
        match err {
            PlaceError::OutOfBounds { .. } => IgnoreReason::OffBoard,
            PlaceError::Occupied { .. } => IgnoreReason::Occupied,
        }
    }
}

/// Result of [`Session::make_move`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Request dropped without any state change or broadcast.
    Ignored(IgnoreReason),
    /// Move applied, turn passed to the other slot.
    Continued,
    /// Move applied and decided the round; the session has been torn down.
    Finished(Outcome),
}

/// Result of [`Session::leave`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveOutcome {
    /// The connection held no seat.
    NotSeated,
    /// Seat released while idle.
    Left(Slot),
    /// Player left mid-round; the round was abandoned and both seats cleared.
    Forfeit(Slot),
}

/// Session misuse.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum SessionError {
    /// `start` needs both seats filled.
    #[display("game needs two players, {seated} seated")]
    NotEnoughPlayers {
        /// Seats currently filled.
        seated: usize,
    },
}

/// One game's worth of shared state. Every method must be called from a
/// single writer; see [`crate::actor`].
#[derive(Debug)]
pub struct Session {
    port: u16,
    seats: [Option<PeerHandle>; 2],
    board: Board,
    phase: Phase,
    current_player: Slot,
    winner: Option<Slot>,
}

impl Session {
    /// Creates an empty, idle session for the given listening port.
    #[instrument]
    pub fn new(port: u16) -> Self {
        info!(port, "Creating game session");
        Self {
            port,
            seats: [None, None],
            board: Board::new(),
            phase: Phase::Idle,
            current_player: Slot::One,
            winner: None,
        }
    }

    /// Port this session serves, used in logs.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether a round is running.
    pub fn playing(&self) -> bool {
        self.phase == Phase::Playing
    }

    /// Whether matchmaking is open.
    pub fn looking_for_players(&self) -> bool {
        !self.playing() && self.seated_count() < self.seats.len()
    }

    /// Current board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Slot to move.
    pub fn current_player(&self) -> Slot {
        self.current_player
    }

    /// Winner of the last decided round, if it had one.
    pub fn winner(&self) -> Option<Slot> {
        self.winner
    }

    /// Number of filled seats.
    pub fn seated_count(&self) -> usize {
        self.seats.iter().flatten().count()
    }

    /// Seat held by `id`.
    pub fn slot_of(&self, id: ConnectionId) -> Option<Slot> {
        Slot::iter()
            .zip(self.seats.iter())
            .find_map(|(slot, seat)| match seat {
                Some(peer) if peer.id() == id => Some(slot),
                _ => None,
            })
    }

    /// State as seen from `viewer`'s seat.
    pub fn state_for(&self, viewer: Slot) -> StateUpdate {
        StateUpdate::new(
            self.playing(),
            viewer,
            self.current_player,
            self.winner,
            self.board.clone(),
        )
    }

    /// Seats a connection. Filling the second seat starts a round.
    #[instrument(skip(self, peer), fields(port = self.port, id = %peer.id()))]
    pub fn join(&mut self, peer: PeerHandle) -> JoinOutcome {
        if let Some(slot) = self.slot_of(peer.id()) {
            debug!(%slot, "Connection already seated");
            return JoinOutcome::AlreadySeated(slot);
        }
        if !self.looking_for_players() {
            warn!("Session is not looking for players");
            return JoinOutcome::Full;
        }

        // Seat two is only ever filled next to seat one, and filling it starts
        // the round, so the first free seat is the one to take.
        let slot = if self.seats[0].is_none() {
            Slot::One
        } else {
            Slot::Two
        };
        info!(%slot, "Seating player");
        self.seats[slot.index()] = Some(peer);

        if self.seated_count() == self.seats.len()
            && let Err(err) = self.start()
        {
            error!(error = %err, "Could not start game");
        }

        JoinOutcome::Seated(slot)
    }

    /// Starts a fresh round with slot one to move and tells both players.
    #[instrument(skip(self), fields(port = self.port))]
    pub fn start(&mut self) -> Result<(), SessionError> {
        let seated = self.seated_count();
        if seated < self.seats.len() {
            return Err(SessionError::NotEnoughPlayers { seated });
        }

        info!("Game started");
        self.board.clear();
        self.winner = None;
        self.phase = Phase::Playing;
        self.pass_turn_to(Slot::One);
        self.broadcast();
        Ok(())
    }

    /// Applies a move for the connection `id`.
    ///
    /// Illegal requests are dropped silently: nothing changes and nothing
    /// is sent back.
    #[instrument(skip(self), fields(port = self.port))]
    pub fn make_move(&mut self, id: ConnectionId, x: usize, y: usize) -> MoveOutcome {
        match self.try_place(id, x, y) {
            Err(reason) => {
                debug!(%id, x, y, %reason, "Ignoring move");
                MoveOutcome::Ignored(reason)
            }
            Ok(slot) => {
                info!(%slot, x, y, "Player takes cell");
                match evaluate(&self.board) {
                    Outcome::InProgress => {
                        self.pass_turn_to(slot.other());
                        self.broadcast();
                        MoveOutcome::Continued
                    }
                    outcome => {
                        self.winner = outcome.winner();
                        self.phase = Phase::GameOver;
                        self.broadcast();
                        match self.winner {
                            Some(winner) => info!(%winner, "Player wins"),
                            None => info!("Players tied"),
                        }
                        self.end_game();
                        MoveOutcome::Finished(outcome)
                    }
                }
            }
        }
    }

    /// Releases the seat held by `id`.
    ///
    /// Leaving mid-round abandons the round for both players; no winner is
    /// declared.
    #[instrument(skip(self), fields(port = self.port))]
    pub fn leave(&mut self, id: ConnectionId) -> LeaveOutcome {
        let Some(slot) = self.slot_of(id) else {
            debug!(%id, "Connection not seated");
            return LeaveOutcome::NotSeated;
        };

        if self.playing() {
            info!(%slot, "Player quit mid-game");
            self.end_game();
            LeaveOutcome::Forfeit(slot)
        } else {
            info!(%slot, "Player left the session");
            if let Some(peer) = self.seats[slot.index()].take() {
                peer.close();
            }
            LeaveOutcome::Left(slot)
        }
    }

    /// Checks every precondition, then places the mark.
    fn try_place(&mut self, id: ConnectionId, x: usize, y: usize) -> Result<Slot, IgnoreReason> {
        if !self.playing() {
            return Err(IgnoreReason::NotPlaying);
        }
        let slot = self.slot_of(id).ok_or(IgnoreReason::NotSeated)?;
        if slot != self.current_player {
            return Err(IgnoreReason::NotYourTurn);
        }
        self.board.place(x, y, slot)?;
        Ok(slot)
    }

    fn pass_turn_to(&mut self, slot: Slot) {
        info!(%slot, "Waiting for player to move");
        self.current_player = slot;
    }

    /// Closes every seated connection and reopens matchmaking.
    fn end_game(&mut self) {
        info!("Game over");
        for peer in self.seats.iter_mut().filter_map(Option::take) {
            peer.close();
        }
        self.phase = Phase::Idle;
    }

    /// Sends every seated player its own copy of the state.
    fn broadcast(&self) {
        for (slot, seat) in Slot::iter().zip(self.seats.iter()) {
            let Some(peer) = seat else { continue };
            match encode_update(&self.state_for(slot)) {
                Ok(frame) => {
                    if !peer.deliver(frame) {
                        debug!(id = %peer.id(), "Outbox closed, update dropped");
                    }
                }
                Err(err) => error!(%slot, error = %err, "Could not encode state update"),
            }
        }
    }
}

/// Error while turning a state update into a frame.
#[derive(Debug, Display, Error)]
enum EncodeError {
    #[display("{_0}")]
    Codec(codec::CodecError),
    #[display("{_0}")]
    Frame(frame::FrameError),
}

fn encode_update(update: &StateUpdate) -> Result<Frame, EncodeError> {
    let body = codec::encode(update).map_err(EncodeError::Codec)?;
    frame::encode(&body).map_err(EncodeError::Frame)
}
