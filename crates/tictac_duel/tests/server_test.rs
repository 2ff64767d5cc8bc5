//! End-to-end games over loopback TCP.

use std::time::Duration;
use tictac_board::Slot;
use tictac_duel::{Client, ClientEvent, Server};
use tictac_protocol::{MoveRequest, StateUpdate, codec, read_frame, write_frame};
use tokio::net::TcpStream;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::timeout;

const WAIT: Duration = Duration::from_secs(5);

async fn start_server() -> u16 {
    let server = Server::bind("127.0.0.1", 0).await.unwrap();
    let port = server.port();
    tokio::spawn(server.run());
    port
}

async fn connect(port: u16) -> TcpStream {
    TcpStream::connect(("127.0.0.1", port)).await.unwrap()
}

async fn next_update(stream: &mut TcpStream) -> StateUpdate {
    let body = timeout(WAIT, read_frame(stream))
        .await
        .expect("timed out waiting for an update")
        .expect("connection failed");
    codec::decode(&body).unwrap()
}

async fn send_move(stream: &mut TcpStream, x: usize, y: usize) {
    let frame = MoveRequest::new(x, y).to_frame().unwrap();
    write_frame(stream, &frame).await.unwrap();
}

async fn assert_disconnected(stream: &mut TcpStream) {
    let result = timeout(WAIT, read_frame(stream))
        .await
        .expect("timed out waiting for disconnect");
    assert!(result.is_err(), "expected EOF, got {result:?}");
}

/// Connects two players and consumes their start updates.
async fn seat_pair(port: u16) -> (TcpStream, TcpStream) {
    let mut one = connect(port).await;
    let mut two = connect(port).await;

    let start = next_update(&mut one).await;
    assert!(start.playing);
    assert_eq!(start.viewer, Slot::One);
    assert_eq!(start.current_player, Slot::One);

    let start = next_update(&mut two).await;
    assert!(start.playing);
    assert_eq!(start.viewer, Slot::Two);
    (one, two)
}

#[tokio::test]
async fn test_game_to_win_then_new_pair() {
    let port = start_server().await;
    let (mut one, mut two) = seat_pair(port).await;

    let moves = [(0, 0), (1, 1), (0, 1), (2, 2)];
    for (turn, (x, y)) in moves.into_iter().enumerate() {
        let mover = if turn % 2 == 0 { &mut one } else { &mut two };
        send_move(mover, x, y).await;

        let seen_by_one = next_update(&mut one).await;
        let seen_by_two = next_update(&mut two).await;
        assert_eq!(seen_by_one.board, seen_by_two.board);
        assert!(seen_by_one.playing);
    }

    send_move(&mut one, 0, 2).await;
    for stream in [&mut one, &mut two] {
        let last = next_update(stream).await;
        assert!(!last.playing);
        assert_eq!(last.winner, Some(Slot::One));
        assert_disconnected(stream).await;
    }

    let (mut three, _four) = seat_pair(port).await;
    send_move(&mut three, 1, 1).await;
    let update = next_update(&mut three).await;
    assert_eq!(update.current_player, Slot::Two);
    assert_eq!(update.board.empty_cells(), 8);
}

#[tokio::test]
async fn test_move_on_taken_cell_gets_no_reply() {
    let port = start_server().await;
    let (mut one, mut two) = seat_pair(port).await;

    send_move(&mut one, 2, 2).await;
    next_update(&mut one).await;
    next_update(&mut two).await;

    // Requests on one connection are handled in order.
    send_move(&mut two, 2, 2).await;
    send_move(&mut two, 1, 1).await;

    let update = next_update(&mut one).await;
    assert_eq!(
        update.board.get(2, 2).and_then(|square| square.owner()),
        Some(Slot::One)
    );
    assert_eq!(
        update.board.get(1, 1).and_then(|square| square.owner()),
        Some(Slot::Two)
    );
    assert_eq!(update.current_player, Slot::One);
}

#[tokio::test]
async fn test_garbage_move_body_is_dropped() {
    let port = start_server().await;
    let (mut one, mut two) = seat_pair(port).await;

    let noise = tictac_protocol::frame::encode(b"hello").unwrap();
    write_frame(&mut one, &noise).await.unwrap();
    send_move(&mut one, 0, 0).await;

    let update = next_update(&mut two).await;
    assert_eq!(update.board.empty_cells(), 8);
}

#[tokio::test]
async fn test_disconnect_mid_game_ends_round_and_seats_waiting_player() {
    let port = start_server().await;
    let (one, mut two) = seat_pair(port).await;

    // Waits in the listen backlog while the round runs.
    let mut three = connect(port).await;

    drop(one);
    assert_disconnected(&mut two).await;

    let mut four = connect(port).await;
    let start = next_update(&mut three).await;
    assert!(start.playing);
    assert_eq!(start.viewer, Slot::One);
    assert_eq!(next_update(&mut four).await.viewer, Slot::Two);
}

#[tokio::test]
async fn test_bad_header_ends_round_for_both_players() {
    let port = start_server().await;
    let (mut one, mut two) = seat_pair(port).await;

    tokio::io::AsyncWriteExt::write_all(&mut one, b"abcd")
        .await
        .unwrap();

    assert_disconnected(&mut one).await;
    assert_disconnected(&mut two).await;

    let (mut three, mut four) = seat_pair(port).await;
    send_move(&mut three, 0, 0).await;
    assert_eq!(next_update(&mut four).await.board.empty_cells(), 8);
}

#[tokio::test]
async fn test_oversized_frame_ends_round_for_both_players() {
    let port = start_server().await;
    let (mut one, mut two) = seat_pair(port).await;

    tokio::io::AsyncWriteExt::write_all(&mut two, b"9999")
        .await
        .unwrap();

    assert_disconnected(&mut two).await;
    assert_disconnected(&mut one).await;
    seat_pair(port).await;
}

#[tokio::test]
async fn test_clients_play_through_server() {
    let port = start_server().await;
    let (one, mut one_events) = Client::connect("127.0.0.1", port).await.unwrap();
    let (two, mut two_events) = Client::connect("127.0.0.1", port).await.unwrap();

    async fn next(events: &mut UnboundedReceiver<ClientEvent>) -> ClientEvent {
        timeout(WAIT, events.recv()).await.unwrap().unwrap()
    }

    let ClientEvent::Update(start) = next(&mut one_events).await else {
        panic!("expected start update");
    };
    assert_eq!(start.viewer, Slot::One);
    assert!(matches!(next(&mut two_events).await, ClientEvent::Update(_)));

    for (x, y) in [(0, 0), (1, 0), (1, 1), (2, 0)] {
        let mover = if one.last_update().is_some_and(|u| u.is_viewers_turn()) {
            &one
        } else {
            &two
        };
        mover.take(x, y).unwrap();
        assert!(matches!(next(&mut one_events).await, ClientEvent::Update(_)));
        assert!(matches!(next(&mut two_events).await, ClientEvent::Update(_)));
    }

    one.take(2, 2).unwrap();
    let ClientEvent::Update(last) = next(&mut two_events).await else {
        panic!("expected final update");
    };
    assert!(!last.playing);
    assert_eq!(last.winner, Some(Slot::One));
    assert_eq!(next(&mut two_events).await, ClientEvent::Disconnected);
    assert!(two.is_closed());

    assert!(matches!(next(&mut one_events).await, ClientEvent::Update(_)));
    assert_eq!(next(&mut one_events).await, ClientEvent::Disconnected);
    assert_eq!(one.last_update().map(|u| u.winner), Some(Some(Slot::One)));
}
