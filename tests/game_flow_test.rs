//! End-to-end games over loopback TCP.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use connect_four::client::render;
use connect_four::network::protocol::Role;
use connect_four::{GameClient, GameServer, GameSummary, PlayerResult, ServerConfig, Variant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;

struct RunningServer {
    server: Arc<GameServer>,
    addr: SocketAddr,
    handle: JoinHandle<Result<(), connect_four::GameServerError>>,
}

impl RunningServer {
    async fn start(variant: Variant) -> Self {
        let config = ServerConfig {
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            variant,
            move_timeout: Some(Duration::from_secs(10)),
        };
        let server = Arc::new(GameServer::bind(config).await.unwrap());
        let addr = server.local_addr().unwrap();
        let handle = {
            let server = server.clone();
            tokio::spawn(async move { server.run().await })
        };
        Self { server, addr, handle }
    }

    async fn stop(self) {
        self.server.shutdown();
        self.handle.await.unwrap().unwrap();
    }
}

struct Played {
    summary: GameSummary,
    output: String,
}

/// Connect two clients in order and play their scripted inputs to the end.
async fn play_pair(addr: SocketAddr, first_input: &[u8], second_input: &[u8]) -> (Played, Played) {
    let host = addr.ip().to_string();
    let mut first_out = Vec::new();
    let mut second_out = Vec::new();

    let first = GameClient::connect(&host, addr.port(), first_input, &mut first_out)
        .await
        .unwrap();
    let second = GameClient::connect(&host, addr.port(), second_input, &mut second_out)
        .await
        .unwrap();

    let (first, second) = tokio::join!(first.play(), second.play());
    let (first, second) = (first.unwrap(), second.unwrap());

    (
        Played {
            summary: first,
            output: String::from_utf8(first_out).unwrap(),
        },
        Played {
            summary: second,
            output: String::from_utf8(second_out).unwrap(),
        },
    )
}

#[tokio::test]
async fn test_standard_vertical_win() {
    let server = RunningServer::start(Variant::Standard).await;

    let (one, two) = play_pair(server.addr, b"A0\nA0\nA0\nA0\n", b"A1\nA1\nA1\n").await;

    assert_eq!(one.summary.role, Role::First);
    assert_eq!(two.summary.role, Role::Second);
    assert_eq!(one.summary.variant, Variant::Standard);
    assert_eq!(one.summary.result, PlayerResult::Win);
    assert_eq!(two.summary.result, PlayerResult::Loss);
    assert_eq!(one.summary.moves_sent, 4);
    assert_eq!(two.summary.moves_sent, 3);

    assert!(one.output.starts_with("Game Type is Standard\n"));
    assert!(one.output.contains(render::GREETING_FIRST));
    assert!(one.output.ends_with(&format!("{}\n", render::WIN)));
    assert!(two.output.contains(render::GREETING_SECOND));
    assert!(two.output.ends_with(&format!("{}\n", render::LOSS)));

    server.stop().await;
}

#[tokio::test]
async fn test_antistack_self_loss() {
    let server = RunningServer::start(Variant::Antistack).await;

    let (one, two) = play_pair(server.addr, b"A0\nA1\nA2\n", b"A0\nA1\n").await;

    assert_eq!(one.summary.variant, Variant::Antistack);
    assert_eq!(one.summary.result, PlayerResult::Loss);
    assert_eq!(two.summary.result, PlayerResult::Win);
    assert!(two.output.starts_with("Game Type is Antistack\n"));

    server.stop().await;
}

#[tokio::test]
async fn test_invalid_moves_are_retried() {
    let server = RunningServer::start(Variant::Standard).await;

    // Pop-out in standard, out-of-range column, garbage, empty line.
    let first_input = b"P3\nA9\nxx\n\nA0\nA0\nA0\nA0\n";
    let (one, two) = play_pair(server.addr, first_input, b"A1\nA1\nA1\n").await;

    assert_eq!(one.summary.result, PlayerResult::Win);
    assert_eq!(one.summary.invalid_replies, 4);
    assert_eq!(one.summary.moves_sent, 8);
    assert_eq!(one.output.matches(render::INVALID_MOVE).count(), 4);
    assert_eq!(two.summary.invalid_replies, 0);
    assert_eq!(two.summary.result, PlayerResult::Loss);

    server.stop().await;
}

#[tokio::test]
async fn test_popout_game() {
    let server = RunningServer::start(Variant::PopOut).await;

    // Player one pops its own bottom token; player two stacks column 3.
    let first_input = b"A3\nP3\nA4\nA5\nA6\n";
    let second_input = b"A3\nA3\nA3\nA3\n";
    let (one, two) = play_pair(server.addr, first_input, second_input).await;

    assert_eq!(one.summary.variant, Variant::PopOut);
    assert!(one.output.starts_with("Game Type is Popout\n"));
    assert_eq!(one.summary.invalid_replies, 0);
    assert_eq!(two.summary.result, PlayerResult::Win);
    assert_eq!(one.summary.result, PlayerResult::Loss);

    server.stop().await;
}

#[tokio::test]
async fn test_consecutive_pairs_get_separate_games() {
    let server = RunningServer::start(Variant::Standard).await;

    let (a1, a2) = play_pair(server.addr, b"A0\nA0\nA0\nA0\n", b"A1\nA1\nA1\n").await;
    let (b1, b2) = play_pair(server.addr, b"A6\nA5\nA6\nA5\nA6\n", b"A2\nA2\nA2\nA2\n").await;

    assert_eq!(a1.summary.result, PlayerResult::Win);
    assert_eq!(a2.summary.result, PlayerResult::Loss);
    assert_eq!(b1.summary.result, PlayerResult::Loss);
    assert_eq!(b2.summary.result, PlayerResult::Win);

    server.stop().await;
}

/// Connect a raw peer and check its greeting.
async fn raw_peer(addr: SocketAddr, greeting: &[u8]) -> TcpStream {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let mut buf = vec![0u8; greeting.len()];
    stream.read_exact(&mut buf).await.unwrap();
    assert_eq!(buf, greeting);
    stream
}

/// Read a turn or hold frame and return its snapshot.
async fn read_turn(stream: &mut TcpStream, signal: u8) -> Vec<u8> {
    assert_eq!(stream.read_u8().await.unwrap() as char, signal as char);
    let mut snapshot = vec![0u8; 42];
    stream.read_exact(&mut snapshot).await.unwrap();
    snapshot
}

/// Send a move for `mover` and consume the next turn frames.
async fn raw_move(mover: &mut TcpStream, waiter: &mut TcpStream, frame: &[u8; 2]) -> Vec<u8> {
    mover.write_all(frame).await.unwrap();
    let board = read_turn(waiter, b'Y').await;
    assert_eq!(read_turn(mover, b'H').await, board);
    board
}

async fn assert_silent(stream: &mut TcpStream) {
    let mut byte = [0u8; 1];
    let read = tokio::time::timeout(Duration::from_millis(100), stream.read(&mut byte)).await;
    assert!(read.is_err(), "stream received data while idle");
}

#[tokio::test]
async fn test_sessions_run_independently() {
    let server = RunningServer::start(Variant::Standard).await;

    // Pair A: stalled with player one to move.
    let mut a1 = raw_peer(server.addr, b"S2").await;
    let mut a2 = raw_peer(server.addr, b"S").await;
    read_turn(&mut a1, b'Y').await;
    read_turn(&mut a2, b'H').await;

    // Pair B is accepted and plays a whole game meanwhile.
    let mut b1 = raw_peer(server.addr, b"S2").await;
    let mut b2 = raw_peer(server.addr, b"S").await;
    read_turn(&mut b1, b'Y').await;
    read_turn(&mut b2, b'H').await;

    let board = raw_move(&mut b1, &mut b2, b"A0").await;
    assert_eq!(board[35], b'1');
    raw_move(&mut b2, &mut b1, b"A1").await;
    raw_move(&mut b1, &mut b2, b"A0").await;
    raw_move(&mut b2, &mut b1, b"A1").await;
    raw_move(&mut b1, &mut b2, b"A0").await;
    raw_move(&mut b2, &mut b1, b"A1").await;
    b1.write_all(b"A0").await.unwrap();
    assert_eq!(b1.read_u8().await.unwrap(), b'W');
    assert_eq!(b2.read_u8().await.unwrap(), b'L');

    // Nothing from B leaked into A.
    assert_silent(&mut a1).await;
    assert_silent(&mut a2).await;

    // A resumes from an empty board and finishes.
    let board = raw_move(&mut a1, &mut a2, b"A6").await;
    assert_eq!(board.iter().filter(|&&c| c != b'0').count(), 1);
    raw_move(&mut a2, &mut a1, b"A5").await;
    raw_move(&mut a1, &mut a2, b"A6").await;
    raw_move(&mut a2, &mut a1, b"A5").await;
    raw_move(&mut a1, &mut a2, b"A6").await;
    raw_move(&mut a2, &mut a1, b"A5").await;
    a1.write_all(b"A6").await.unwrap();
    assert_eq!(a1.read_u8().await.unwrap(), b'W');
    assert_eq!(a2.read_u8().await.unwrap(), b'L');

    server.stop().await;
}
