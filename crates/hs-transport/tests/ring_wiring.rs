//! Integration tests: frames moving around wired rings.

use std::time::Duration;

use bytes::Bytes;
use hs_transport::{wire_ring, Direction, LinkConfig, ProcessId, TransportError};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_env_filter("warn").try_init();
}

/// A clockwise frame from P0 reaches P1, a counter-clockwise one reaches P2.
#[tokio::test]
async fn frames_reach_the_right_neighbour() {
    init_tracing();
    let mut ports = wire_ring(3, &LinkConfig::new()).unwrap();

    ports[0]
        .send_raw(Direction::Clockwise, Bytes::from_static(b"cw"))
        .unwrap();
    ports[0]
        .send_raw(Direction::CounterClockwise, Bytes::from_static(b"ccw"))
        .unwrap();

    let (direction, frame) = ports[1].recv_raw().await.unwrap();
    assert_eq!(direction, Direction::Clockwise);
    assert_eq!(&frame[..], b"cw");

    let (direction, frame) = ports[2].recv_raw().await.unwrap();
    assert_eq!(direction, Direction::CounterClockwise);
    assert_eq!(&frame[..], b"ccw");
}

/// Relaying a frame hop by hop brings it back to its sender after N hops.
#[tokio::test]
async fn frame_circles_the_ring() {
    init_tracing();
    let mut ports = wire_ring(4, &LinkConfig::new()).unwrap();

    ports[0]
        .send_raw(Direction::Clockwise, Bytes::from_static(b"token"))
        .unwrap();
    for hop in 1..4 {
        let (direction, frame) = ports[hop].recv_raw().await.unwrap();
        assert_eq!(direction, Direction::Clockwise);
        ports[hop].send_raw(direction, frame).unwrap();
    }

    let (direction, frame) = ports[0].recv_raw().await.unwrap();
    assert_eq!(direction, Direction::Clockwise);
    assert_eq!(&frame[..], b"token");
}

/// With two processes each direction still has its own link.
#[tokio::test]
async fn two_process_ring_keeps_directions_apart() {
    init_tracing();
    let mut ports = wire_ring(2, &LinkConfig::new()).unwrap();
    assert_eq!(ports[0].neighbor(Direction::Clockwise), ProcessId::new(1));
    assert_eq!(ports[0].neighbor(Direction::CounterClockwise), ProcessId::new(1));

    ports[0]
        .send_raw(Direction::Clockwise, Bytes::from_static(b"a"))
        .unwrap();
    ports[0]
        .send_raw(Direction::CounterClockwise, Bytes::from_static(b"b"))
        .unwrap();

    let mut seen = Vec::new();
    for _ in 0..2 {
        let (direction, frame) = ports[1].recv_raw().await.unwrap();
        seen.push((direction, frame));
    }
    seen.sort_by_key(|(direction, _)| *direction == Direction::CounterClockwise);
    assert_eq!(seen[0], (Direction::Clockwise, Bytes::from_static(b"a")));
    assert_eq!(seen[1], (Direction::CounterClockwise, Bytes::from_static(b"b")));
}

/// A single process talks to itself on both sides.
#[tokio::test]
async fn single_process_ring_loops_back() {
    init_tracing();
    let mut ports = wire_ring(1, &LinkConfig::new()).unwrap();
    ports[0]
        .send_raw(Direction::Clockwise, Bytes::from_static(b"self"))
        .unwrap();
    let (direction, frame) = ports[0].recv_raw().await.unwrap();
    assert_eq!(direction, Direction::Clockwise);
    assert_eq!(&frame[..], b"self");
}

/// Dropping one neighbour retires that inbound link but not the other.
#[tokio::test]
async fn closed_neighbour_does_not_block_the_other_side() {
    init_tracing();
    let mut ports = wire_ring(3, &LinkConfig::new()).unwrap();
    let p2 = ports.pop().unwrap();
    let mut p1 = ports.pop().unwrap();
    let p0 = ports.pop().unwrap();

    // P0 leaves the ring: P1 loses its clockwise inbound link.
    drop(p0);
    p2.send_raw(Direction::CounterClockwise, Bytes::from_static(b"still here"))
        .unwrap();

    let (direction, frame) = tokio::time::timeout(Duration::from_secs(5), p1.recv_raw())
        .await
        .expect("recv timed out")
        .unwrap();
    assert_eq!(direction, Direction::CounterClockwise);
    assert_eq!(&frame[..], b"still here");

    // Sending towards the departed process fails instead of hanging.
    let err = p1
        .send_raw(Direction::CounterClockwise, Bytes::from_static(b"gone"))
        .unwrap_err();
    assert!(matches!(err, TransportError::LinkClosed { .. }));

    drop(p2);
    assert!(matches!(p1.recv_raw().await, Err(TransportError::Shutdown)));
}
