//! Integration tests for descriptor pairs.
//!
//! Covers the create/transfer/close lifecycle end to end, including the
//! partial-write and shutdown behavior a protocol driver depends on.

use softwire_common::types::{Direction, PeerInfo};
use softwire_transport::{PairConfig, SocketPair, TransportError};

#[test]
fn create_transfer_close_lifecycle() {
    let info = PeerInfo::new(vec![0x01, 0x02, 0x03, 0x04]).unwrap();
    let (left, right) = SocketPair::create(10, info.clone(), info.clone()).unwrap();

    // Repeated 4-byte writes into a 10-byte buffer: 4, 4, then 2 accepted.
    assert_eq!(left.write(info.as_bytes()).unwrap(), 4);
    assert_eq!(left.write(info.as_bytes()).unwrap(), 4);
    assert_eq!(left.write(info.as_bytes()).unwrap(), 2);

    let received = right.receive(10).unwrap();
    assert_eq!(received.len(), 10);
    for (i, byte) in received.iter().enumerate() {
        assert_eq!(*byte, info.as_bytes()[i % info.len()]);
    }

    left.close().unwrap();
    right.close().unwrap();
}

#[test]
fn bidirectional_transfer_preserves_order() {
    let (a, b) = SocketPair::create(
        64,
        PeerInfo::from_host("alpha"),
        PeerInfo::from_host("beta"),
    )
    .unwrap();

    a.write(b"first").unwrap();
    a.write(b" second").unwrap();
    b.write(b"reply").unwrap();

    assert_eq!(b.receive(12).unwrap(), b"first second");
    assert_eq!(a.receive(5).unwrap(), b"reply");
}

#[test]
fn would_block_until_peer_writes() {
    let (a, b) = SocketPair::create(32, PeerInfo::default(), PeerInfo::default()).unwrap();

    assert!(a.read_strict(1).unwrap_err().is_would_block());

    b.write(b"now").unwrap();
    assert_eq!(a.read_strict(3).unwrap(), b"now");

    // Drained again: back to would-block.
    assert!(a.read_strict(1).unwrap_err().is_would_block());
}

#[test]
fn strict_read_returns_partial_data_without_blocking() {
    let (a, b) = SocketPair::create(32, PeerInfo::default(), PeerInfo::default()).unwrap();

    b.write(b"abc").unwrap();
    // Asking for more than is available returns what exists, not an error.
    assert_eq!(a.read_strict(10).unwrap(), b"abc");
}

#[test]
fn shutdown_then_close_rejects_everything() {
    let (a, b) = SocketPair::create(16, PeerInfo::default(), PeerInfo::default()).unwrap();

    a.shutdown(Direction::Both).unwrap();
    b.shutdown(Direction::Both).unwrap();

    assert!(matches!(
        a.write(b"x").unwrap_err(),
        TransportError::ShutdownViolation { .. }
    ));

    a.close().unwrap();
    b.close().unwrap();

    assert!(a.write(b"x").unwrap_err().is_state_error());
    assert!(a.read_strict(1).unwrap_err().is_state_error());
    assert!(b.receive(1).unwrap_err().is_state_error());

    // Second close is rejected: close is exactly-once.
    assert!(a.close().unwrap_err().is_state_error());
    assert!(b.close().unwrap_err().is_state_error());

    // Dropping both descriptors afterwards releases the shared buffers;
    // nothing to assert beyond it not panicking.
    drop(a);
    drop(b);
}

#[test]
fn capacity_is_per_direction() {
    let (a, b) = SocketPair::create(8, PeerInfo::default(), PeerInfo::default()).unwrap();

    // Filling A's outbound direction does not consume B's outbound space.
    assert_eq!(a.write(&[0u8; 8]).unwrap(), 8);
    assert_eq!(a.write(b"x").unwrap(), 0);
    assert_eq!(b.write(&[1u8; 8]).unwrap(), 8);
}

#[test]
fn config_round_trip() {
    let config = PairConfig::new(128)
        .with_peer_a(PeerInfo::from_host("client.local"))
        .with_peer_b(PeerInfo::from_host("server.local"));

    let (a, b) = SocketPair::from_config(&config).unwrap();
    assert_eq!(a.peer_info().as_str(), Some("client.local"));
    assert_eq!(b.peer_info().as_str(), Some("server.local"));
    assert_eq!(a.writable(), 128);
}
