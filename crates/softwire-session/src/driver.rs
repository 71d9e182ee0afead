// ============================================
// File: crates/softwire-session/src/driver.rs
// ============================================
//! # Handshake Driver
//!
//! ## Creation Reason
//! Two sessions wired over in-memory buffers cannot make progress on
//! their own: each handshake step consumes what the other side wrote.
//! This module alternates steps between the two sides until both are
//! established, tolerating the would-block sentinel along the way.
//!
//! ## Main Functionality
//! - `drive_handshake`: alternates steps with the default round ceiling
//! - `drive_handshake_bounded`: same, with a caller-chosen ceiling
//! - `HandshakeReport`: rounds taken and version agreed
//!
//! ## Driver Loop
//! ```text
//! round:
//!   side A step ──► Ok          keep going (peer may not be done)
//!               ──► would-block keep going
//!               ──► fatal       abort, attributed to side A
//!   side B step ──► (same)
//!   both established? ──► report
//!   ceiling hit?      ──► stalled
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - An established side still gets stepped each round; that call is a
//!   cheap no-op and keeps the loop structure uniform
//! - The ceiling exists because two misconfigured sides (e.g. both
//!   playing client) would otherwise spin forever
//!
//! ## Last Modified
//! v0.1.0 - Initial driver implementation

use tracing::{debug, warn};

use crate::error::{Result, SessionError};
use crate::session::SecureSession;
use crate::version::ProtocolVersion;

// ============================================
// Constants
// ============================================

/// Default ceiling on alternating rounds.
///
/// The built-in engine converges in a handful of rounds even over
/// single-digit-capacity buffers; anything near this ceiling indicates
/// a wiring or configuration problem.
pub const DEFAULT_ROUND_CEILING: usize = 64;

// ============================================
// HandshakeReport
// ============================================

/// Outcome of a successfully driven handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandshakeReport {
    /// Alternating rounds it took for both sides to establish.
    pub rounds: usize,
    /// Version both sides agreed on, when the engine reports one.
    pub negotiated_version: Option<ProtocolVersion>,
}

// ============================================
// Driver Functions
// ============================================

/// Alternates handshake steps between `first` and `second` until both
/// sides report an established session.
///
/// Would-block outcomes are expected and retried; any other step error
/// aborts the loop, attributed to the side that raised it.
///
/// # Errors
/// - `HandshakeAborted` wrapping the first fatal step error
/// - `HandshakeStalled` after [`DEFAULT_ROUND_CEILING`] rounds
pub fn drive_handshake(
    first: &mut SecureSession,
    second: &mut SecureSession,
) -> Result<HandshakeReport> {
    drive_handshake_bounded(first, second, DEFAULT_ROUND_CEILING)
}

/// [`drive_handshake`] with an explicit round ceiling.
///
/// # Errors
/// - `HandshakeAborted` wrapping the first fatal step error
/// - `HandshakeStalled` after `max_rounds` rounds without completion
pub fn drive_handshake_bounded(
    first: &mut SecureSession,
    second: &mut SecureSession,
    max_rounds: usize,
) -> Result<HandshakeReport> {
    for round in 1..=max_rounds {
        step_side(first)?;
        step_side(second)?;

        if first.security_status().on && second.security_status().on {
            let negotiated_version = first.negotiated_version();
            debug!(rounds = round, version = ?negotiated_version, "handshake driven to completion");
            return Ok(HandshakeReport {
                rounds: round,
                negotiated_version,
            });
        }
    }

    warn!(max_rounds, "handshake made no further progress");
    Err(SessionError::HandshakeStalled { rounds: max_rounds })
}

/// Steps one side, swallowing would-block and attributing fatal errors.
fn step_side(side: &mut SecureSession) -> Result<()> {
    match side.force_handshake_step() {
        Ok(()) => Ok(()),
        Err(e) if e.is_would_block() => Ok(()),
        Err(e) => {
            warn!(role = %side.role(), error = %e, "handshake step failed fatally");
            Err(SessionError::aborted(side.role(), e))
        }
    }
}

// ============================================
// Tests
// ============================================

#[cfg(test)]
mod tests {
    use super::*;
    use softwire_common::types::{PeerInfo, Role};
    use softwire_transport::SocketPair;

    use crate::session::ServerIdentity;

    fn configured_pair(capacity: usize) -> (SecureSession, SecureSession) {
        let (a, b) = SocketPair::create(
            capacity,
            PeerInfo::from_host("localhost"),
            PeerInfo::from_host("localhost"),
        )
        .unwrap();

        let mut client = SecureSession::new(a, Role::Client).unwrap();
        client.set_peer_hostname("localhost").unwrap();
        client.reset_handshake(Role::Client);

        let mut server = SecureSession::new(b, Role::Server).unwrap();
        server.set_peer_hostname("localhost").unwrap();
        server.configure_server_identity(ServerIdentity::new(b"cert", b"key").unwrap());
        server.reset_handshake(Role::Server);

        (client, server)
    }

    #[test]
    fn test_drives_to_completion() {
        let (mut client, mut server) = configured_pair(1024);

        let report = drive_handshake(&mut client, &mut server).unwrap();
        assert!(client.security_status().on);
        assert!(server.security_status().on);
        assert!(report.rounds <= 4, "took {} rounds", report.rounds);
        assert_eq!(report.negotiated_version, client.negotiated_version());
    }

    #[test]
    fn test_tiny_buffers_take_more_rounds_but_finish() {
        let (mut client, mut server) = configured_pair(8);

        let report = drive_handshake(&mut client, &mut server).unwrap();
        assert!(report.rounds > 1);
        assert!(client.security_status().on && server.security_status().on);
    }

    #[test]
    fn test_fatal_error_attributed_to_failing_side() {
        let (a, b) = SocketPair::create(
            1024,
            PeerInfo::from_host("localhost"),
            PeerInfo::from_host("localhost"),
        )
        .unwrap();
        let mut client = SecureSession::new(a, Role::Client).unwrap();
        client.set_peer_hostname("localhost").unwrap();
        client.reset_handshake(Role::Client);

        // Server session deliberately left without identity material.
        let mut server = SecureSession::new(b, Role::Server).unwrap();
        server.reset_handshake(Role::Server);

        let err = drive_handshake(&mut client, &mut server).unwrap_err();
        match err {
            SessionError::HandshakeAborted { side, source } => {
                assert_eq!(side, Role::Server);
                assert!(matches!(*source, SessionError::MissingIdentity));
            }
            other => panic!("expected abort, got {other}"),
        }
    }

    #[test]
    fn test_two_servers_stall_at_ceiling() {
        let (a, b) = SocketPair::create(
            256,
            PeerInfo::from_host("localhost"),
            PeerInfo::from_host("localhost"),
        )
        .unwrap();
        let mut left = SecureSession::new(a, Role::Server).unwrap();
        let mut right = SecureSession::new(b, Role::Server).unwrap();
        left.reset_handshake(Role::Server);
        right.reset_handshake(Role::Server);

        // Two servers each wait for a hello that never comes.
        let err = drive_handshake_bounded(&mut left, &mut right, 5).unwrap_err();
        assert!(matches!(err, SessionError::HandshakeStalled { rounds: 5 }));
    }
}
