// ============================================
// File: crates/softwire-session/src/session.rs
// ============================================
//! # Secure Session Adapter
//!
//! ## Creation Reason
//! Wraps a pseudo-socket descriptor into a security-aware session that
//! can be configured (role, version range, identity, peer host name)
//! and then driven through a non-blocking handshake one step at a time.
//!
//! ## Main Functionality
//! - `SecureSession`: the adapter over a [`BufferSocket`]
//! - `SessionConfig`: negotiation parameters for one handshake epoch
//! - `ServerIdentity`: certificate and key material for server role
//! - `SecurityStatus`: post-handshake security snapshot
//!
//! ## Session Lifecycle
//! ```text
//! new ──► configure (identity / hostname / version range)
//!      ──► reset_handshake(role)
//!      ──► force_handshake_step()*  (until Ok or fatal error)
//!      ──► application write/receive
//!      ──► shutdown ──► close
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - Configuration mutators take effect from the NEXT handshake step;
//!   call `reset_handshake` to start a clean epoch after reconfiguring
//! - `force_handshake_step` on an established session is a cheap no-op
//!   returning `Ok`
//!
//! ## Last Modified
//! v0.1.0 - Initial session adapter

use tracing::{debug, info};

use softwire_common::types::{Direction, PeerInfo, Role};
use softwire_transport::BufferSocket;

use crate::engine::{NegotiationEngine, WireEngine, MAX_CERTIFICATE_SIZE, MAX_HOSTNAME_SIZE};
use crate::error::{Result, SessionError};
use crate::version::{ProtocolVersion, VersionRange};

// ============================================
// ServerIdentity
// ============================================

/// Certificate and private-key material presented by the server role.
///
/// The session layer treats both as opaque bytes; it only requires them
/// to be present and non-empty before a server-side handshake.
#[derive(Debug, Clone)]
pub struct ServerIdentity {
    certificate: Vec<u8>,
    private_key: Vec<u8>,
}

impl ServerIdentity {
    /// Creates validated identity material.
    ///
    /// # Errors
    /// - `MissingIdentity` if either component is empty
    /// - `OversizedConfig` if the certificate exceeds what a handshake
    ///   message can carry
    pub fn new(certificate: impl Into<Vec<u8>>, private_key: impl Into<Vec<u8>>) -> Result<Self> {
        let certificate = certificate.into();
        let private_key = private_key.into();
        if certificate.is_empty() || private_key.is_empty() {
            return Err(SessionError::MissingIdentity);
        }
        if certificate.len() > MAX_CERTIFICATE_SIZE {
            return Err(SessionError::oversized(
                "certificate",
                certificate.len(),
                MAX_CERTIFICATE_SIZE,
            ));
        }
        Ok(Self {
            certificate,
            private_key,
        })
    }

    /// Returns the certificate bytes.
    #[must_use]
    pub fn certificate(&self) -> &[u8] {
        &self.certificate
    }

    /// Returns the private-key bytes.
    #[must_use]
    pub fn private_key(&self) -> &[u8] {
        &self.private_key
    }
}

// ============================================
// SecurityStatus
// ============================================

/// Snapshot of a session's security state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SecurityStatus {
    /// `true` once the handshake has completed on this session.
    pub on: bool,
}

// ============================================
// SessionConfig
// ============================================

/// Negotiation parameters for one handshake epoch.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Which side of the handshake this session plays.
    pub role: Role,
    /// Versions this side is willing to negotiate.
    pub version_range: VersionRange,
    /// Expected peer host name, when verification is wanted.
    pub peer_hostname: Option<String>,
    /// Identity material; required for the server role.
    pub identity: Option<ServerIdentity>,
}

impl SessionConfig {
    /// Creates a config for `role` with the full supported version range
    /// and no identity or host name.
    #[must_use]
    pub fn new(role: Role) -> Self {
        Self {
            role,
            version_range: VersionRange::supported(),
            peer_hostname: None,
            identity: None,
        }
    }
}

// ============================================
// SecureSession
// ============================================

/// Security adapter over a pseudo-socket descriptor.
///
/// Owns the descriptor and a negotiation engine, exposes configuration
/// mutators, and forwards data-plane operations to the descriptor.
///
/// # Example
/// ```no_run
/// use softwire_common::types::{PeerInfo, Role};
/// use softwire_session::session::SecureSession;
/// use softwire_transport::SocketPair;
///
/// let (sock, _peer) =
///     SocketPair::create(1024, PeerInfo::default(), PeerInfo::default()).unwrap();
/// let mut client = SecureSession::new(sock, Role::Client).unwrap();
/// client.set_peer_hostname("localhost").unwrap();
/// client.reset_handshake(Role::Client);
/// ```
pub struct SecureSession {
    socket: BufferSocket,
    config: SessionConfig,
    engine: Box<dyn NegotiationEngine>,
    established: bool,
}

impl SecureSession {
    /// Wraps `socket` into a session playing `role`, using the built-in
    /// negotiation engine.
    ///
    /// # Errors
    /// Returns an error if the descriptor is already closed.
    pub fn new(socket: BufferSocket, role: Role) -> Result<Self> {
        Self::with_engine(socket, role, Box::new(WireEngine::new(role)))
    }

    /// Wraps `socket` with a caller-supplied negotiation engine.
    ///
    /// # Errors
    /// Returns an error if the descriptor is already closed.
    pub fn with_engine(
        socket: BufferSocket,
        role: Role,
        engine: Box<dyn NegotiationEngine>,
    ) -> Result<Self> {
        if socket.is_closed() {
            return Err(softwire_transport::TransportError::closed("import").into());
        }
        info!(%role, peer = ?socket.peer_info(), "session created");
        Ok(Self {
            socket,
            config: SessionConfig::new(role),
            engine,
            established: false,
        })
    }

    // ========================================
    // Configuration
    // ========================================

    /// Starts a fresh handshake epoch playing `role`.
    ///
    /// Any previously established state is discarded; configuration
    /// (identity, host name, version range) carries over.
    pub fn reset_handshake(&mut self, role: Role) {
        self.config.role = role;
        self.established = false;
        self.engine.reset(role);
        debug!(%role, "handshake reset");
    }

    /// Returns the role this session currently plays.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.config.role
    }

    /// Installs server identity material for subsequent handshakes.
    pub fn configure_server_identity(&mut self, identity: ServerIdentity) {
        self.config.identity = Some(identity);
    }

    /// Sets the host name the peer is expected to present.
    ///
    /// # Errors
    /// Returns `OversizedConfig` if the name exceeds what a handshake
    /// message can carry.
    pub fn set_peer_hostname(&mut self, hostname: impl Into<String>) -> Result<()> {
        let hostname = hostname.into();
        if hostname.len() > MAX_HOSTNAME_SIZE {
            return Err(SessionError::oversized(
                "peer hostname",
                hostname.len(),
                MAX_HOSTNAME_SIZE,
            ));
        }
        self.config.peer_hostname = Some(hostname);
        Ok(())
    }

    /// Returns the configured peer host name, if any.
    #[must_use]
    pub fn peer_hostname(&self) -> Option<&str> {
        self.config.peer_hostname.as_deref()
    }

    /// Restricts negotiation to the inclusive range `[min, max]`.
    ///
    /// # Errors
    /// Returns `InvalidRange` if the bounds are inverted or unsupported.
    pub fn set_version_range(&mut self, min: ProtocolVersion, max: ProtocolVersion) -> Result<()> {
        self.config.version_range = VersionRange::new(min, max)?;
        Ok(())
    }

    /// Returns the configured negotiable version range.
    #[must_use]
    pub const fn version_range(&self) -> VersionRange {
        self.config.version_range
    }

    // ========================================
    // Handshake
    // ========================================

    /// Attempts one non-blocking handshake step.
    ///
    /// Returns `Ok(())` once the handshake is established (including on
    /// every later call until the next reset).
    ///
    /// # Errors
    /// - A would-block-classified error when the peer must move first
    /// - Any other error is fatal for this handshake epoch
    pub fn force_handshake_step(&mut self) -> Result<()> {
        if self.established {
            return Ok(());
        }
        self.engine.step(&self.socket, &self.config)?;
        self.established = true;
        info!(
            role = %self.config.role,
            version = ?self.engine.negotiated_version(),
            "handshake established"
        );
        Ok(())
    }

    /// Returns the current security snapshot.
    #[must_use]
    pub const fn security_status(&self) -> SecurityStatus {
        SecurityStatus {
            on: self.established,
        }
    }

    /// Returns the negotiated protocol version, once established.
    #[must_use]
    pub fn negotiated_version(&self) -> Option<ProtocolVersion> {
        self.engine.negotiated_version()
    }

    /// Returns the certificate the peer presented, if any.
    #[must_use]
    pub fn peer_certificate(&self) -> Option<&[u8]> {
        self.engine.peer_certificate()
    }

    // ========================================
    // Data Plane
    // ========================================

    /// Writes `data`, returning how many bytes the transport accepted.
    ///
    /// # Errors
    /// Returns an error if the descriptor is closed or write-shut.
    pub fn write(&self, data: &[u8]) -> Result<usize> {
        Ok(self.socket.write(data)?)
    }

    /// Reads up to `max` bytes, treating "nothing available" as the
    /// would-block error.
    ///
    /// # Errors
    /// - The would-block sentinel when no data is buffered
    /// - A state error if the descriptor is closed or read-shut
    pub fn read_strict(&self, max: usize) -> Result<Vec<u8>> {
        Ok(self.socket.read_strict(max)?)
    }

    /// Reads up to `max` bytes; an empty result is not an error.
    ///
    /// # Errors
    /// Returns a state error if the descriptor is closed or read-shut.
    pub fn receive(&self, max: usize) -> Result<Vec<u8>> {
        Ok(self.socket.receive(max)?)
    }

    /// Shuts down the given direction(s) on the underlying descriptor.
    ///
    /// # Errors
    /// Returns an error if the descriptor is closed.
    pub fn shutdown(&self, direction: Direction) -> Result<()> {
        Ok(self.socket.shutdown(direction)?)
    }

    /// Closes the underlying descriptor. Exactly-once.
    ///
    /// # Errors
    /// Returns a state error on the second and later calls.
    pub fn close(&self) -> Result<()> {
        Ok(self.socket.close()?)
    }

    /// Returns the peer info attached to the underlying descriptor.
    #[must_use]
    pub fn peer_info(&self) -> &PeerInfo {
        self.socket.peer_info()
    }

    /// Returns a reference to the underlying descriptor.
    #[must_use]
    pub const fn socket(&self) -> &BufferSocket {
        &self.socket
    }
}

impl std::fmt::Debug for SecureSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecureSession")
            .field("role", &self.config.role)
            .field("version_range", &self.config.version_range)
            .field("established", &self.established)
            .finish_non_exhaustive()
    }
}

// ============================================
// Tests
// ============================================

#[cfg(test)]
mod tests {
    use super::*;
    use softwire_transport::{SocketPair, TransportError};

    fn session_pair() -> (SecureSession, SecureSession) {
        let (a, b) = SocketPair::create(
            1024,
            PeerInfo::from_host("localhost"),
            PeerInfo::from_host("localhost"),
        )
        .unwrap();
        (
            SecureSession::new(a, Role::Client).unwrap(),
            SecureSession::new(b, Role::Server).unwrap(),
        )
    }

    #[test]
    fn test_identity_requires_material() {
        assert!(ServerIdentity::new(b"", b"key").is_err());
        assert!(ServerIdentity::new(b"cert", b"").is_err());

        let identity = ServerIdentity::new(b"cert", b"key").unwrap();
        assert_eq!(identity.certificate(), b"cert");
        assert_eq!(identity.private_key(), b"key");
    }

    #[test]
    fn test_oversized_identity_certificate_rejected() {
        let big = vec![0u8; MAX_CERTIFICATE_SIZE + 1];
        let err = ServerIdentity::new(big, b"key".to_vec()).unwrap_err();
        assert!(matches!(err, SessionError::OversizedConfig { .. }));

        let exact = vec![0u8; MAX_CERTIFICATE_SIZE];
        assert!(ServerIdentity::new(exact, b"key".to_vec()).is_ok());
    }

    #[test]
    fn test_oversized_hostname_rejected_at_setter() {
        let (mut client, _server) = session_pair();

        let long = "h".repeat(70_000);
        let err = client.set_peer_hostname(long).unwrap_err();
        assert!(matches!(err, SessionError::OversizedConfig { .. }));

        // Config is untouched and the next step errors cleanly.
        assert_eq!(client.peer_hostname(), None);
        client.reset_handshake(Role::Client);
        assert!(client.force_handshake_step().unwrap_err().is_would_block());

        let exact = "h".repeat(MAX_HOSTNAME_SIZE);
        client.set_peer_hostname(exact.clone()).unwrap();
        assert_eq!(client.peer_hostname(), Some(exact.as_str()));
    }

    #[test]
    fn test_import_of_closed_socket_fails() {
        let (sock, _peer) =
            SocketPair::create(64, PeerInfo::default(), PeerInfo::default()).unwrap();
        sock.close().unwrap();
        assert!(SecureSession::new(sock, Role::Client).is_err());
    }

    #[test]
    fn test_version_range_bracketing() {
        let (mut client, _server) = session_pair();

        client
            .set_version_range(ProtocolVersion::V1_1, ProtocolVersion::V1_3)
            .unwrap();
        let range = client.version_range();
        assert!(range.min() <= ProtocolVersion::V1_2);
        assert!(range.max() >= ProtocolVersion::V1_2);

        // Inverted bounds are rejected and leave the config untouched.
        assert!(client
            .set_version_range(ProtocolVersion::V1_3, ProtocolVersion::V1_0)
            .is_err());
        assert_eq!(client.version_range(), range);
    }

    #[test]
    fn test_status_off_before_handshake() {
        let (client, server) = session_pair();
        assert!(!client.security_status().on);
        assert!(!server.security_status().on);
        assert_eq!(client.negotiated_version(), None);
    }

    #[test]
    fn test_first_client_step_would_block() {
        let (mut client, _server) = session_pair();
        client.set_peer_hostname("localhost").unwrap();
        client.reset_handshake(Role::Client);

        let err = client.force_handshake_step().unwrap_err();
        assert!(err.is_would_block());
        assert!(!client.security_status().on);
    }

    #[test]
    fn test_manual_alternating_handshake() {
        let (mut client, mut server) = session_pair();
        client.set_peer_hostname("localhost").unwrap();
        server.set_peer_hostname("localhost").unwrap();
        server.configure_server_identity(ServerIdentity::new(b"cert", b"key").unwrap());
        client.reset_handshake(Role::Client);
        server.reset_handshake(Role::Server);

        let mut rounds = 0;
        while !(client.security_status().on && server.security_status().on) {
            assert!(rounds < 16, "handshake did not converge");
            if let Err(e) = client.force_handshake_step() {
                assert!(e.is_would_block(), "client fatal: {e}");
            }
            if let Err(e) = server.force_handshake_step() {
                assert!(e.is_would_block(), "server fatal: {e}");
            }
            rounds += 1;
        }

        assert_eq!(client.negotiated_version(), server.negotiated_version());
        assert_eq!(client.peer_certificate(), Some(&b"cert"[..]));

        // Idempotent once established.
        assert!(client.force_handshake_step().is_ok());
    }

    #[test]
    fn test_reset_discards_establishment() {
        let (mut client, mut server) = session_pair();
        client.set_peer_hostname("localhost").unwrap();
        server.set_peer_hostname("localhost").unwrap();
        server.configure_server_identity(ServerIdentity::new(b"cert", b"key").unwrap());
        client.reset_handshake(Role::Client);
        server.reset_handshake(Role::Server);

        for _ in 0..16 {
            let _ = client.force_handshake_step();
            let _ = server.force_handshake_step();
        }
        assert!(client.security_status().on);

        client.reset_handshake(Role::Client);
        assert!(!client.security_status().on);
        assert_eq!(client.negotiated_version(), None);
    }

    #[test]
    fn test_data_plane_passthrough() {
        let (client, server) = session_pair();

        assert_eq!(client.write(b"ping").unwrap(), 4);
        assert_eq!(server.receive(16).unwrap(), b"ping");

        // Nothing buffered: strict read reports would-block.
        let err = server.read_strict(1).unwrap_err();
        assert!(err.is_would_block());

        client.shutdown(Direction::Both).unwrap();
        assert!(matches!(
            client.write(b"x").unwrap_err(),
            SessionError::Transport(TransportError::ShutdownViolation { .. })
        ));

        client.close().unwrap();
        assert!(client.close().unwrap_err().is_fatal());
    }
}
