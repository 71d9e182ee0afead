// ============================================
// File: crates/softwire-session/src/engine.rs
// ============================================
//! # Negotiation Engine
//!
//! ## Creation Reason
//! The session layer does not implement cryptography; it drives an
//! external secure-transport collaborator through the pseudo-socket's
//! non-blocking read/write contract. This module defines that seam and
//! ships a deterministic built-in engine for exercising it.
//!
//! ## Main Functionality
//! - `NegotiationEngine`: trait the session adapter drives
//! - `WireEngine`: built-in three-message negotiation (hello, accept,
//!   finished) with version selection and hostname verification
//! - Fixed-layout little-endian message framing
//!
//! ## Handshake Flow
//! ```text
//! Client                                          Server
//!   │                                               │
//!   │  Hello                                        │
//!   │  ├─ min/max version                           │
//!   │  └─ peer host name ────────────────────────►  │
//!   │                                               │
//!   │                        Require identity       │
//!   │                        Pick highest common    │
//!   │                                               │
//!   │                                       Accept  │
//!   │  ◄────────────────── negotiated version       │
//!   │                      server name + cert       │
//!   │                                               │
//!   │  Verify name against configured host          │
//!   │                                               │
//!   │  Finished ─────────────────────────────────►  │
//!   │                                               │
//!   │ ════════════ both sides established ════════ │
//! ```
//!
//! ## Wire Format (Little Endian)
//! Every message is a frame: `body_len (2 bytes LE)` then the body.
//! | Body | Layout |
//! |------|--------|
//! | Hello | type(1) min(1) max(1) host_len(2) host |
//! | Accept | type(1) version(1) name_len(2) name cert_len(2) cert |
//! | Finished | type(1) version(1) |
//!
//! ## ⚠️ Important Note for Next Developer
//! - The engine must tolerate arbitrary partial I/O: frames arrive and
//!   leave in fragments whenever the ring buffers are small
//! - A step that merely made progress still returns the would-block
//!   sentinel; only an established handshake returns `Ok`
//!
//! ## Last Modified
//! v0.1.0 - Initial engine implementation

use tracing::{debug, trace};

use softwire_common::types::Role;
use softwire_transport::BufferSocket;

use crate::error::{Result, SessionError};
use crate::session::SessionConfig;
use crate::version::{ProtocolVersion, VersionRange};

// ============================================
// Constants
// ============================================

/// Size of the frame length prefix in bytes.
const FRAME_HEADER_SIZE: usize = 2;

/// How many bytes to pull from the socket per read attempt.
const RECV_CHUNK: usize = 256;

/// Largest host name a handshake message can carry.
///
/// Enforced on both sides of the wire: configuration setters reject
/// longer values, and the decoder rejects longer presented names.
pub const MAX_HOSTNAME_SIZE: usize = 255;

/// Largest certificate payload a handshake message can carry.
///
/// Enforced at [`ServerIdentity`](crate::session::ServerIdentity)
/// construction and again by the decoder.
pub const MAX_CERTIFICATE_SIZE: usize = 4096;

// ============================================
// MessageType
// ============================================

/// Negotiation message type identifier.
///
/// # Wire Format
/// Single byte at the start of every message body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MessageType {
    /// Client's opening offer: version range and target host.
    Hello = 0x01,
    /// Server's response: chosen version plus identity material.
    Accept = 0x02,
    /// Client's confirmation of the chosen version.
    Finished = 0x03,
}

impl MessageType {
    /// Converts a byte to a `MessageType`, if known.
    #[must_use]
    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(Self::Hello),
            0x02 => Some(Self::Accept),
            0x03 => Some(Self::Finished),
            _ => None,
        }
    }

    /// Converts the `MessageType` to its byte representation.
    #[must_use]
    pub const fn as_byte(self) -> u8 {
        self as u8
    }
}

// ============================================
// NegotiationEngine Trait
// ============================================

/// External secure-transport collaborator interface.
///
/// # Purpose
/// Abstracts the negotiation backend so the session adapter can drive
/// any engine - the built-in [`WireEngine`], or a test double - through
/// the same non-blocking contract.
///
/// # Contract
/// - `step` returns `Ok(())` only when the handshake is established;
///   a would-block-classified error means "retry after the peer moves"
/// - Establishment is monotonic until the next `reset`
pub trait NegotiationEngine: Send {
    /// Re-initializes the handshake state for the given role.
    fn reset(&mut self, role: Role);

    /// Attempts one non-blocking handshake step over `socket`.
    ///
    /// # Errors
    /// - A would-block-classified error when another round trip is needed
    /// - Any other error is fatal for this handshake
    fn step(&mut self, socket: &BufferSocket, config: &SessionConfig) -> Result<()>;

    /// Returns `true` once the handshake has completed.
    fn is_established(&self) -> bool;

    /// Returns the negotiated version, once established.
    fn negotiated_version(&self) -> Option<ProtocolVersion>;

    /// Returns the peer's certificate material, if the handshake
    /// delivered any.
    fn peer_certificate(&self) -> Option<&[u8]>;
}

// ============================================
// WireEngine
// ============================================

/// Engine state machine positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EngineState {
    /// Client: hello not yet queued.
    SendHello,
    /// Server: waiting for the client's hello.
    AwaitHello,
    /// Client: waiting for the server's accept.
    AwaitAccept,
    /// Server: waiting for the client's finished.
    AwaitFinished,
    /// Client: finished queued but not fully flushed.
    Finishing,
    /// Both: handshake complete.
    Established,
}

/// Built-in deterministic negotiation engine.
///
/// Performs a three-message exchange (hello, accept, finished) that
/// needs multiple alternating round trips, negotiates the highest
/// version common to both configured ranges, and verifies the peer
/// host name against the configured one. Carries no cryptography.
#[derive(Debug)]
pub struct WireEngine {
    state: EngineState,
    /// Reassembly buffer for partially received frames.
    rx: Vec<u8>,
    /// Outbound bytes not yet accepted by the socket.
    pending_out: Vec<u8>,
    negotiated: Option<ProtocolVersion>,
    peer_certificate: Option<Vec<u8>>,
}

impl WireEngine {
    /// Creates an engine initialized for the given role.
    #[must_use]
    pub fn new(role: Role) -> Self {
        let mut engine = Self {
            state: EngineState::SendHello,
            rx: Vec::new(),
            pending_out: Vec::new(),
            negotiated: None,
            peer_certificate: None,
        };
        engine.reset(role);
        engine
    }

    // ========================================
    // Framing Helpers
    // ========================================

    fn queue_frame(&mut self, body: &[u8]) {
        let len = u16::try_from(body.len())
            .expect("message bodies are bounded by the hostname and certificate caps");
        self.pending_out.extend_from_slice(&len.to_le_bytes());
        self.pending_out.extend_from_slice(body);
    }

    /// Writes as much pending output as the socket accepts.
    fn flush(&mut self, socket: &BufferSocket) -> Result<()> {
        if self.pending_out.is_empty() {
            return Ok(());
        }
        let accepted = socket.write(&self.pending_out)?;
        self.pending_out.drain(..accepted);
        trace!(accepted, remaining = self.pending_out.len(), "engine flush");
        Ok(())
    }

    /// Pulls available bytes and extracts one complete frame body.
    ///
    /// # Errors
    /// Would-block when no complete frame has arrived yet.
    fn read_frame(&mut self, socket: &BufferSocket) -> Result<Vec<u8>> {
        loop {
            match socket.read_strict(RECV_CHUNK) {
                Ok(bytes) => self.rx.extend_from_slice(&bytes),
                Err(e) if e.is_would_block() => break,
                Err(e) => return Err(e.into()),
            }
        }

        if self.rx.len() < FRAME_HEADER_SIZE {
            return Err(softwire_transport::TransportError::WouldBlock.into());
        }
        let body_len = usize::from(u16::from_le_bytes([self.rx[0], self.rx[1]]));
        if self.rx.len() < FRAME_HEADER_SIZE + body_len {
            return Err(softwire_transport::TransportError::WouldBlock.into());
        }

        let mut frame: Vec<u8> = self.rx.drain(..FRAME_HEADER_SIZE + body_len).collect();
        frame.drain(..FRAME_HEADER_SIZE);
        Ok(frame)
    }

    // ========================================
    // Message Encoding
    // ========================================

    fn encode_hello(range: &VersionRange, host: &str) -> Vec<u8> {
        let host = host.as_bytes();
        let mut body = Vec::with_capacity(5 + host.len());
        body.push(MessageType::Hello.as_byte());
        body.push(range.min().as_u8());
        body.push(range.max().as_u8());
        body.extend_from_slice(&(host.len() as u16).to_le_bytes());
        body.extend_from_slice(host);
        body
    }

    fn encode_accept(version: ProtocolVersion, name: &str, certificate: &[u8]) -> Vec<u8> {
        let name = name.as_bytes();
        let mut body = Vec::with_capacity(6 + name.len() + certificate.len());
        body.push(MessageType::Accept.as_byte());
        body.push(version.as_u8());
        body.extend_from_slice(&(name.len() as u16).to_le_bytes());
        body.extend_from_slice(name);
        body.extend_from_slice(&(certificate.len() as u16).to_le_bytes());
        body.extend_from_slice(certificate);
        body
    }

    fn encode_finished(version: ProtocolVersion) -> Vec<u8> {
        vec![MessageType::Finished.as_byte(), version.as_u8()]
    }

    // ========================================
    // Message Decoding
    // ========================================

    fn expect_type(body: &[u8], expected: MessageType, name: &'static str) -> Result<()> {
        let got = *body
            .first()
            .ok_or_else(|| SessionError::malformed("empty message body"))?;
        if MessageType::from_byte(got) != Some(expected) {
            return Err(SessionError::UnexpectedMessage {
                expected: name,
                got,
            });
        }
        Ok(())
    }

    fn decode_hello(body: &[u8]) -> Result<(VersionRange, String)> {
        Self::expect_type(body, MessageType::Hello, "hello")?;
        if body.len() < 5 {
            return Err(SessionError::malformed("hello truncated"));
        }
        let min = ProtocolVersion::new(body[1]);
        let max = ProtocolVersion::new(body[2]);
        let host_len = usize::from(u16::from_le_bytes([body[3], body[4]]));
        if host_len > MAX_HOSTNAME_SIZE {
            return Err(SessionError::malformed("hello host name too long"));
        }
        if body.len() != 5 + host_len {
            return Err(SessionError::malformed("hello length mismatch"));
        }
        let host = String::from_utf8(body[5..].to_vec())
            .map_err(|_| SessionError::malformed("hello host name is not UTF-8"))?;

        let range = VersionRange::new(min, max).map_err(|_| {
            SessionError::negotiation_failed(format!(
                "peer advertised unsupported version bounds ({min}, {max})"
            ))
        })?;
        Ok((range, host))
    }

    fn decode_accept(body: &[u8]) -> Result<(ProtocolVersion, String, Vec<u8>)> {
        Self::expect_type(body, MessageType::Accept, "accept")?;
        if body.len() < 4 {
            return Err(SessionError::malformed("accept truncated"));
        }
        let version = ProtocolVersion::new(body[1]);
        let name_len = usize::from(u16::from_le_bytes([body[2], body[3]]));
        if name_len > MAX_HOSTNAME_SIZE || body.len() < 6 + name_len {
            return Err(SessionError::malformed("accept name length mismatch"));
        }
        let name = String::from_utf8(body[4..4 + name_len].to_vec())
            .map_err(|_| SessionError::malformed("accept server name is not UTF-8"))?;

        let cert_offset = 4 + name_len;
        let cert_len = usize::from(u16::from_le_bytes([
            body[cert_offset],
            body[cert_offset + 1],
        ]));
        if cert_len > MAX_CERTIFICATE_SIZE || body.len() != cert_offset + 2 + cert_len {
            return Err(SessionError::malformed("accept certificate length mismatch"));
        }
        let certificate = body[cert_offset + 2..].to_vec();
        Ok((version, name, certificate))
    }

    fn decode_finished(body: &[u8]) -> Result<ProtocolVersion> {
        Self::expect_type(body, MessageType::Finished, "finished")?;
        if body.len() != 2 {
            return Err(SessionError::malformed("finished length mismatch"));
        }
        Ok(ProtocolVersion::new(body[1]))
    }

    // ========================================
    // State Transitions
    // ========================================

    fn step_send_hello(&mut self, socket: &BufferSocket, config: &SessionConfig) -> Result<()> {
        let host = config.peer_hostname.as_deref().unwrap_or_default();
        // Config fields are public; re-check here so a value that bypassed
        // the session setters still fails instead of corrupting the frame.
        if host.len() > MAX_HOSTNAME_SIZE {
            return Err(SessionError::oversized(
                "peer hostname",
                host.len(),
                MAX_HOSTNAME_SIZE,
            ));
        }
        let hello = Self::encode_hello(&config.version_range, host);
        self.queue_frame(&hello);
        self.state = EngineState::AwaitAccept;
        debug!(range = %config.version_range, host, "queued hello");

        self.flush(socket)?;
        // The accept cannot exist before the peer has stepped.
        Err(softwire_transport::TransportError::WouldBlock.into())
    }

    fn step_await_hello(&mut self, socket: &BufferSocket, config: &SessionConfig) -> Result<()> {
        let body = self.read_frame(socket)?;
        let (client_range, client_host) = Self::decode_hello(&body)?;

        let identity = config.identity.as_ref().ok_or(SessionError::MissingIdentity)?;

        let version = config
            .version_range
            .negotiate(&client_range)
            .ok_or_else(|| {
                SessionError::negotiation_failed(format!(
                    "no version common to local {} and peer {client_range}",
                    config.version_range
                ))
            })?;

        // SNI-style check: a configured name must match what the client asked for.
        if let Some(expected) = &config.peer_hostname {
            if !client_host.is_empty() && client_host != *expected {
                return Err(SessionError::hostname_mismatch(expected, client_host));
            }
        }

        let name = config.peer_hostname.as_deref().unwrap_or_default();
        if name.len() > MAX_HOSTNAME_SIZE {
            return Err(SessionError::oversized(
                "peer hostname",
                name.len(),
                MAX_HOSTNAME_SIZE,
            ));
        }
        if identity.certificate().len() > MAX_CERTIFICATE_SIZE {
            return Err(SessionError::oversized(
                "certificate",
                identity.certificate().len(),
                MAX_CERTIFICATE_SIZE,
            ));
        }
        let accept = Self::encode_accept(version, name, identity.certificate());
        self.queue_frame(&accept);
        self.negotiated = Some(version);
        self.state = EngineState::AwaitFinished;
        debug!(%version, "queued accept");

        self.flush(socket)?;
        Err(softwire_transport::TransportError::WouldBlock.into())
    }

    fn step_await_accept(&mut self, socket: &BufferSocket, config: &SessionConfig) -> Result<()> {
        let body = self.read_frame(socket)?;
        let (version, server_name, certificate) = Self::decode_accept(&body)?;

        if !config.version_range.contains(version) {
            return Err(SessionError::negotiation_failed(format!(
                "server chose {version} outside local range {}",
                config.version_range
            )));
        }
        if let Some(expected) = &config.peer_hostname {
            if server_name != *expected {
                return Err(SessionError::hostname_mismatch(expected, server_name));
            }
        }

        self.negotiated = Some(version);
        self.peer_certificate = Some(certificate);
        self.queue_frame(&Self::encode_finished(version));
        debug!(%version, "accept verified, queued finished");

        self.flush(socket)?;
        if self.pending_out.is_empty() {
            self.state = EngineState::Established;
            Ok(())
        } else {
            self.state = EngineState::Finishing;
            Err(softwire_transport::TransportError::WouldBlock.into())
        }
    }

    fn step_await_finished(&mut self, socket: &BufferSocket) -> Result<()> {
        let body = self.read_frame(socket)?;
        let version = Self::decode_finished(&body)?;

        if Some(version) != self.negotiated {
            return Err(SessionError::negotiation_failed(format!(
                "finished confirmed {version}, expected {:?}",
                self.negotiated
            )));
        }
        self.state = EngineState::Established;
        Ok(())
    }
}

impl NegotiationEngine for WireEngine {
    fn reset(&mut self, role: Role) {
        self.state = match role {
            Role::Client => EngineState::SendHello,
            Role::Server => EngineState::AwaitHello,
        };
        self.rx.clear();
        self.pending_out.clear();
        self.negotiated = None;
        self.peer_certificate = None;
        debug!(%role, "engine reset");
    }

    fn step(&mut self, socket: &BufferSocket, config: &SessionConfig) -> Result<()> {
        // Drain any output left over from a previous partial flush first.
        self.flush(socket)?;
        if !self.pending_out.is_empty() {
            return Err(softwire_transport::TransportError::WouldBlock.into());
        }

        match self.state {
            EngineState::Established => Ok(()),
            EngineState::Finishing => {
                // Pending output is fully drained; the finished is on the wire.
                self.state = EngineState::Established;
                Ok(())
            }
            EngineState::SendHello => self.step_send_hello(socket, config),
            EngineState::AwaitHello => self.step_await_hello(socket, config),
            EngineState::AwaitAccept => self.step_await_accept(socket, config),
            EngineState::AwaitFinished => self.step_await_finished(socket),
        }
    }

    fn is_established(&self) -> bool {
        self.state == EngineState::Established
    }

    fn negotiated_version(&self) -> Option<ProtocolVersion> {
        self.is_established().then_some(self.negotiated).flatten()
    }

    fn peer_certificate(&self) -> Option<&[u8]> {
        self.peer_certificate.as_deref()
    }
}

// ============================================
// Tests
// ============================================
