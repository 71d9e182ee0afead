// ============================================
// File: crates/softwire-session/src/error.rs
// ============================================
//! # Session Error Types
//!
//! ## Creation Reason
//! Defines error types for secure-session setup, handshake negotiation
//! and the driver loop.
//!
//! ## Main Functionality
//! - `SessionError`: primary error enum for session operations
//! - Transparent wrapping of transport errors, so the would-block
//!   sentinel keeps its identity all the way up to the driver loop
//! - Classification into transient vs. fatal outcomes
//!
//! ## Error Categories
//! 1. **Transient**: a wrapped transport `WouldBlock` - retry the step
//! 2. **Configuration**: invalid version range, missing or oversized
//!    identity material
//! 3. **Negotiation**: disjoint ranges, hostname mismatch, bad messages
//! 4. **Driver**: aborted or stalled handshake with side attribution
//!
//! ## ⚠️ Important Note for Next Developer
//! - The driver loop decides retry-vs-abort purely through
//!   `is_would_block()`; every new variant is fatal unless it wraps
//!   the transport sentinel
//!
//! ## Last Modified
//! v0.1.0 - Initial error definitions

use thiserror::Error;

use softwire_common::types::Role;
use softwire_transport::TransportError;

use crate::version::ProtocolVersion;

// ============================================
// Result Type Alias
// ============================================

/// Result type for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;

// ============================================
// SessionError
// ============================================

/// Secure-session error types.
///
/// # Categories
/// - **Transient**: wrapped transport `WouldBlock`
/// - **Configuration**: `InvalidRange`, `MissingIdentity`,
///   `OversizedConfig`
/// - **Negotiation**: `NegotiationFailed`, `HostnameMismatch`,
///   `UnexpectedMessage`, `MalformedMessage`
/// - **Driver**: `HandshakeAborted`, `HandshakeStalled`
#[derive(Error, Debug)]
pub enum SessionError {
    // ========================================
    // Configuration Errors
    // ========================================

    /// Configured version bounds are inconsistent or unsupported.
    #[error("Invalid version range: min {min} exceeds max {max} or is unsupported")]
    InvalidRange {
        /// Requested minimum version
        min: ProtocolVersion,
        /// Requested maximum version
        max: ProtocolVersion,
    },

    /// Server-role handshake attempted without identity material.
    #[error("Server identity material not configured")]
    MissingIdentity,

    /// Configured value exceeds what a handshake message can carry.
    #[error("Configured {field} is {actual} bytes, exceeding the wire limit of {limit}")]
    OversizedConfig {
        /// Which configuration value is too large
        field: &'static str,
        /// Size the caller supplied
        actual: usize,
        /// Maximum the wire format can carry
        limit: usize,
    },

    // ========================================
    // Negotiation Errors
    // ========================================

    /// No protocol version is common to both sides.
    #[error("Version negotiation failed: {reason}")]
    NegotiationFailed {
        /// Why negotiation failed
        reason: String,
    },

    /// Peer presented a host name that does not match the configured one.
    #[error("Peer hostname mismatch: expected '{expected}', peer presented '{presented}'")]
    HostnameMismatch {
        /// Host name this session was configured to expect
        expected: String,
        /// Host name the peer presented
        presented: String,
    },

    /// Received a handshake message out of sequence.
    #[error("Unexpected handshake message: expected {expected}, got 0x{got:02x}")]
    UnexpectedMessage {
        /// What the state machine expected next
        expected: &'static str,
        /// Message type byte actually received
        got: u8,
    },

    /// Received a handshake message that does not parse.
    #[error("Malformed handshake message: {reason}")]
    MalformedMessage {
        /// What's wrong with the message
        reason: String,
    },

    // ========================================
    // Driver Errors
    // ========================================

    /// One side's handshake step failed fatally; the loop aborted.
    #[error("Handshake aborted on {side} side: {source}")]
    HandshakeAborted {
        /// Which side caused the abort
        side: Role,
        /// The underlying fatal error
        #[source]
        source: Box<SessionError>,
    },

    /// The bounded driver hit its round ceiling with neither side done.
    #[error("Handshake stalled: no completion after {rounds} rounds")]
    HandshakeStalled {
        /// How many alternating rounds were attempted
        rounds: usize,
    },

    // ========================================
    // Wrapped Errors
    // ========================================

    /// Error from the transport layer (including the would-block sentinel).
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl SessionError {
    // ========================================
    // Convenience Constructors
    // ========================================

    /// Creates a `NegotiationFailed` error.
    pub fn negotiation_failed(reason: impl Into<String>) -> Self {
        Self::NegotiationFailed {
            reason: reason.into(),
        }
    }

    /// Creates a `MalformedMessage` error.
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedMessage {
            reason: reason.into(),
        }
    }

    /// Creates a `HostnameMismatch` error.
    pub fn hostname_mismatch(
        expected: impl Into<String>,
        presented: impl Into<String>,
    ) -> Self {
        Self::HostnameMismatch {
            expected: expected.into(),
            presented: presented.into(),
        }
    }

    /// Creates an `OversizedConfig` error for `field`.
    #[must_use]
    pub const fn oversized(field: &'static str, actual: usize, limit: usize) -> Self {
        Self::OversizedConfig {
            field,
            actual,
            limit,
        }
    }

    /// Creates a `HandshakeAborted` error attributing `source` to `side`.
    #[must_use]
    pub fn aborted(side: Role, source: Self) -> Self {
        Self::HandshakeAborted {
            side,
            source: Box::new(source),
        }
    }

    // ========================================
    // Error Classification
    // ========================================

    /// Returns `true` if this is the transient would-block outcome.
    ///
    /// The handshake driver retries on would-block and aborts on
    /// everything else.
    #[must_use]
    pub const fn is_would_block(&self) -> bool {
        matches!(self, Self::Transport(TransportError::WouldBlock))
    }

    /// Returns `true` if this error must abort the handshake.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !self.is_would_block()
    }

    /// Returns `true` if this is a negotiation-protocol error.
    #[must_use]
    pub const fn is_negotiation_error(&self) -> bool {
        matches!(
            self,
            Self::NegotiationFailed { .. }
                | Self::HostnameMismatch { .. }
                | Self::UnexpectedMessage { .. }
                | Self::MalformedMessage { .. }
        )
    }
}

// ============================================
// Tests
// ============================================
