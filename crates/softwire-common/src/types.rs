// ============================================
// File: crates/softwire-common/src/types.rs
// ============================================
//! # Core Type Definitions
//!
//! ## Creation Reason
//! Centralizes fundamental type definitions used throughout softwire,
//! ensuring type safety and consistent representations across the
//! transport and session layers.
//!
//! ## Main Functionality
//! - `Direction`: Shutdown direction selector (read, write, both)
//! - `Role`: Handshake role (client or server)
//! - `PeerInfo`: Opaque peer-identity payload attached to a descriptor
//!
//! ## Main Logical Flow
//! 1. Types are created during pair construction or session setup
//! 2. `Direction` selects which half of a descriptor to shut down
//! 3. `Role` decides which side of the negotiation a session plays
//! 4. `PeerInfo` rides along with each descriptor for diagnostics
//!
//! ## ⚠️ Important Note for Next Developer
//! - `PeerInfo` is opaque bytes, not necessarily UTF-8; never assume a
//!   host name without going through `as_str()`
//! - Maintain backward-compatible serialization formats
//!
//! ## Last Modified
//! v0.1.0 - Initial type definitions

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CommonError, Result};

// ============================================
// Constants
// ============================================

/// Maximum size of a peer-identity payload in bytes.
pub const MAX_PEER_INFO_SIZE: usize = 256;

// ============================================
// Direction
// ============================================

/// Direction selector for descriptor shutdown.
///
/// # Purpose
/// Mirrors the directional shutdown of a real socket: either half of a
/// duplex descriptor can be closed independently, or both at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Shut down the read half; no further reads return data.
    Read,
    /// Shut down the write half; no further writes are accepted.
    Write,
    /// Shut down both halves.
    Both,
}

impl Direction {
    /// Returns `true` if this direction covers reads.
    #[must_use]
    pub const fn covers_read(&self) -> bool {
        matches!(self, Self::Read | Self::Both)
    }

    /// Returns `true` if this direction covers writes.
    #[must_use]
    pub const fn covers_write(&self) -> bool {
        matches!(self, Self::Write | Self::Both)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => write!(f, "read"),
            Self::Write => write!(f, "write"),
            Self::Both => write!(f, "both"),
        }
    }
}

// ============================================
// Role
// ============================================

/// Handshake role of a secure session.
///
/// # Purpose
/// A negotiation always has exactly one client and one server side;
/// the role decides which messages a session sends and expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Initiating side of the handshake.
    Client,
    /// Responding side of the handshake; requires identity material.
    Server,
}

impl Role {
    /// Returns `true` if this is the server role.
    #[must_use]
    pub const fn is_server(&self) -> bool {
        matches!(self, Self::Server)
    }

    /// Returns the opposite role.
    #[must_use]
    pub const fn peer(&self) -> Self {
        match self {
            Self::Client => Self::Server,
            Self::Server => Self::Client,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Client => write!(f, "client"),
            Self::Server => write!(f, "server"),
        }
    }
}

// ============================================
// PeerInfo
// ============================================

/// Opaque peer-identity payload attached to a pseudo-socket descriptor.
///
/// # Purpose
/// Carries arbitrary identifying bytes (typically a host name) alongside
/// a descriptor. The transport layer never interprets the contents; the
/// session layer may read it back for diagnostics.
///
/// # Example
/// ```
/// use softwire_common::types::PeerInfo;
///
/// let info = PeerInfo::from_host("localhost");
/// assert_eq!(info.as_str(), Some("localhost"));
/// assert_eq!(info.len(), 9);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeerInfo(Vec<u8>);

impl PeerInfo {
    /// Creates a `PeerInfo` from raw bytes.
    ///
    /// # Errors
    /// Returns `InvalidInput` if the payload exceeds [`MAX_PEER_INFO_SIZE`].
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self> {
        let bytes = bytes.into();
        if bytes.len() > MAX_PEER_INFO_SIZE {
            return Err(CommonError::invalid_input(
                "peer_info",
                format!(
                    "payload of {} bytes exceeds maximum of {MAX_PEER_INFO_SIZE}",
                    bytes.len()
                ),
            ));
        }
        Ok(Self(bytes))
    }

    /// Creates a `PeerInfo` from a host name.
    ///
    /// A host name longer than [`MAX_PEER_INFO_SIZE`] bytes is truncated
    /// to the limit; use [`PeerInfo::new`] when oversized input must be
    /// an error instead.
    #[must_use]
    pub fn from_host(host: &str) -> Self {
        let bytes = host.as_bytes();
        let end = bytes.len().min(MAX_PEER_INFO_SIZE);
        Self(bytes[..end].to_vec())
    }

    /// Returns the raw payload bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the payload as a string, if it is valid UTF-8.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.0).ok()
    }

    /// Returns the payload length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the payload is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for PeerInfo {
    fn default() -> Self {
        Self(Vec::new())
    }
}

// ============================================
// Tests
// ============================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_coverage() {
        assert!(Direction::Read.covers_read());
        assert!(!Direction::Read.covers_write());

        assert!(Direction::Write.covers_write());
        assert!(!Direction::Write.covers_read());

        assert!(Direction::Both.covers_read());
        assert!(Direction::Both.covers_write());
    }

    #[test]
    fn test_role_peer() {
        assert_eq!(Role::Client.peer(), Role::Server);
        assert_eq!(Role::Server.peer(), Role::Client);
        assert!(Role::Server.is_server());
        assert!(!Role::Client.is_server());
    }

    #[test]
    fn test_peer_info_from_host() {
        let info = PeerInfo::from_host("localhost");
        assert_eq!(info.as_str(), Some("localhost"));
        assert_eq!(info.as_bytes(), b"localhost");
        assert!(!info.is_empty());
    }

    #[test]
    fn test_peer_info_from_host_truncates_oversized() {
        let long = "h".repeat(MAX_PEER_INFO_SIZE + 64);
        let info = PeerInfo::from_host(&long);
        assert_eq!(info.len(), MAX_PEER_INFO_SIZE);
        assert_eq!(info.as_bytes(), &long.as_bytes()[..MAX_PEER_INFO_SIZE]);
    }

    #[test]
    fn test_peer_info_opaque_bytes() {
        let info = PeerInfo::new(vec![0x01, 0x02, 0x03, 0x04]).unwrap();
        assert_eq!(info.len(), 4);
        // Not valid UTF-8 text semantics are fine; bytes are opaque
        assert_eq!(info.as_bytes(), &[0x01, 0x02, 0x03, 0x04]);
    }

    #[test]
    fn test_peer_info_size_limit() {
        let oversized = vec![0u8; MAX_PEER_INFO_SIZE + 1];
        assert!(PeerInfo::new(oversized).is_err());

        let max = vec![0u8; MAX_PEER_INFO_SIZE];
        assert!(PeerInfo::new(max).is_ok());
    }

    #[test]
    fn test_display_forms() {
        assert_eq!(Direction::Both.to_string(), "both");
        assert_eq!(Role::Client.to_string(), "client");
    }
}
