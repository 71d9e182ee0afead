// ============================================
// File: crates/softwire-transport/src/pair.rs
// ============================================
//! # Transport Pair Factory
//!
//! ## Creation Reason
//! Constructing a cross-wired descriptor pair is the only place pairing
//! is established; keeping it in one factory makes the guarantee a
//! construction-time property instead of something re-derived later.
//!
//! ## Main Functionality
//! - `PairConfig`: builder-style configuration with validation
//! - `SocketPair::create`: two descriptors over exactly two ring buffers
//!
//! ## Wiring
//! ```text
//!             ┌─────────────┐
//!   A.write ─►│  buffer A→B │─► B.read
//!             └─────────────┘
//!             ┌─────────────┐
//!   B.write ─►│  buffer B→A │─► A.read
//!             └─────────────┘
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - Each buffer is jointly owned by both descriptors through its
//!   handles; there are no strong back-references between descriptors
//! - Capacity applies per buffer, so a pair holds up to 2x capacity
//!
//! ## Last Modified
//! v0.1.0 - Initial pair factory

use tracing::debug;

use softwire_common::types::PeerInfo;

use crate::buffer::RingBuffer;
use crate::error::{Result, TransportError};
use crate::socket::BufferSocket;

// ============================================
// Constants
// ============================================

/// Default per-direction buffer capacity in bytes.
///
/// Large enough for several handshake flights without draining.
pub const DEFAULT_CAPACITY: usize = 1024;

// ============================================
// PairConfig
// ============================================

/// Configuration for creating a socket pair.
///
/// # Example
/// ```
/// use softwire_transport::pair::PairConfig;
/// use softwire_common::types::PeerInfo;
///
/// let config = PairConfig::new(1024)
///     .with_peer_a(PeerInfo::from_host("client.local"))
///     .with_peer_b(PeerInfo::from_host("server.local"));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct PairConfig {
    /// Per-direction ring buffer capacity in bytes.
    pub capacity: usize,
    /// Peer-identity payload for side A.
    pub peer_a: PeerInfo,
    /// Peer-identity payload for side B.
    pub peer_b: PeerInfo,
}

impl PairConfig {
    /// Creates a configuration with the given buffer capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            peer_a: PeerInfo::default(),
            peer_b: PeerInfo::default(),
        }
    }

    /// Sets side A's peer-identity payload.
    #[must_use]
    pub fn with_peer_a(mut self, peer_a: PeerInfo) -> Self {
        self.peer_a = peer_a;
        self
    }

    /// Sets side B's peer-identity payload.
    #[must_use]
    pub fn with_peer_b(mut self, peer_b: PeerInfo) -> Self {
        self.peer_b = peer_b;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    /// Returns `InvalidCapacity` if the capacity is zero.
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(TransportError::invalid_capacity(self.capacity));
        }
        Ok(())
    }
}

impl Default for PairConfig {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ============================================
// SocketPair
// ============================================

/// Factory for cross-wired descriptor pairs.
pub struct SocketPair;

impl SocketPair {
    /// Creates two paired descriptors sharing two ring buffers.
    ///
    /// Bytes written to the first descriptor become readable from the
    /// second in the same order, and vice versa.
    ///
    /// # Errors
    /// Returns `InvalidCapacity` if `capacity` is zero.
    pub fn create(
        capacity: usize,
        peer_a: PeerInfo,
        peer_b: PeerInfo,
    ) -> Result<(BufferSocket, BufferSocket)> {
        Self::from_config(&PairConfig {
            capacity,
            peer_a,
            peer_b,
        })
    }

    /// Creates a pair from a validated configuration.
    ///
    /// # Errors
    /// Returns `InvalidCapacity` if the configured capacity is zero.
    pub fn from_config(config: &PairConfig) -> Result<(BufferSocket, BufferSocket)> {
        config.validate()?;

        let a_to_b = RingBuffer::new(config.capacity)?;
        let b_to_a = RingBuffer::new(config.capacity)?;

        // A reads what B writes and writes what B reads.
        let side_a = BufferSocket::new(b_to_a.clone(), a_to_b.clone(), config.peer_a.clone())?;
        let side_b = BufferSocket::new(a_to_b, b_to_a, config.peer_b.clone())?;

        debug!(capacity = config.capacity, "created socket pair");
        Ok((side_a, side_b))
    }
}

// ============================================
// Tests
// ============================================
