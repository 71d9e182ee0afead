// ============================================
// File: crates/softwire-session/src/lib.rs
// ============================================
//! # Softwire Session Layer
//!
//! ## Creation Reason
//! Provides the security layer over the softwire transport: protocol
//! version negotiation, the secure-session adapter around a
//! pseudo-socket descriptor, and the driver loop that alternates two
//! in-memory sessions through a complete handshake.
//!
//! ## Main Functionality
//! - **Versioning**: single-byte protocol versions and negotiable ranges
//! - **Engine**: the negotiation seam plus a built-in wire engine
//! - **Session**: configuration, handshake stepping, data-plane access
//! - **Driver**: alternating loop with fatal-error attribution
//!
//! ## Architecture
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                driver                        │
//! │   alternates force_handshake_step() calls    │
//! └───────────────┬──────────────┬───────────────┘
//!                 │              │
//!        ┌────────▼───────┐ ┌────▼───────────┐
//!        │ SecureSession  │ │ SecureSession  │
//!        │  (client role) │ │  (server role) │
//!        └────────┬───────┘ └────┬───────────┘
//!                 │ engine steps │
//!        ┌────────▼──────────────▼───────────┐
//!        │     softwire-transport pair       │
//!        │  (two cross-wired ring buffers)   │
//!        └───────────────────────────────────┘
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - Everything here is non-blocking: a step that cannot progress
//!   returns the transport's would-block sentinel, never parks a thread
//! - The built-in engine negotiates versions and identity presentation
//!   but performs no cryptography
//!
//! ## Last Modified
//! v0.1.0 - Initial session layer

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod driver;
pub mod engine;
pub mod error;
pub mod session;
pub mod version;

// Re-export primary types
pub use driver::{drive_handshake, drive_handshake_bounded, HandshakeReport, DEFAULT_ROUND_CEILING};
pub use engine::{
    MessageType, NegotiationEngine, WireEngine, MAX_CERTIFICATE_SIZE, MAX_HOSTNAME_SIZE,
};
pub use error::{Result, SessionError};
pub use session::{SecureSession, SecurityStatus, ServerIdentity, SessionConfig};
pub use version::{
    ProtocolVersion, VersionRange, MAX_SUPPORTED_VERSION, MIN_SUPPORTED_VERSION,
};
