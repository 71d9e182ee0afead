// ============================================
// File: crates/softwire-transport/src/lib.rs
// ============================================
//! # Softwire Transport - In-Memory Socket Emulation
//!
//! ## Creation Reason
//! Provides a virtual, in-memory duplex transport that reproduces the
//! partial-I/O, would-block and shutdown semantics of a real non-blocking
//! socket through a pair of fixed-capacity ring buffers - deterministic,
//! single-process, no OS sockets involved.
//!
//! ## Main Functionality
//!
//! ### Buffer Module ([`buffer`])
//! - `RingBuffer`: fixed-capacity FIFO byte store with shared ownership
//!
//! ### Socket Module ([`socket`])
//! - `BufferSocket`: pseudo-socket descriptor with non-blocking
//!   read/write/shutdown/close semantics
//!
//! ### Pair Module ([`pair`])
//! - `SocketPair` / `PairConfig`: the only place cross-wiring of two
//!   descriptors over two shared buffers is established
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │             softwire-session                        │
//! │                    │                                │
//! │                    ▼                                │
//! │             softwire-transport  ◄── You are here   │
//! │                    │                                │
//! │                    ▼                                │
//! │             softwire-common                         │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ordering Guarantee
//! Bytes written by one side become visible to the paired side only after
//! the write call returns, and only in the order written - FIFO, no
//! reordering, no partial-byte corruption across buffer wraparound.
//!
//! ## ⚠️ Important Note for Next Developer
//! - "Non-blocking" means calls return immediately with a would-block
//!   signal; there is no suspension primitive anywhere in this crate
//! - Every operation returns an explicit `Result`; there is no global
//!   last-error state to query
//!
//! ## Last Modified
//! v0.1.0 - Initial implementation

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod buffer;
pub mod error;
pub mod pair;
pub mod socket;

// Re-export commonly used items
pub use buffer::RingBuffer;
pub use error::{Result, TransportError};
pub use pair::{PairConfig, SocketPair, DEFAULT_CAPACITY};
pub use socket::BufferSocket;
