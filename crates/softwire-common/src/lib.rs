// ============================================
// File: crates/softwire-common/src/lib.rs
// ============================================
//! # Softwire Common - Shared Utilities Library
//!
//! ## Creation Reason
//! Provides foundational types and error definitions shared across all
//! softwire crates, ensuring consistency and reducing code duplication.
//!
//! ## Main Functionality
//! - [`types`]: Core type definitions (`Direction`, `Role`, `PeerInfo`)
//! - [`error`]: Common error types and result aliases
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │             softwire-session                        │
//! │                    │                                │
//! │                    ▼                                │
//! │             softwire-transport                      │
//! │                    │                                │
//! │                    ▼                                │
//! │             softwire-common  ◄── You are here      │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dependencies
//! - No internal crate dependencies (leaf node)
//! - Minimal external dependencies for maximum compatibility
//!
//! ## ⚠️ Important Note for Next Developer
//! - This crate is the foundation - changes affect everything
//! - Keep dependencies minimal
//! - All public types should implement standard traits (Debug, Clone, etc.)
//!
//! ## Last Modified
//! v0.1.0 - Initial implementation

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod types;

// Re-export commonly used items at crate root
pub use error::{CommonError, Result};
pub use types::{Direction, PeerInfo, Role};
