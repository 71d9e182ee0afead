// ============================================
// File: crates/softwire-transport/src/error.rs
// ============================================
//! # Transport Error Types
//!
//! ## Creation Reason
//! Defines error types specific to the in-memory transport layer:
//! ring buffers, pseudo-socket descriptors and pair construction.
//!
//! ## Main Functionality
//! - `TransportError`: Primary error enum for transport operations
//! - `WouldBlock` as a first-class, identity-checkable variant
//! - Categorization of transient vs. state vs. resource errors
//!
//! ## Error Categories
//! 1. **Transient**: `WouldBlock` - retry after the peer makes progress
//! 2. **State Errors**: closed descriptors, shut-down directions
//! 3. **Resource Errors**: invalid capacity, malformed arguments
//!
//! ## ⚠️ Important Note for Next Developer
//! - `WouldBlock` is the retry signal the handshake driver depends on;
//!   callers check it via `is_would_block()`, never by message text
//! - State errors are caller mistakes and must not be retried
//!
//! ## Last Modified
//! v0.1.0 - Initial error definitions

use thiserror::Error;

use softwire_common::error::CommonError;
use softwire_common::types::Direction;

// ============================================
// Result Type Alias
// ============================================

/// Result type for transport operations.
pub type Result<T> = std::result::Result<T, TransportError>;

// ============================================
// TransportError
// ============================================

/// Transport layer error types.
///
/// # Categories
/// - **Transient**: `WouldBlock` (retryable by design)
/// - **State**: `ClosedDescriptor`, `ShutdownViolation`
/// - **Resource**: `InvalidCapacity`, `InvalidArgument`
#[derive(Error, Debug)]
pub enum TransportError {
    // ========================================
    // Transient Errors
    // ========================================

    /// No data available right now; retry after the peer produces bytes.
    ///
    /// This is the well-known would-block sentinel. It is expected during
    /// handshake negotiation and strict reads on an empty buffer, and is
    /// never a failure by itself.
    #[error("Operation would block: no data available")]
    WouldBlock,

    // ========================================
    // State Errors
    // ========================================

    /// Operation attempted on a closed descriptor.
    #[error("Descriptor is closed: {operation} rejected")]
    ClosedDescriptor {
        /// What operation was attempted
        operation: String,
    },

    /// Operation attempted on a direction that was shut down.
    #[error("Direction '{direction}' is shut down: {operation} rejected")]
    ShutdownViolation {
        /// Which direction is shut down
        direction: Direction,
        /// What operation was attempted
        operation: String,
    },

    // ========================================
    // Resource Errors
    // ========================================

    /// Ring buffer capacity must be nonzero.
    #[error("Invalid buffer capacity: {capacity}")]
    InvalidCapacity {
        /// The rejected capacity
        capacity: usize,
    },

    /// Malformed argument (peer info payload, buffer pairing).
    #[error("Invalid argument for '{field}': {reason}")]
    InvalidArgument {
        /// Name of the offending argument
        field: String,
        /// Why it was rejected
        reason: String,
    },

    // ========================================
    // Wrapped Errors
    // ========================================

    /// Error from common crate.
    #[error(transparent)]
    Common(#[from] CommonError),
}

impl TransportError {
    // ========================================
    // Convenience Constructors
    // ========================================

    /// Creates a `ClosedDescriptor` error.
    pub fn closed(operation: impl Into<String>) -> Self {
        Self::ClosedDescriptor {
            operation: operation.into(),
        }
    }

    /// Creates a `ShutdownViolation` error.
    pub fn shutdown_violation(direction: Direction, operation: impl Into<String>) -> Self {
        Self::ShutdownViolation {
            direction,
            operation: operation.into(),
        }
    }

    /// Creates an `InvalidCapacity` error.
    #[must_use]
    pub const fn invalid_capacity(capacity: usize) -> Self {
        Self::InvalidCapacity { capacity }
    }

    /// Creates an `InvalidArgument` error.
    pub fn invalid_argument(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field: field.into(),
            reason: reason.into(),
        }
    }

    // ========================================
    // Error Classification
    // ========================================

    /// Returns `true` if this is the would-block sentinel.
    ///
    /// Transient by definition: the operation may succeed once the peer
    /// has had a chance to produce bytes or drain the buffer.
    #[must_use]
    pub const fn is_would_block(&self) -> bool {
        matches!(self, Self::WouldBlock)
    }

    /// Returns `true` if this is a state error (closed or shut descriptor).
    ///
    /// State errors indicate caller misuse and must not be retried.
    #[must_use]
    pub const fn is_state_error(&self) -> bool {
        matches!(
            self,
            Self::ClosedDescriptor { .. } | Self::ShutdownViolation { .. }
        )
    }

    /// Returns `true` if this is a construction-time resource error.
    #[must_use]
    pub const fn is_resource_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidCapacity { .. } | Self::InvalidArgument { .. }
        )
    }
}

// ============================================
// Tests
// ============================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_would_block_identity() {
        let err = TransportError::WouldBlock;
        assert!(err.is_would_block());
        assert!(!err.is_state_error());
        assert!(!err.is_resource_error());
    }

    #[test]
    fn test_error_display() {
        let err = TransportError::closed("write");
        assert!(err.to_string().contains("write"));

        let err = TransportError::shutdown_violation(Direction::Write, "write");
        assert!(err.to_string().contains("write"));

        let err = TransportError::invalid_capacity(0);
        assert!(err.to_string().contains('0'));
    }

    #[test]
    fn test_error_classification() {
        assert!(TransportError::closed("read").is_state_error());
        assert!(
            TransportError::shutdown_violation(Direction::Read, "read").is_state_error()
        );
        assert!(TransportError::invalid_capacity(0).is_resource_error());
        assert!(
            TransportError::invalid_argument("peer_info", "too large").is_resource_error()
        );
    }
}
