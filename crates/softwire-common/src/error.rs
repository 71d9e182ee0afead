// ============================================
// File: crates/softwire-common/src/error.rs
// ============================================
//! # Common Error Types
//!
//! ## Creation Reason
//! Provides foundational error types and result aliases used across
//! all softwire crates, enabling consistent error handling.
//!
//! ## Main Functionality
//! - `CommonError`: Base error enum for common operations
//! - `Result<T>`: Type alias using `CommonError`
//! - Error conversion traits for interoperability
//!
//! ## Design Philosophy
//! - Use `thiserror` for ergonomic error definitions
//! - Each crate may define its own error types that wrap `CommonError`
//! - Every fallible operation returns an explicit `Result`; there is no
//!   process-global "last error" state anywhere in the workspace
//!
//! ## ⚠️ Important Note for Next Developer
//! - Keep error variants specific but not too granular
//! - Implement `From` traits for seamless error propagation
//!
//! ## Last Modified
//! v0.1.0 - Initial error definitions

use thiserror::Error;

// ============================================
// Result Type Alias
// ============================================

/// Common result type for operations that may fail.
pub type Result<T> = std::result::Result<T, CommonError>;

// ============================================
// CommonError
// ============================================

/// Common error types shared across softwire crates.
///
/// # Categories
/// - **Validation**: Input validation failures
/// - **State**: Operations attempted in an invalid state
/// - **Internal**: Unexpected internal conditions
///
/// # Example
/// ```
/// use softwire_common::error::{CommonError, Result};
///
/// fn validate_input(data: &[u8]) -> Result<()> {
///     if data.is_empty() {
///         return Err(CommonError::invalid_input("data", "cannot be empty"));
///     }
///     Ok(())
/// }
/// ```
#[derive(Error, Debug)]
pub enum CommonError {
    // ========================================
    // Validation Errors
    // ========================================

    /// Invalid input data provided.
    #[error("Invalid input for '{field}': {reason}")]
    InvalidInput {
        /// Name of the field or parameter
        field: String,
        /// Description of what's wrong
        reason: String,
    },

    /// Data length doesn't match expected size.
    #[error("Invalid length: expected {expected}, got {actual}")]
    InvalidLength {
        /// Expected length in bytes
        expected: usize,
        /// Actual length received
        actual: usize,
    },

    /// Value is out of acceptable range.
    #[error("Value out of range: {value} not in [{min}, {max}]")]
    OutOfRange {
        /// The value that was out of range
        value: String,
        /// Minimum acceptable value
        min: String,
        /// Maximum acceptable value
        max: String,
    },

    // ========================================
    // State Errors
    // ========================================

    /// Operation not valid in current state.
    #[error("Invalid state: expected {expected}, found {current}")]
    InvalidState {
        /// Expected state
        expected: String,
        /// Current state
        current: String,
    },

    // ========================================
    // Internal Errors
    // ========================================

    /// Internal error (bug or unexpected condition).
    #[error("Internal error: {message}")]
    Internal {
        /// Description of what went wrong
        message: String,
    },
}

impl CommonError {
    // ========================================
    // Convenience Constructors
    // ========================================

    /// Creates an `InvalidInput` error.
    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Creates an `InvalidLength` error.
    #[must_use]
    pub const fn invalid_length(expected: usize, actual: usize) -> Self {
        Self::InvalidLength { expected, actual }
    }

    /// Creates an `OutOfRange` error.
    pub fn out_of_range(
        value: impl ToString,
        min: impl ToString,
        max: impl ToString,
    ) -> Self {
        Self::OutOfRange {
            value: value.to_string(),
            min: min.to_string(),
            max: max.to_string(),
        }
    }

    /// Creates an `InvalidState` error.
    pub fn invalid_state(expected: impl Into<String>, current: impl Into<String>) -> Self {
        Self::InvalidState {
            expected: expected.into(),
            current: current.into(),
        }
    }

    /// Creates an `Internal` error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    // ========================================
    // Error Classification
    // ========================================

    /// Returns `true` if this error indicates a caller mistake.
    ///
    /// Client errors are caused by invalid input or requests,
    /// not by internal issues.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput { .. }
                | Self::InvalidLength { .. }
                | Self::OutOfRange { .. }
                | Self::InvalidState { .. }
        )
    }

    /// Returns `true` if this error indicates an internal bug.
    #[must_use]
    pub const fn is_internal_error(&self) -> bool {
        matches!(self, Self::Internal { .. })
    }
}

// ============================================
// Tests
// ============================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CommonError::invalid_input("peer_info", "exceeds maximum size");
        assert!(err.to_string().contains("peer_info"));
        assert!(err.to_string().contains("maximum size"));

        let err = CommonError::invalid_length(16, 4);
        assert!(err.to_string().contains("16"));
        assert!(err.to_string().contains('4'));
    }

    #[test]
    fn test_error_classification() {
        let client_err = CommonError::invalid_input("field", "bad");
        assert!(client_err.is_client_error());
        assert!(!client_err.is_internal_error());

        let internal_err = CommonError::internal("bug");
        assert!(internal_err.is_internal_error());
        assert!(!internal_err.is_client_error());
    }

    #[test]
    fn test_out_of_range_display() {
        let err = CommonError::out_of_range(9, 1, 4);
        assert!(err.to_string().contains('9'));
        assert!(err.to_string().contains("[1, 4]"));
    }
}
