// ============================================
// File: crates/softwire-session/src/version.rs
// ============================================
//! # Protocol Versioning
//!
//! ## Creation Reason
//! Manages negotiable secure-transport protocol versions so that two
//! sessions with different configured ranges can agree on a common one.
//!
//! ## Main Functionality
//! - `ProtocolVersion`: single-byte version identifier
//! - `VersionRange`: inclusive min/max bounds with validation
//! - Range intersection and highest-common-version negotiation
//!
//! ## Versioning Strategy
//! - Single byte version number on the wire
//! - The supported set is contiguous: [`MIN_SUPPORTED_VERSION`] through
//!   [`MAX_SUPPORTED_VERSION`]
//! - Negotiation picks the highest version inside both ranges
//!
//! ## Version History
//! | Value | Name |
//! |-------|------|
//! | 0x01  | v1.0 |
//! | 0x02  | v1.1 |
//! | 0x03  | v1.2 |
//! | 0x04  | v1.3 |
//!
//! ## ⚠️ Important Note for Next Developer
//! - ALWAYS keep the supported set contiguous; range logic assumes it
//! - The negotiated version is only meaningful after handshake completion
//!
//! ## Last Modified
//! v0.1.0 - Initial version definitions

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SessionError};

// ============================================
// Constants
// ============================================

/// Minimum supported protocol version (v1.0).
pub const MIN_SUPPORTED_VERSION: u8 = 0x01;

/// Maximum supported protocol version (v1.3).
pub const MAX_SUPPORTED_VERSION: u8 = 0x04;

// ============================================
// ProtocolVersion
// ============================================

/// Protocol version identifier.
///
/// # Example
/// ```
/// use softwire_session::version::ProtocolVersion;
///
/// assert!(ProtocolVersion::V1_2.is_supported());
/// assert!(!ProtocolVersion::new(0).is_supported());
/// assert!(ProtocolVersion::V1_1 < ProtocolVersion::V1_3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProtocolVersion(u8);

impl ProtocolVersion {
    /// Protocol version 1.0.
    pub const V1_0: Self = Self(0x01);
    /// Protocol version 1.1.
    pub const V1_1: Self = Self(0x02);
    /// Protocol version 1.2.
    pub const V1_2: Self = Self(0x03);
    /// Protocol version 1.3.
    pub const V1_3: Self = Self(0x04);

    /// Creates a protocol version from its wire value.
    #[must_use]
    pub const fn new(version: u8) -> Self {
        Self(version)
    }

    /// Returns the raw wire value.
    #[must_use]
    pub const fn as_u8(&self) -> u8 {
        self.0
    }

    /// Checks if this version is in the supported set.
    #[must_use]
    pub const fn is_supported(&self) -> bool {
        self.0 >= MIN_SUPPORTED_VERSION && self.0 <= MAX_SUPPORTED_VERSION
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_supported() {
            write!(f, "v1.{}", self.0 - MIN_SUPPORTED_VERSION)
        } else {
            write!(f, "unknown(0x{:02x})", self.0)
        }
    }
}

impl From<u8> for ProtocolVersion {
    fn from(version: u8) -> Self {
        Self(version)
    }
}

impl From<ProtocolVersion> for u8 {
    fn from(version: ProtocolVersion) -> Self {
        version.0
    }
}

// ============================================
// VersionRange
// ============================================

/// Inclusive range of negotiable protocol versions.
///
/// # Invariants
/// - `min <= max`
/// - both bounds are inside the supported set
///
/// Both are enforced at construction, so a `VersionRange` value is
/// always internally consistent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRange {
    min: ProtocolVersion,
    max: ProtocolVersion,
}

impl VersionRange {
    /// Creates a validated version range.
    ///
    /// # Errors
    /// Returns `InvalidRange` if `min > max` or either bound is outside
    /// the supported set.
    pub fn new(min: ProtocolVersion, max: ProtocolVersion) -> Result<Self> {
        if min > max || !min.is_supported() || !max.is_supported() {
            return Err(SessionError::InvalidRange { min, max });
        }
        Ok(Self { min, max })
    }

    /// Returns the full supported range.
    #[must_use]
    pub const fn supported() -> Self {
        Self {
            min: ProtocolVersion::new(MIN_SUPPORTED_VERSION),
            max: ProtocolVersion::new(MAX_SUPPORTED_VERSION),
        }
    }

    /// Returns the minimum bound.
    #[must_use]
    pub const fn min(&self) -> ProtocolVersion {
        self.min
    }

    /// Returns the maximum bound.
    #[must_use]
    pub const fn max(&self) -> ProtocolVersion {
        self.max
    }

    /// Returns `true` if `version` lies within this range.
    #[must_use]
    pub fn contains(&self, version: ProtocolVersion) -> bool {
        self.min <= version && version <= self.max
    }

    /// Returns the overlap of two ranges, if any.
    #[must_use]
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        let min = self.min.max(other.min);
        let max = self.max.min(other.max);
        (min <= max).then_some(Self { min, max })
    }

    /// Negotiates the highest version common to both ranges.
    ///
    /// Returns `None` when the ranges are disjoint, which a handshake
    /// must treat as a fatal negotiation failure.
    #[must_use]
    pub fn negotiate(&self, other: &Self) -> Option<ProtocolVersion> {
        self.intersect(other).map(|overlap| overlap.max)
    }
}

impl Default for VersionRange {
    fn default() -> Self {
        Self::supported()
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

// ============================================
// Tests
// ============================================
