// ============================================
// File: crates/softwire-transport/src/buffer.rs
// ============================================
//! # Byte Ring Buffer
//!
//! ## Creation Reason
//! Provides the fixed-capacity circular byte store that backs every
//! pseudo-socket descriptor. Each buffer carries bytes in exactly one
//! direction between the two sides of a pair.
//!
//! ## Main Functionality
//! - `RingBuffer`: cloneable handle to a shared circular byte store
//! - Partial, never-blocking writes: stores as many leading bytes as fit
//! - FIFO reads: bytes come out in the exact order they went in,
//!   including across wraparound of the physical storage
//!
//! ## Ownership Model
//! A buffer is jointly owned by the two descriptors of a pair. Handles
//! are reference-counted (`Arc`), so the storage is released exactly once,
//! only after both owners are gone. Use-after-free and double-free are
//! unrepresentable by construction.
//!
//! ## ⚠️ Important Note for Next Developer
//! - `write` returning less than `data.len()` is normal backpressure,
//!   not an error; callers must handle partial acceptance
//! - The mutex makes each read/write an atomic critical section, which
//!   a multi-threaded embedding relies on
//!
//! ## Last Modified
//! v0.1.0 - Initial ring buffer implementation

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::trace;

use crate::error::{Result, TransportError};

// ============================================
// RingState
// ============================================

/// Interior state of a ring buffer: storage plus circular cursors.
struct RingState {
    /// Physical byte storage, length equals capacity.
    storage: Vec<u8>,
    /// Index of the oldest unread byte.
    read_pos: usize,
    /// Number of occupied bytes. Invariant: `occupied <= storage.len()`.
    occupied: usize,
}

impl RingState {
    fn write(&mut self, data: &[u8]) -> usize {
        let capacity = self.storage.len();
        let free = capacity - self.occupied;
        let count = data.len().min(free);

        let mut write_pos = (self.read_pos + self.occupied) % capacity;
        for &byte in &data[..count] {
            self.storage[write_pos] = byte;
            write_pos = (write_pos + 1) % capacity;
        }
        self.occupied += count;
        count
    }

    fn read(&mut self, max: usize) -> Vec<u8> {
        let capacity = self.storage.len();
        let count = max.min(self.occupied);

        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            out.push(self.storage[self.read_pos]);
            self.read_pos = (self.read_pos + 1) % capacity;
        }
        self.occupied -= count;
        out
    }
}

// ============================================
// RingBuffer
// ============================================

/// Cloneable handle to a fixed-capacity FIFO byte buffer.
///
/// # Semantics
/// - `write` accepts as many leading bytes as fit and returns the count;
///   it never blocks and never fails for "full"
/// - `read` removes and returns up to the requested number of bytes in
///   FIFO order; an empty result is not an error
///
/// # Example
/// ```
/// use softwire_transport::buffer::RingBuffer;
///
/// let buf = RingBuffer::new(4).unwrap();
/// assert_eq!(buf.write(b"hello"), 4); // only 4 fit
/// assert_eq!(buf.read(2), b"he");
/// assert_eq!(buf.write(b"lo"), 2);    // space freed by the read
/// assert_eq!(buf.read(10), b"lllo");
/// ```
#[derive(Clone)]
pub struct RingBuffer {
    shared: Arc<Mutex<RingState>>,
    capacity: usize,
}

impl RingBuffer {
    /// Creates a ring buffer with the given capacity in bytes.
    ///
    /// # Errors
    /// Returns `InvalidCapacity` if `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(TransportError::invalid_capacity(capacity));
        }
        trace!(capacity, "creating ring buffer");
        Ok(Self {
            shared: Arc::new(Mutex::new(RingState {
                storage: vec![0u8; capacity],
                read_pos: 0,
                occupied: 0,
            })),
            capacity,
        })
    }

    /// Stores as many leading bytes of `data` as fit in the free space.
    ///
    /// Returns the number of bytes actually stored, which may be anywhere
    /// from zero (buffer full) to `data.len()`. Never blocks.
    pub fn write(&self, data: &[u8]) -> usize {
        let count = self.shared.lock().write(data);
        trace!(requested = data.len(), accepted = count, "ring write");
        count
    }

    /// Removes and returns up to `max` bytes from the front, FIFO order.
    ///
    /// Returns an empty vector (not an error) when no data is occupied.
    pub fn read(&self, max: usize) -> Vec<u8> {
        let out = self.shared.lock().read(max);
        trace!(requested = max, returned = out.len(), "ring read");
        out
    }

    /// Returns the fixed capacity in bytes.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of occupied (unread) bytes.
    #[must_use]
    pub fn occupied(&self) -> usize {
        self.shared.lock().occupied
    }

    /// Returns the number of free bytes.
    #[must_use]
    pub fn free_space(&self) -> usize {
        self.capacity - self.occupied()
    }

    /// Returns `true` if no unread bytes are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.occupied() == 0
    }

    /// Returns `true` if two handles reference the same underlying buffer.
    ///
    /// Pairing of two descriptors is defined in terms of this identity.
    #[must_use]
    pub fn same_buffer(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }
}

impl std::fmt::Debug for RingBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RingBuffer")
            .field("capacity", &self.capacity)
            .field("occupied", &self.occupied())
            .finish()
    }
}

// ============================================
// Tests
// ============================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_capacity_rejected() {
        let err = RingBuffer::new(0).unwrap_err();
        assert!(matches!(err, TransportError::InvalidCapacity { capacity: 0 }));
    }

    #[test]
    fn test_empty_read_returns_empty() {
        let buf = RingBuffer::new(8).unwrap();
        assert!(buf.read(8).is_empty());
        assert!(buf.is_empty());
    }

    #[test]
    fn test_write_then_read_fifo() {
        let buf = RingBuffer::new(16).unwrap();
        assert_eq!(buf.write(b"abc"), 3);
        assert_eq!(buf.write(b"def"), 3);
        assert_eq!(buf.read(6), b"abcdef");
    }

    #[test]
    fn test_capacity_limit() {
        // A single oversized write accepts exactly the capacity.
        let buf = RingBuffer::new(10).unwrap();
        assert_eq!(buf.write(&[0x42; 32]), 10);
        // A second immediate write accepts nothing until a read frees space.
        assert_eq!(buf.write(b"x"), 0);
        assert_eq!(buf.read(4).len(), 4);
        assert_eq!(buf.write(b"abcdef"), 4);
    }

    #[test]
    fn test_partial_writes_like_send() {
        // Mirrors a 4-byte chunk written three times into capacity 10:
        // accepted counts are 4, 4, then 2.
        let buf = RingBuffer::new(10).unwrap();
        let info = [0x01, 0x02, 0x03, 0x04];
        assert_eq!(buf.write(&info), 4);
        assert_eq!(buf.write(&info), 4);
        assert_eq!(buf.write(&info), 2);

        let out = buf.read(10);
        assert_eq!(out.len(), 10);
        for (i, byte) in out.iter().enumerate() {
            assert_eq!(*byte, info[i % info.len()]);
        }
    }

    #[test]
    fn test_wraparound_preserves_order() {
        let buf = RingBuffer::new(4).unwrap();
        assert_eq!(buf.write(b"abcd"), 4);
        assert_eq!(buf.read(2), b"ab");
        // This write straddles the physical end of the storage.
        assert_eq!(buf.write(b"ef"), 2);
        assert_eq!(buf.read(4), b"cdef");
    }

    #[test]
    fn test_shared_handles_see_same_bytes() {
        let writer = RingBuffer::new(8).unwrap();
        let reader = writer.clone();
        assert!(writer.same_buffer(&reader));

        assert_eq!(writer.write(b"ping"), 4);
        assert_eq!(reader.read(4), b"ping");

        let unrelated = RingBuffer::new(8).unwrap();
        assert!(!writer.same_buffer(&unrelated));
    }

    #[test]
    fn test_occupancy_accounting() {
        let buf = RingBuffer::new(8).unwrap();
        assert_eq!(buf.free_space(), 8);
        buf.write(b"abcde");
        assert_eq!(buf.occupied(), 5);
        assert_eq!(buf.free_space(), 3);
        buf.read(2);
        assert_eq!(buf.occupied(), 3);
        assert_eq!(buf.free_space(), 5);
    }
}
