//! Fixed-capacity text accumulator for serialized offsets.
//!
//! The buffer is allocated once and never grows. Every append is bounds
//! checked against the remaining space, so the used length can never pass
//! the capacity; callers flush when an entry does not fit.

use crate::error::{LoftError, Result};
use crate::streaming::reader::try_alloc;

/// Comma-separated offset text waiting to be flushed.
pub struct IndexBuffer {
    storage: Vec<u8>,
    len: usize,
    peak: usize,
    entries: u64,
}

impl IndexBuffer {
    /// Allocate a buffer holding at most `capacity` bytes of text.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        Ok(Self {
            storage: try_alloc("index buffer", capacity)?,
            len: 0,
            peak: 0,
            entries: 0,
        })
    }

    /// Append `digits` followed by a comma.
    ///
    /// Fails with [`LoftError::CapacityOverrun`] when the entry does not fit
    /// in the remaining space; nothing is written in that case.
    #[inline]
    pub fn push_entry(&mut self, digits: &[u8]) -> Result<()> {
        let needed = digits.len() + 1;
        if needed > self.remaining() {
            return Err(LoftError::CapacityOverrun {
                needed,
                capacity: self.capacity(),
            });
        }
        let end = self.len + digits.len();
        self.storage[self.len..end].copy_from_slice(digits);
        self.storage[end] = b',';
        self.len = end + 1;
        self.peak = self.peak.max(self.len);
        self.entries += 1;
        Ok(())
    }

    /// Bytes that can still be appended before a flush is required.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.storage.len() - self.len
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The used portion of the buffer.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.storage[..self.len]
    }

    /// Logically empty the buffer. Storage is kept for reuse.
    #[inline]
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Largest used length observed since creation.
    pub fn peak(&self) -> usize {
        self.peak
    }

    /// Entries appended since creation; not reset by [`clear`](Self::clear).
    pub fn entries(&self) -> u64 {
        self.entries
    }
}
