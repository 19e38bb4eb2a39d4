//! Buffer size constants for the indexing pipeline.
//!
//! These constants control memory usage vs I/O throughput tradeoffs.

/// Default bytes read per I/O call (0x32000 = 200 KiB).
pub const DEFAULT_CHUNK_SIZE: usize = 0x32000;

/// Default index buffer capacity (10 MB of offset text between flushes).
pub const DEFAULT_INDEX_CAPACITY: usize = 10_000_000;

/// Low-memory index buffer capacity (256 KB).
pub const LOW_MEMORY_INDEX_CAPACITY: usize = 256 * 1024;

/// Widest encoded entry: `u64::MAX` is 20 decimal digits, plus the comma.
pub const MAX_ENCODED_OFFSET: usize = 20 + 1;

/// Buffer size for copying records out in `fetch`.
pub const FETCH_BUFFER: usize = 256 * 1024;

/// Returns the index buffer capacity based on the low_memory flag.
#[inline]
pub const fn index_capacity(low_memory: bool) -> usize {
    if low_memory {
        LOW_MEMORY_INDEX_CAPACITY
    } else {
        DEFAULT_INDEX_CAPACITY
    }
}
