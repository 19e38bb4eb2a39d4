//! Streaming building blocks for the indexing pipeline.
//!
//! This module provides the pieces the `index` command is assembled from:
//! - Chunked reading with fallible buffer allocation
//! - Terminator scanning with itoa offset encoding
//! - A fixed-capacity index buffer with per-append bounds checks
//! - The output flusher
//!
//! Memory is O(chunk size + index buffer capacity), independent of file size.

pub mod buffers;
pub mod index_buffer;
pub mod output;
pub mod reader;
pub mod scan;

pub use index_buffer::IndexBuffer;
pub use output::OffsetWriter;
pub use reader::ChunkedReader;
pub use scan::{scan_chunk, TERMINATOR};
