//! Output flusher for the offset index.
//!
//! Persists the used portion of an [`IndexBuffer`] and clears it. Writes go
//! straight to the sink; the index buffer already batches them.

use crate::error::{LoftError, Result};
use crate::streaming::IndexBuffer;
use std::io::Write;
use tracing::debug;

/// Appends flushed index text to an output stream.
pub struct OffsetWriter<W: Write> {
    writer: W,
    flushes: u64,
    bytes_written: u64,
}

impl<W: Write> OffsetWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            flushes: 0,
            bytes_written: 0,
        }
    }

    /// Write exactly the used bytes of `index`, then clear it.
    pub fn flush(&mut self, index: &mut IndexBuffer) -> Result<()> {
        let text = index.as_bytes();
        self.writer.write_all(text).map_err(LoftError::Write)?;
        self.bytes_written += text.len() as u64;
        self.flushes += 1;
        debug!(
            flush = self.flushes,
            bytes = text.len(),
            total = self.bytes_written,
            "flushed index buffer"
        );
        index.clear();
        Ok(())
    }

    /// Flush the underlying stream and hand it back.
    pub fn finish(mut self) -> Result<W> {
        self.writer.flush().map_err(LoftError::Write)?;
        Ok(self.writer)
    }

    pub fn flushes(&self) -> u64 {
        self.flushes
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }
}
