//! Chunked input reader.
//!
//! Streams the input in fixed-size chunks without loading it into memory.
//! The caller tracks file offsets.

use crate::error::{LoftError, Result};
use std::io::{ErrorKind, Read};

/// Allocate a zeroed byte buffer, reporting failure instead of aborting.
pub(crate) fn try_alloc(what: &'static str, len: usize) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| LoftError::Allocation {
            what,
            requested: len,
        })?;
    buf.resize(len, 0);
    Ok(buf)
}

/// Reads a stream in chunks of at most `chunk_size` bytes.
pub struct ChunkedReader<R: Read> {
    reader: R,
    buf: Vec<u8>,
}

impl<R: Read> ChunkedReader<R> {
    /// Create a reader with a chunk buffer of `chunk_size` bytes.
    pub fn new(reader: R, chunk_size: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(LoftError::InvalidConfig(
                "chunk size must be at least 1 byte".to_string(),
            ));
        }
        Ok(Self {
            reader,
            buf: try_alloc("chunk buffer", chunk_size)?,
        })
    }

    /// Read the next chunk. An empty slice means end of input.
    ///
    /// Interrupted reads are retried; any other I/O error is fatal.
    pub fn read_chunk(&mut self) -> Result<&[u8]> {
        let n = loop {
            match self.reader.read(&mut self.buf) {
                Ok(n) => break n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(LoftError::Read(e)),
            }
        };
        Ok(&self.buf[..n])
    }
}
