//! Run configuration for the indexing engine.
//!
//! Paths and sizes are passed in explicitly; nothing is read from globals.
//! A path of `-` means standard input (for the input) or standard output
//! (for the output).

use crate::error::{LoftError, Result};
use crate::streaming::buffers::{DEFAULT_CHUNK_SIZE, DEFAULT_INDEX_CAPACITY, MAX_ENCODED_OFFSET};
use std::path::{Path, PathBuf};

/// Everything an indexing run needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexConfig {
    /// File to scan.
    pub input: PathBuf,
    /// File to write the offset list to. Truncated if it exists.
    pub output: PathBuf,
    /// Bytes read per I/O call.
    pub chunk_size: usize,
    /// Bytes of offset text held in memory between flushes.
    pub buffer_capacity: usize,
    /// Memory-map the input instead of reading it.
    pub use_mmap: bool,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("-"),
            output: PathBuf::from("-"),
            chunk_size: DEFAULT_CHUNK_SIZE,
            buffer_capacity: DEFAULT_INDEX_CAPACITY,
            use_mmap: false,
        }
    }
}

impl IndexConfig {
    pub fn new<P: Into<PathBuf>, Q: Into<PathBuf>>(input: P, output: Q) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            ..Default::default()
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }

    pub fn with_mmap(mut self, use_mmap: bool) -> Self {
        self.use_mmap = use_mmap;
        self
    }

    /// Reject values that would make the run fail part-way.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(LoftError::InvalidConfig(
                "chunk size must be at least 1 byte".to_string(),
            ));
        }
        if self.buffer_capacity < MAX_ENCODED_OFFSET {
            return Err(LoftError::InvalidConfig(format!(
                "index buffer must hold at least {} bytes, got {}",
                MAX_ENCODED_OFFSET, self.buffer_capacity
            )));
        }
        if self.use_mmap && is_stdio(&self.input) {
            return Err(LoftError::InvalidConfig(
                "--mmap needs a file path, not stdin".to_string(),
            ));
        }
        Ok(())
    }
}

/// True when `path` is the `-` placeholder for stdin/stdout.
#[inline]
pub fn is_stdio(path: &Path) -> bool {
    path.as_os_str() == "-"
}

/// Byte size parsed from human input (e.g. "200K", "0x32000", "10M").
///
/// Suffixes are binary: K = 1024, M = 1024², G = 1024³.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeSpec {
    pub bytes: usize,
}

impl SizeSpec {
    pub fn from_str(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }

        if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            return usize::from_str_radix(hex, 16)
                .ok()
                .map(|bytes| Self { bytes });
        }

        let upper = s.to_uppercase();
        let (num_part, multiplier) = if let Some(n) = upper.strip_suffix('K') {
            (n, 1usize << 10)
        } else if let Some(n) = upper.strip_suffix('M') {
            (n, 1usize << 20)
        } else if let Some(n) = upper.strip_suffix('G') {
            (n, 1usize << 30)
        } else {
            (upper.as_str(), 1)
        };

        num_part
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_mul(multiplier))
            .map(|bytes| Self { bytes })
    }
}

/// clap value parser for byte sizes.
pub fn parse_size(s: &str) -> std::result::Result<usize, String> {
    SizeSpec::from_str(s)
        .map(|spec| spec.bytes)
        .ok_or_else(|| format!("invalid size '{}'. Use formats like 4096, 200K, 0x32000, 10M", s))
}
