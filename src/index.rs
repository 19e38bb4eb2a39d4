//! Loading an offset index back for random record access.

use crate::error::{LoftError, Result};
use std::fs;
use std::path::Path;

/// Record boundaries loaded from an index file.
///
/// Entry `k` is the file offset where record `k + 1` begins; record 0 always
/// begins at offset 0.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OffsetIndex {
    offsets: Vec<u64>,
}

impl OffsetIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self {
            offsets: Vec::new(),
        }
    }

    /// Build an index from already-known offsets.
    ///
    /// Offsets must be strictly increasing.
    pub fn from_offsets(offsets: Vec<u64>) -> Result<Self> {
        if let Some(i) = offsets.windows(2).position(|w| w[0] >= w[1]) {
            return Err(LoftError::Parse {
                position: i + 1,
                message: format!(
                    "offset {} does not increase on {}",
                    offsets[i + 1],
                    offsets[i]
                ),
            });
        }
        Ok(Self { offsets })
    }

    /// Load an index file written by the `index` command.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| LoftError::InputOpen {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(&bytes)
    }

    /// Parse `o1,o2,...,oN,` text. The trailing comma is optional.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut offsets = Vec::with_capacity(bytes.len() / 8);
        let mut current: u64 = 0;
        let mut digits = 0usize;

        for (pos, &b) in bytes.iter().enumerate() {
            match b {
                b'0'..=b'9' => {
                    current = current
                        .checked_mul(10)
                        .and_then(|n| n.checked_add((b - b'0') as u64))
                        .ok_or_else(|| LoftError::Parse {
                            position: pos,
                            message: "offset overflows u64".to_string(),
                        })?;
                    digits += 1;
                }
                b',' => {
                    if digits == 0 {
                        return Err(LoftError::Parse {
                            position: pos,
                            message: "empty field".to_string(),
                        });
                    }
                    push_increasing(&mut offsets, current, pos)?;
                    current = 0;
                    digits = 0;
                }
                _ => {
                    return Err(LoftError::Parse {
                        position: pos,
                        message: format!("unexpected byte 0x{:02x}", b),
                    });
                }
            }
        }

        if digits > 0 {
            push_increasing(&mut offsets, current, bytes.len())?;
        }

        Ok(Self { offsets })
    }

    /// Number of offsets in the index.
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    pub fn offsets(&self) -> &[u64] {
        &self.offsets
    }

    /// Start offset of `record`, or None past the last indexed boundary.
    #[inline]
    pub fn record_start(&self, record: u64) -> Option<u64> {
        if record == 0 {
            return Some(0);
        }
        self.offsets.get((record - 1) as usize).copied()
    }

    /// Byte range `[start, end)` of `record` in a file of `file_len` bytes.
    ///
    /// A boundary at `file_len` (file ends with a terminator) does not start
    /// a record, so it is never returned as one.
    pub fn record_span(&self, record: u64, file_len: u64) -> Option<(u64, u64)> {
        let start = self.record_start(record)?;
        if start >= file_len {
            return None;
        }
        let end = self
            .offsets
            .get(record as usize)
            .copied()
            .unwrap_or(file_len)
            .min(file_len);
        Some((start, end))
    }

    /// Number of records addressable in a file of `file_len` bytes.
    pub fn record_count(&self, file_len: u64) -> u64 {
        if file_len == 0 {
            return 0;
        }
        let inside = self.offsets.partition_point(|&o| o < file_len) as u64;
        inside + 1
    }
}

fn push_increasing(offsets: &mut Vec<u64>, value: u64, pos: usize) -> Result<()> {
    if let Some(&last) = offsets.last() {
        if value <= last {
            return Err(LoftError::Parse {
                position: pos,
                message: format!("offset {} does not increase on {}", value, last),
            });
        }
    }
    offsets.push(value);
    Ok(())
}
