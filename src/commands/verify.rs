//! Check an offset index against the file it claims to describe.
//!
//! The input is re-indexed in memory and compared entry by entry, so a stale
//! index (file edited after indexing) or a truncated index is caught before
//! it is used for seeking.

use crate::commands::index::IndexCommand;
use crate::error::{LoftError, Result};
use crate::index::OffsetIndex;
use std::path::Path;

/// Verify command.
#[derive(Debug, Clone, Default)]
pub struct VerifyCommand {
    /// Settings used for the re-scan
    pub index: IndexCommand,
}

impl VerifyCommand {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_index_command(mut self, index: IndexCommand) -> Self {
        self.index = index;
        self
    }

    /// Verify the index file at `index_path` against `input_path`.
    ///
    /// Returns the number of offsets checked.
    pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(&self, input_path: P, index_path: Q) -> Result<usize> {
        let expected = OffsetIndex::from_path(index_path)?;
        let mut rescanned = Vec::new();
        self.index.run_to(input_path, &mut rescanned)?;
        let actual = OffsetIndex::from_bytes(&rescanned)?;
        compare(&expected, &actual)
    }
}

/// Compare a stored index with a freshly built one.
pub fn compare(stored: &OffsetIndex, fresh: &OffsetIndex) -> Result<usize> {
    let stored = stored.offsets();
    let fresh = fresh.offsets();

    if let Some(i) = stored.iter().zip(fresh).position(|(a, b)| a != b) {
        return Err(LoftError::IndexMismatch(format!(
            "entry {}: index has {}, input has {}",
            i, stored[i], fresh[i]
        )));
    }

    if stored.len() != fresh.len() {
        return Err(LoftError::IndexMismatch(format!(
            "index has {} entries, input has {}",
            stored.len(),
            fresh.len()
        )));
    }

    Ok(stored.len())
}
