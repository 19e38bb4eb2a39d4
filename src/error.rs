//! Error types shared by every LOFT command.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while building, loading, or using an offset index.
///
/// Every variant is fatal: nothing is retried. Output that was flushed before
/// the failure is left on disk.
#[derive(Error, Debug)]
pub enum LoftError {
    #[error("cannot open input {}: {source}", .path.display())]
    InputOpen { path: PathBuf, source: io::Error },

    #[error("cannot create output {}: {source}", .path.display())]
    OutputOpen { path: PathBuf, source: io::Error },

    #[error("cannot allocate {requested} bytes for {what}")]
    Allocation { what: &'static str, requested: usize },

    #[error("read error: {0}")]
    Read(#[source] io::Error),

    #[error("write error: {0}")]
    Write(#[source] io::Error),

    #[error("index buffer overrun: {needed} bytes needed, capacity is {capacity}")]
    CapacityOverrun { needed: usize, capacity: usize },

    #[error("byte offset overflows u64: {len} bytes after offset {offset}")]
    OffsetOverflow { offset: u64, len: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("parse error at byte {position}: {message}")]
    Parse { position: usize, message: String },

    #[error("record {record} out of range (index addresses {records} records)")]
    RecordOutOfRange { record: u64, records: u64 },

    #[error("index does not match input: {0}")]
    IndexMismatch(String),
}

impl LoftError {
    /// Process exit status for this error category.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoftError::InputOpen { .. } => 2,
            LoftError::OutputOpen { .. } => 3,
            LoftError::Allocation { .. } => 4,
            LoftError::Read(_) => 5,
            LoftError::Write(_) => 6,
            LoftError::CapacityOverrun { .. } => 7,
            LoftError::IndexMismatch(_) => 8,
            LoftError::InvalidConfig(_)
            | LoftError::OffsetOverflow { .. }
            | LoftError::Parse { .. }
            | LoftError::RecordOutOfRange { .. } => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, LoftError>;
