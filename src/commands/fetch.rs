//! Random access to records through an offset index.
//!
//! Seeks straight to the first requested record instead of re-scanning the
//! file from the start.

use crate::error::{LoftError, Result};
use crate::index::OffsetIndex;
use crate::streaming::buffers::FETCH_BUFFER;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;
use tracing::debug;

/// Fetch command: copy records `[record, record + count)` to an output.
#[derive(Debug, Clone)]
pub struct FetchCommand {
    /// First record to copy (0-based)
    pub record: u64,
    /// Number of records to copy
    pub count: u64,
}

impl Default for FetchCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl FetchCommand {
    pub fn new() -> Self {
        Self {
            record: 0,
            count: 1,
        }
    }

    pub fn with_record(mut self, record: u64) -> Self {
        self.record = record;
        self
    }

    pub fn with_count(mut self, count: u64) -> Self {
        self.count = count;
        self
    }

    /// Load `index_path` and fetch from the file at `input_path`.
    pub fn run<P: AsRef<Path>, Q: AsRef<Path>, W: Write>(
        &self,
        input_path: P,
        index_path: Q,
        output: &mut W,
    ) -> Result<u64> {
        let input_path = input_path.as_ref();
        let index = OffsetIndex::from_path(index_path)?;
        let file = File::open(input_path).map_err(|source| LoftError::InputOpen {
            path: input_path.to_path_buf(),
            source,
        })?;
        self.run_reader(file, &index, output)
    }

    /// Fetch from any seekable reader. Returns the number of bytes copied.
    pub fn run_reader<R: Read + Seek, W: Write>(
        &self,
        mut reader: R,
        index: &OffsetIndex,
        output: &mut W,
    ) -> Result<u64> {
        let file_len = reader.seek(SeekFrom::End(0)).map_err(LoftError::Read)?;
        let records = index.record_count(file_len);

        if self.count == 0 {
            return Ok(0);
        }
        let last = self.record.saturating_add(self.count - 1);
        if last >= records {
            return Err(LoftError::RecordOutOfRange {
                record: last,
                records,
            });
        }

        let (start, _) = index
            .record_span(self.record, file_len)
            .ok_or(LoftError::RecordOutOfRange {
                record: self.record,
                records,
            })?;
        let (_, end) = index
            .record_span(last, file_len)
            .ok_or(LoftError::RecordOutOfRange {
                record: last,
                records,
            })?;

        debug!(start, end, records = self.count, "fetching records");
        reader
            .seek(SeekFrom::Start(start))
            .map_err(LoftError::Read)?;

        let mut limited = reader.take(end - start);
        let mut buf = vec![0u8; FETCH_BUFFER.min((end - start) as usize).max(1)];
        let mut copied = 0u64;
        loop {
            let n = match limited.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(LoftError::Read(e)),
            };
            output.write_all(&buf[..n]).map_err(LoftError::Write)?;
            copied += n as u64;
        }
        output.flush().map_err(LoftError::Write)?;
        Ok(copied)
    }
}
