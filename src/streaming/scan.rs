//! Record-boundary scanning.
//!
//! Every `\n` at file offset `p` produces the entry `p + 1`: the offset where
//! the next record begins. A terminator in the last byte of the file yields
//! an offset one past end-of-file, which marks the boundary and is kept.

use crate::error::{LoftError, Result};
use crate::streaming::IndexBuffer;
use memchr::memchr_iter;

/// Record terminator byte.
pub const TERMINATOR: u8 = b'\n';

/// Scan one chunk starting at file offset `running_offset`.
///
/// Each discovered offset is appended to `index`. When an entry does not fit
/// in the remaining space, `on_full` is called first so the buffer can be
/// flushed; if it still does not fit afterwards the append fails with
/// `CapacityOverrun`.
///
/// Returns the running offset after the chunk: `running_offset + chunk.len()`.
/// Fails with `OffsetOverflow` if that sum does not fit in a `u64`.
#[inline]
pub fn scan_chunk<F>(
    chunk: &[u8],
    running_offset: u64,
    index: &mut IndexBuffer,
    mut on_full: F,
) -> Result<u64>
where
    F: FnMut(&mut IndexBuffer) -> Result<()>,
{
    // Every record start in the chunk is at most `end`.
    let end = running_offset
        .checked_add(chunk.len() as u64)
        .ok_or(LoftError::OffsetOverflow {
            offset: running_offset,
            len: chunk.len(),
        })?;
    let mut itoa_buf = itoa::Buffer::new();

    for pos in memchr_iter(TERMINATOR, chunk) {
        let record_start = running_offset + pos as u64 + 1;
        let digits = itoa_buf.format(record_start).as_bytes();

        if digits.len() + 1 > index.remaining() {
            on_full(index)?;
        }
        index.push_entry(digits)?;
    }

    Ok(end)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan_all(data: &[u8], capacity: usize) -> (Vec<u8>, u64) {
        let mut index = IndexBuffer::with_capacity(capacity).unwrap();
        let mut out = Vec::new();
        let end = scan_chunk(data, 0, &mut index, |buf| {
            out.extend_from_slice(buf.as_bytes());
            buf.clear();
            Ok(())
        })
        .unwrap();
        out.extend_from_slice(index.as_bytes());
        (out, end)
    }

    #[test]
    fn test_scan_basic() {
        let (out, end) = scan_all(b"A\nBB\nCCC", 64);
        assert_eq!(out, b"2,5,");
        assert_eq!(end, 8);
    }

    #[test]
    fn test_scan_trailing_terminator() {
        let (out, _) = scan_all(b"A\n", 64);
        assert_eq!(out, b"2,");
    }

    #[test]
    fn test_scan_no_terminators() {
        let (out, end) = scan_all(b"ABCDEFG", 64);
        assert!(out.is_empty());
        assert_eq!(end, 7);
    }

    #[test]
    fn test_scan_running_offset() {
        let mut index = IndexBuffer::with_capacity(64).unwrap();
        let end = scan_chunk(b"x\ny\n", 1000, &mut index, |_| Ok(())).unwrap();
        assert_eq!(end, 1004);
        assert_eq!(index.as_bytes(), b"1002,1004,");
    }

    #[test]
    fn test_scan_flushes_before_overrun() {
        // Four bytes fit "12," but not "12,15,"
        let data = b"aaaaaaaaaaa\naa\na\n";
        let (out, _) = scan_all(data, 4);
        assert_eq!(out, b"12,15,17,");
    }

    #[test]
    fn test_on_full_is_called_before_append() {
        let mut index = IndexBuffer::with_capacity(3).unwrap();
        let mut calls = Vec::new();
        scan_chunk(b"\n\n\n", 0, &mut index, |buf| {
            calls.push(buf.as_bytes().to_vec());
            buf.clear();
            Ok(())
        })
        .unwrap();
        assert_eq!(calls, vec![b"1,".to_vec(), b"2,".to_vec()]);
        assert_eq!(index.as_bytes(), b"3,");
        assert!(index.peak() <= index.capacity());
    }

    #[test]
    fn test_entry_wider_than_capacity() {
        let mut index = IndexBuffer::with_capacity(2).unwrap();
        let err = scan_chunk(b"0123456789\n", 0, &mut index, |buf| {
            buf.clear();
            Ok(())
        })
        .unwrap_err();
        assert!(matches!(
            err,
            LoftError::CapacityOverrun {
                needed: 3,
                capacity: 2
            }
        ));
    }

    #[test]
    fn test_running_offset_overflow() {
        let mut index = IndexBuffer::with_capacity(64).unwrap();
        let err = scan_chunk(b"ab\n", u64::MAX - 1, &mut index, |_| Ok(())).unwrap_err();
        assert!(matches!(err, LoftError::OffsetOverflow { len: 3, .. }));
        assert!(index.is_empty());
    }
}
