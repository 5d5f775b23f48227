//! Bounded byte-range reads against the followed file.

use crate::error::Result;
use crate::scheduler::ReadRange;
use bytes::{Bytes, BytesMut};
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeekExt, Take};

/// Current size of the file, or `None` if it does not exist.
pub(crate) async fn stat_size(file_path: &Path) -> Result<Option<u64>> {
    match tokio::fs::metadata(file_path).await {
        Ok(metadata) => Ok(Some(metadata.len())),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// An open read over `[start, end)` that yields bytes in file order.
///
/// Reaching end of file before `end` closes the range early; the file may
/// have been truncated underneath us.
pub(crate) struct RangeReader {
    inner: Take<File>,
    buf: BytesMut,
    chunk_size: usize,
}

impl RangeReader {
    pub(crate) async fn open(
        file_path: &Path,
        range: ReadRange,
        chunk_size: usize,
    ) -> Result<Self> {
        let mut file = File::open(file_path).await?;
        file.seek(std::io::SeekFrom::Start(range.start)).await?;

        let limit = match range.end {
            Some(end) => end.saturating_sub(range.start),
            None => u64::MAX,
        };

        Ok(Self {
            inner: file.take(limit),
            buf: BytesMut::with_capacity(chunk_size),
            chunk_size,
        })
    }

    /// Next run of bytes, or `None` once the range is exhausted.
    pub(crate) async fn next_chunk(&mut self) -> Result<Option<Bytes>> {
        read_chunk(&mut self.inner, &mut self.buf, self.chunk_size).await
    }
}

async fn read_chunk<R>(
    reader: &mut R,
    buf: &mut BytesMut,
    chunk_size: usize,
) -> Result<Option<Bytes>>
where
    R: AsyncRead + Unpin,
{
    buf.clear();
    buf.reserve(chunk_size);
    let n = reader.take(chunk_size as u64).read_buf(buf).await?;
    if n == 0 {
        return Ok(None);
    }
    Ok(Some(buf.split().freeze()))
}

/// Detect if the file was truncated by comparing current size with the cursor
pub(crate) fn detect_file_truncation(current_size: u64, position: u64) -> bool {
    current_size < position
}

/// Calculate bytes to read based on current size and cursor
pub(crate) fn calculate_bytes_to_read(current_size: u64, position: u64) -> Option<u64> {
    if current_size <= position {
        None
    } else {
        Some(current_size - position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::TempLogFile;

    async fn read_all(reader: &mut RangeReader) -> Vec<u8> {
        let mut out = Vec::new();
        while let Some(chunk) = reader.next_chunk().await.unwrap() {
            out.extend_from_slice(&chunk);
        }
        out
    }

    #[tokio::test]
    async fn test_stat_size_existing_file() {
        let temp_file = TempLogFile::with_bytes(b"0123456789").unwrap();
        let size = stat_size(temp_file.path()).await.unwrap();
        assert_eq!(size, Some(10));
    }

    #[tokio::test]
    async fn test_stat_size_missing_file() {
        let temp_file = TempLogFile::new().unwrap();
        let missing = temp_file.path().with_file_name("nonexistent.log");
        assert_eq!(stat_size(&missing).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_bounded_range() {
        let temp_file = TempLogFile::with_bytes(b"0123456789").unwrap();
        let range = ReadRange {
            start: 2,
            end: Some(7),
        };
        let mut reader = RangeReader::open(temp_file.path(), range, 2).await.unwrap();

        let first = reader.next_chunk().await.unwrap().unwrap();
        assert_eq!(&first[..], b"23");
        assert_eq!(read_all(&mut reader).await, b"456");
        assert!(reader.next_chunk().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_open_ended_range_reads_to_eof() {
        let temp_file = TempLogFile::with_bytes(b"abc\ndef\n").unwrap();
        let range = ReadRange {
            start: 4,
            end: None,
        };
        let mut reader = RangeReader::open(temp_file.path(), range, 64).await.unwrap();
        assert_eq!(read_all(&mut reader).await, b"def\n");
    }

    #[tokio::test]
    async fn test_range_past_truncated_end_closes_early() {
        let temp_file = TempLogFile::with_bytes(b"short").unwrap();
        let range = ReadRange {
            start: 0,
            end: Some(500),
        };
        let mut reader = RangeReader::open(temp_file.path(), range, 64).await.unwrap();
        assert_eq!(read_all(&mut reader).await, b"short");
    }

    #[tokio::test]
    async fn test_open_missing_file_is_io_error() {
        let temp_file = TempLogFile::new().unwrap();
        let missing = temp_file.path().with_file_name("nonexistent.log");
        let range = ReadRange { start: 0, end: None };

        let result = RangeReader::open(&missing, range, 64).await;
        assert!(matches!(result, Err(crate::error::Error::Io(_))));
    }

    #[test]
    fn test_detect_file_truncation() {
        assert!(detect_file_truncation(100, 200)); // File was truncated
        assert!(!detect_file_truncation(200, 100)); // File grew
        assert!(!detect_file_truncation(100, 100)); // No change
        assert!(detect_file_truncation(0, 1));
        assert!(!detect_file_truncation(0, 0));
    }

    #[test]
    fn test_calculate_bytes_to_read() {
        assert_eq!(calculate_bytes_to_read(200, 100), Some(100));
        assert_eq!(calculate_bytes_to_read(100, 100), None);
        assert_eq!(calculate_bytes_to_read(50, 100), None);
        assert_eq!(calculate_bytes_to_read(0, 0), None);
        assert_eq!(calculate_bytes_to_read(u64::MAX, u64::MAX - 1), Some(1));
    }
}
