//! Reassembly of separator-delimited records from arbitrarily chunked bytes.

use crate::position::PositionTracker;
use crate::sink::{Emitter, RecordSink};
use bytes::BytesMut;

/// Outcome of one bounded [`Reassembler::process`] pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    /// The pending buffer is empty.
    Drained,
    /// Bytes remain; the caller should yield and run another pass.
    Continue,
}

/// Splits ingested bytes into records on a single-byte separator.
///
/// Bytes that have been read but not scanned wait in the pending buffer.
/// Bytes scanned since the last separator form the partial record, which
/// survives across passes and ingest calls until its separator arrives.
/// A trailing partial record is never emitted on its own.
#[derive(Debug)]
pub struct Reassembler {
    separator: u8,
    chunk_size: usize,
    pending: BytesMut,
    partial: Vec<u8>,
}

impl Reassembler {
    pub fn new(separator: u8, chunk_size: usize) -> Self {
        Self {
            separator,
            chunk_size: chunk_size.max(1),
            pending: BytesMut::new(),
            partial: Vec::new(),
        }
    }

    /// Queue bytes for scanning. Returns `true` if a pass is now owed.
    pub fn ingest(&mut self, bytes: &[u8]) -> bool {
        self.pending.extend_from_slice(bytes);
        !self.pending.is_empty()
    }

    /// Scan at most one chunk of the pending buffer.
    ///
    /// Every completed record goes to `emitter` before any byte after its
    /// separator is scanned, and `position` advances by exactly the number
    /// of bytes scanned.
    pub fn process<S: RecordSink>(
        &mut self,
        position: &mut PositionTracker,
        emitter: &mut Emitter<S>,
    ) -> Pass {
        let take = self.pending.len().min(self.chunk_size);
        let taken = self.pending.split_to(take);
        let mut chunk = &taken[..];

        while !chunk.is_empty() {
            match chunk.iter().position(|&b| b == self.separator) {
                Some(idx) => {
                    self.partial.extend_from_slice(&chunk[..idx]);
                    position.advance(idx as u64 + 1);
                    let record = std::mem::take(&mut self.partial);
                    emitter.emit(decode_record(record));
                    chunk = &chunk[idx + 1..];
                }
                None => {
                    self.partial.extend_from_slice(chunk);
                    position.advance(chunk.len() as u64);
                    chunk = &[];
                }
            }
        }

        if self.pending.is_empty() {
            Pass::Drained
        } else {
            Pass::Continue
        }
    }

    /// Bytes ingested but not yet scanned.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Bytes scanned since the last separator.
    pub fn partial(&self) -> &[u8] {
        &self.partial
    }

    pub fn separator(&self) -> u8 {
        self.separator
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }
}

fn decode_record(bytes: Vec<u8>) -> String {
    String::from_utf8(bytes)
        .unwrap_or_else(|err| String::from_utf8_lossy(err.as_bytes()).into_owned())
}
