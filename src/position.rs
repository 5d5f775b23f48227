//! Read cursor into the followed file.

/// Byte offset of everything consumed from the source so far.
///
/// Only moves forward, except for [`reset_to_zero`](Self::reset_to_zero)
/// after a truncation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PositionTracker {
    offset: u64,
}

impl PositionTracker {
    pub fn starting_at(offset: u64) -> Self {
        Self { offset }
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Account for `n` scanned bytes.
    pub fn advance(&mut self, n: u64) {
        self.offset += n;
    }

    pub fn reset_to_zero(&mut self) {
        self.offset = 0;
    }

    /// Place the cursor once, before anything is read.
    pub fn set_initial(&mut self, offset: u64) {
        self.offset = offset;
    }
}
