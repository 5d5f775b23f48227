//! Deciding which byte ranges to read, and feeding them through reassembly.

use crate::config::TailOptions;
use crate::error::{Error, Result};
use crate::position::PositionTracker;
use crate::reader::{RangeReader, calculate_bytes_to_read, detect_file_truncation, stat_size};
use crate::reassembler::{Pass, Reassembler};
use crate::sink::{Emitter, RecordSink};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Two consecutive observations of the source's size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeChange {
    pub previous: u64,
    pub current: u64,
}

impl SizeChange {
    pub fn is_truncation(&self) -> bool {
        self.current < self.previous
    }
}

/// Half-open byte range `[start, end)`. `end: None` reads to the current end of file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadRange {
    pub start: u64,
    pub end: Option<u64>,
}

/// What to do about a size change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadPlan {
    /// Open this range; the scheduler now considers a read open.
    Open(ReadRange),
    /// A read is already open; the change is coalesced into its re-check.
    Busy,
    /// The cursor already covers the whole file.
    UpToDate,
}

/// Tracks the last observed size and enforces a single open read.
///
/// After every [`close_read`](Self::close_read) the caller re-stats the
/// source and calls [`on_change`](Self::on_change) again, so growth that
/// arrived while a read was open is never dropped.
#[derive(Debug)]
pub struct IngestionScheduler {
    last_size: u64,
    read_open: bool,
}

impl IngestionScheduler {
    pub fn new(initial_size: u64) -> Self {
        Self {
            last_size: initial_size,
            read_open: false,
        }
    }

    /// Record a fresh size observation and pair it with the previous one.
    pub fn observe(&mut self, current: u64) -> SizeChange {
        let change = SizeChange {
            previous: self.last_size,
            current,
        };
        self.last_size = current;
        change
    }

    /// The first read: from the cursor to whatever the end of file is once it runs.
    pub fn initial_read(&mut self, position: &PositionTracker) -> ReadPlan {
        if self.read_open {
            return ReadPlan::Busy;
        }
        self.read_open = true;
        ReadPlan::Open(ReadRange {
            start: position.offset(),
            end: None,
        })
    }

    pub fn on_change(&mut self, change: SizeChange, position: &mut PositionTracker) -> ReadPlan {
        // A shrink below the cursor is a rewrite even if we missed the previous size
        if change.is_truncation() || detect_file_truncation(change.current, position.offset()) {
            debug!(
                previous = change.previous,
                current = change.current,
                cursor = position.offset(),
                "source truncated, resetting cursor"
            );
            position.reset_to_zero();
        }

        if self.read_open {
            trace!(current = change.current, "read already open, coalescing change");
            return ReadPlan::Busy;
        }

        match calculate_bytes_to_read(change.current, position.offset()) {
            Some(_) => {
                self.read_open = true;
                ReadPlan::Open(ReadRange {
                    start: position.offset(),
                    end: Some(change.current),
                })
            }
            None => ReadPlan::UpToDate,
        }
    }

    pub fn close_read(&mut self) {
        self.read_open = false;
    }

    pub fn is_read_open(&self) -> bool {
        self.read_open
    }

    pub fn last_size(&self) -> u64 {
        self.last_size
    }
}

/// Owns the whole pipeline for one followed file.
///
/// Only one task drives a `Follower`, so reads and passes never overlap.
pub(crate) struct Follower<S> {
    path: PathBuf,
    chunk_size: usize,
    position: PositionTracker,
    reassembler: Reassembler,
    emitter: Emitter<S>,
    scheduler: IngestionScheduler,
}

impl<S: RecordSink> Follower<S> {
    /// Stat the source and place the cursor. Fails if the source is unavailable.
    pub(crate) async fn open(path: &Path, options: &TailOptions, sink: S) -> Result<Self> {
        let size = tokio::fs::metadata(path)
            .await
            .map_err(|source| Error::SourceUnavailable {
                path: path.to_path_buf(),
                source,
            })?
            .len();

        let mut position = PositionTracker::default();
        position.set_initial(if options.starts_from_beginning() { 0 } else { size });
        debug!(path = %path.display(), size, cursor = position.offset(), "following source");

        Ok(Self {
            path: path.to_path_buf(),
            chunk_size: options.chunk_size(),
            position,
            reassembler: Reassembler::new(options.separator(), options.chunk_size()),
            emitter: Emitter::new(sink, options.emission_mode()),
            scheduler: IngestionScheduler::new(size),
        })
    }

    /// Read whatever exists past the cursor right now.
    pub(crate) async fn catch_up(&mut self) -> Result<()> {
        let plan = self.scheduler.initial_read(&self.position);
        self.run_plan(plan).await
    }

    /// React to a change notification for the source.
    pub(crate) async fn on_notification(&mut self) -> Result<()> {
        let change = self.observe_size().await?;
        let plan = self.scheduler.on_change(change, &mut self.position);
        self.run_plan(plan).await
    }

    async fn run_plan(&mut self, mut plan: ReadPlan) -> Result<()> {
        while let ReadPlan::Open(range) = plan {
            let ingested = self.ingest_range(range).await;
            self.scheduler.close_read();
            ingested?;

            // Growth that landed while the range was open gets its own read
            let change = self.observe_size().await?;
            plan = self.scheduler.on_change(change, &mut self.position);
        }
        Ok(())
    }

    async fn observe_size(&mut self) -> Result<SizeChange> {
        // A vanished source reads as empty, which registers as a truncation
        let current = stat_size(&self.path).await?.unwrap_or(0);
        Ok(self.scheduler.observe(current))
    }

    async fn ingest_range(&mut self, range: ReadRange) -> Result<()> {
        debug!(start = range.start, end = ?range.end, "opening read");
        let mut reader = match RangeReader::open(&self.path, range, self.chunk_size).await {
            Ok(reader) => reader,
            // Rotated away after the size was observed; the re-stat registers it
            Err(Error::Io(e)) if e.kind() == ErrorKind::NotFound => {
                debug!(start = range.start, "source vanished before read opened");
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        while let Some(bytes) = reader.next_chunk().await? {
            if self.reassembler.ingest(&bytes) {
                self.run_pass().await;
            }
        }

        while self.reassembler.pending_len() > 0 {
            self.run_pass().await;
        }

        trace!(cursor = self.position.offset(), "read closed");
        Ok(())
    }

    async fn run_pass(&mut self) {
        let pass = self.reassembler.process(&mut self.position, &mut self.emitter);
        if pass == Pass::Continue || self.emitter.queued() > 0 {
            tokio::task::yield_now().await;
        }
        self.emitter.release();
    }

    pub(crate) fn position(&self) -> u64 {
        self.position.offset()
    }

    #[cfg(test)]
    pub(crate) fn partial(&self) -> &[u8] {
        self.reassembler.partial()
    }

    #[cfg(test)]
    pub(crate) fn sink(&self) -> &S {
        self.emitter.sink()
    }
}
