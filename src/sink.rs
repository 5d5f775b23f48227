//! Delivery of completed records to the subscriber.

use crate::config::EmissionMode;
use crate::error::Result;
use std::collections::VecDeque;
use tokio::sync::mpsc;

/// The single subscriber receiving completed records in file order.
///
/// Any `FnMut(String)` closure is a sink.
pub trait RecordSink {
    fn emit(&mut self, record: String);
}

impl<F> RecordSink for F
where
    F: FnMut(String),
{
    fn emit(&mut self, record: String) {
        self(record)
    }
}

/// Forwards records into the channel behind a [`LogStream`](crate::LogStream).
pub(crate) struct ChannelSink {
    tx: mpsc::UnboundedSender<Result<String>>,
}

impl ChannelSink {
    pub(crate) fn new(tx: mpsc::UnboundedSender<Result<String>>) -> Self {
        Self { tx }
    }
}

impl RecordSink for ChannelSink {
    fn emit(&mut self, record: String) {
        // A dropped receiver means nobody is listening anymore
        let _ = self.tx.send(Ok(record));
    }
}

/// Wraps the subscriber with the configured [`EmissionMode`].
///
/// In synchronous mode [`emit`](Self::emit) calls the sink immediately. In
/// deferred mode records wait in completion order until
/// [`release`](Self::release) runs after the current pass.
pub struct Emitter<S> {
    sink: S,
    mode: EmissionMode,
    deferred: VecDeque<String>,
}

impl<S: RecordSink> Emitter<S> {
    pub fn new(sink: S, mode: EmissionMode) -> Self {
        Self {
            sink,
            mode,
            deferred: VecDeque::new(),
        }
    }

    pub fn emit(&mut self, record: String) {
        match self.mode {
            EmissionMode::Synchronous => self.sink.emit(record),
            EmissionMode::Deferred => self.deferred.push_back(record),
        }
    }

    /// Deliver every queued record, oldest first. Returns how many were delivered.
    pub fn release(&mut self) -> usize {
        let released = self.deferred.len();
        while let Some(record) = self.deferred.pop_front() {
            self.sink.emit(record);
        }
        released
    }

    /// Records completed but not yet delivered.
    pub fn queued(&self) -> usize {
        self.deferred.len()
    }

    pub fn mode(&self) -> EmissionMode {
        self.mode
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}
