//! Follow a growing file and receive each complete record as it appears.
//!
//! Bytes appended to the file are split on a single-byte separator (a
//! newline unless configured otherwise). Records that span several writes
//! are reassembled before delivery, an unterminated trailing record is held
//! until its separator arrives, and a file that shrinks is read again from
//! the start.
//!
//! # Example
//!
//! ```rust,no_run
//! use log_tail::{TailOptions, watch_log};
//! use tokio_stream::StreamExt;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut stream = watch_log("app.log", TailOptions::default()).await?;
//!
//!     while let Some(record) = stream.next().await {
//!         match record {
//!             Ok(line) => println!("{}", line),
//!             Err(e) => eprintln!("Error: {}", e),
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```

mod config;
mod error;
mod position;
mod reader;
mod reassembler;
mod scheduler;
mod sink;
mod stream;
mod watcher;

#[cfg(test)]
mod test_helpers;

pub use config::{DEFAULT_CHUNK_SIZE, DEFAULT_SEPARATOR, EmissionMode, TailOptions};
pub use error::{Error, Result};
pub use position::PositionTracker;
pub use reassembler::{Pass, Reassembler};
pub use scheduler::{IngestionScheduler, ReadPlan, ReadRange, SizeChange};
pub use sink::{Emitter, RecordSink};
pub use stream::{LogStream, TailHandle};

use std::path::Path;

/// Creates a stream of records appended to `path`.
///
/// Fails immediately if the file cannot be stat'ed or watched.
///
/// # Example
///
/// ```rust,no_run
/// use log_tail::{TailOptions, watch_log};
/// use tokio_stream::StreamExt;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let options = TailOptions::default().from_beginning(true).with_separator("|")?;
///     let mut stream = watch_log("events.log", options).await?;
///
///     while let Some(record) = stream.next().await {
///         println!("record: {}", record?);
///     }
///
///     Ok(())
/// }
/// ```
pub async fn watch_log<P: AsRef<Path>>(path: P, options: TailOptions) -> Result<LogStream> {
    LogStream::new(path, options).await
}

/// Follows `path`, handing each record to `sink` instead of a stream.
///
/// ```rust,no_run
/// use log_tail::{TailOptions, watch_log_with};
///
/// #[tokio::main]
/// async fn main() -> log_tail::Result<()> {
///     let handle = watch_log_with("app.log", TailOptions::default(), |line: String| {
///         println!("{}", line);
///     })
///     .await?;
///
///     handle.join().await
/// }
/// ```
pub async fn watch_log_with<P, S>(path: P, options: TailOptions, sink: S) -> Result<TailHandle>
where
    P: AsRef<Path>,
    S: RecordSink + Send + 'static,
{
    TailHandle::spawn(path.as_ref(), &options, sink).await
}
