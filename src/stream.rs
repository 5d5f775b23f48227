//! Wiring: the background follow task and the handles that expose it.

use crate::config::TailOptions;
use crate::error::{Error, Result};
use crate::scheduler::Follower;
use crate::sink::{ChannelSink, RecordSink};
use crate::watcher::{FileWatcher, is_event_relevant_to_file};
use futures::Stream;
use std::path::Path;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// A stream of records appended to a followed file, in file order.
///
/// A read or watcher failure arrives as a single `Err` item, after which the
/// stream ends. Dropping the stream removes the watch.
pub struct LogStream {
    receiver: mpsc::UnboundedReceiver<Result<String>>,
    shutdown_tx: broadcast::Sender<()>,
    task_handle: JoinHandle<()>,
}

impl LogStream {
    /// Starts following `path`. Fails if the file cannot be stat'ed or watched.
    pub async fn new<P: AsRef<Path>>(path: P, options: TailOptions) -> Result<Self> {
        let (tx, rx) = mpsc::unbounded_channel();
        let sink = ChannelSink::new(tx.clone());
        let task = FollowTask::prepare(path.as_ref(), &options, sink).await?;
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        let task_handle = tokio::spawn(async move {
            if let Err(e) = task.run(shutdown_rx).await {
                warn!(error = %e, "follow task stopped");
                let _ = tx.send(Err(e));
            }
        });

        Ok(LogStream {
            receiver: rx,
            shutdown_tx,
            task_handle,
        })
    }

    /// Waits for the next record. Returns [`Error::StreamClosed`] once the
    /// follow task has ended.
    pub async fn next_record(&mut self) -> Result<String> {
        self.receiver.recv().await.unwrap_or(Err(Error::StreamClosed))
    }

    #[cfg(test)]
    pub(crate) fn is_closed(&self) -> bool {
        self.receiver.is_closed()
    }

    #[cfg(test)]
    pub(crate) fn task_abort_handle(&self) -> tokio::task::AbortHandle {
        self.task_handle.abort_handle()
    }
}

impl Drop for LogStream {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(());
    }
}

impl Stream for LogStream {
    type Item = Result<String>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.receiver).poll_recv(cx)
    }
}

/// Handle to a file followed into a caller-supplied [`RecordSink`].
pub struct TailHandle {
    shutdown_tx: broadcast::Sender<()>,
    task_handle: Option<JoinHandle<Result<()>>>,
}

impl TailHandle {
    pub(crate) async fn spawn<S>(path: &Path, options: &TailOptions, sink: S) -> Result<Self>
    where
        S: RecordSink + Send + 'static,
    {
        let task = FollowTask::prepare(path, options, sink).await?;
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let task_handle = tokio::spawn(task.run(shutdown_rx));

        Ok(Self {
            shutdown_tx,
            task_handle: Some(task_handle),
        })
    }

    /// Removes the watch. The task exits at its next wake-up.
    pub fn stop(&self) {
        let _ = self.shutdown_tx.send(());
    }

    /// Waits for the follow task and returns how it ended.
    pub async fn join(mut self) -> Result<()> {
        match self.task_handle.take() {
            Some(handle) => handle.await?,
            None => Ok(()),
        }
    }
}

impl Drop for TailHandle {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(());
    }
}

/// Everything the background task owns.
struct FollowTask<S> {
    follower: Follower<S>,
    watcher: FileWatcher,
    file_name: String,
}

impl<S: RecordSink> FollowTask<S> {
    /// Validates the path, places the cursor and registers the watch.
    ///
    /// The watch goes in before the first read, so nothing appended in
    /// between is missed.
    async fn prepare(path: &Path, options: &TailOptions, sink: S) -> Result<Self> {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .ok_or_else(|| Error::InvalidPath {
                message: format!("{} does not name a file", path.display()),
            })?;

        let follower = Follower::open(path, options, sink).await?;

        let mut watcher = FileWatcher::new(path)?;
        watcher.start_watching()?;

        Ok(Self {
            follower,
            watcher,
            file_name,
        })
    }

    async fn run(mut self, mut shutdown_rx: broadcast::Receiver<()>) -> Result<()> {
        self.follower.catch_up().await?;

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    debug!(cursor = self.follower.position(), "watch removed");
                    break;
                }

                event = self.watcher.next_event() => {
                    match event {
                        Some(Ok(event)) => {
                            if is_event_relevant_to_file(&event, &self.file_name) {
                                self.follower.on_notification().await?;
                            }
                        }
                        Some(Err(e)) => return Err(Error::Watcher(e)),
                        None => break,
                    }
                }
            }
        }

        Ok(())
    }
}
