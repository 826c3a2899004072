//! Debounced, failure-tolerant writes of the task document.
//!
//! A single background task owns the storage. Each
//! [`schedule`](SaveScheduler::schedule) replaces the pending document and
//! restarts the quiet period; the document is written once no new request
//! has arrived for the configured delay. [`flush`](DebouncedWriter::flush)
//! forces the pending write immediately.
//!
//! If a write fails:
//! 1. The error is logged via `tracing::warn!`.
//! 2. A [`PersistWarning`] is emitted on a bounded channel (dropped if full).
//! 3. The document is retained. The next [`flush`](DebouncedWriter::flush)
//!    or shutdown writes it again, unless a newer schedule replaced it first.
//!    A failed document is never retried on the timer alone.

use std::time::Duration;

use dotasks_proto::task::TaskDocument;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::TaskStorage;

/// Warning emitted when the task document could not be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistWarning {
    /// A write of the task document failed.
    WriteFailed {
        /// Number of tasks in the document that could not be written.
        tasks: usize,
        /// Description of the error.
        reason: String,
    },
}

impl std::fmt::Display for PersistWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WriteFailed { reason, .. } => write!(f, "could not save tasks: {reason}"),
        }
    }
}

enum Command {
    Schedule(TaskDocument),
    Flush(oneshot::Sender<bool>),
    Shutdown(oneshot::Sender<()>),
}

/// Cloneable handle for requesting saves, usable from store subscribers.
#[derive(Debug, Clone)]
pub struct SaveScheduler {
    tx: mpsc::UnboundedSender<Command>,
}

impl SaveScheduler {
    /// Replaces the pending document and restarts the delay.
    ///
    /// Returns `false` if the writer has shut down.
    pub fn schedule(&self, document: TaskDocument) -> bool {
        self.tx.send(Command::Schedule(document)).is_ok()
    }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Schedule(doc) => write!(f, "Schedule({} tasks)", doc.tasks.len()),
            Self::Flush(_) => f.write_str("Flush"),
            Self::Shutdown(_) => f.write_str("Shutdown"),
        }
    }
}

/// Owner of the background write task.
#[derive(Debug)]
pub struct DebouncedWriter {
    scheduler: SaveScheduler,
    handle: JoinHandle<()>,
}

impl DebouncedWriter {
    /// Starts the write task.
    ///
    /// Returns the writer and a receiver for [`PersistWarning`] events that
    /// the UI can consume. Must be called within a tokio runtime.
    #[must_use]
    pub fn spawn<S>(
        storage: S,
        delay: Duration,
        warning_buffer: usize,
    ) -> (Self, mpsc::Receiver<PersistWarning>)
    where
        S: TaskStorage + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let (warning_tx, warning_rx) = mpsc::channel(warning_buffer.max(1));
        let handle = tokio::spawn(run(storage, delay, rx, warning_tx));
        let writer = Self {
            scheduler: SaveScheduler { tx },
            handle,
        };
        (writer, warning_rx)
    }

    /// A handle for scheduling saves.
    #[must_use]
    pub fn scheduler(&self) -> SaveScheduler {
        self.scheduler.clone()
    }

    /// Replaces the pending document and restarts the delay.
    pub fn schedule(&self, document: TaskDocument) -> bool {
        self.scheduler.schedule(document)
    }

    /// Writes the pending document now, if any, and waits for it.
    ///
    /// Returns `true` when nothing was pending or the write succeeded.
    pub async fn flush(&self) -> bool {
        let (reply_tx, reply_rx) = oneshot::channel();
        if self.scheduler.tx.send(Command::Flush(reply_tx)).is_err() {
            return false;
        }
        reply_rx.await.unwrap_or(false)
    }

    /// Flushes the pending document and stops the write task.
    pub async fn shutdown(self) {
        let (reply_tx, reply_rx) = oneshot::channel();
        if self.scheduler.tx.send(Command::Shutdown(reply_tx)).is_ok() {
            let _ = reply_rx.await;
        }
        if let Err(err) = self.handle.await {
            tracing::warn!(error = %err, "task writer ended abnormally");
        }
    }
}

async fn run<S: TaskStorage>(
    storage: S,
    delay: Duration,
    mut rx: mpsc::UnboundedReceiver<Command>,
    warnings: mpsc::Sender<PersistWarning>,
) {
    let mut slots = Slots::default();
    let mut deadline = Instant::now();

    loop {
        tokio::select! {
            biased;

            cmd = rx.recv() => match cmd {
                Some(Command::Schedule(document)) => {
                    slots.pending = Some(document);
                    slots.retained = None;
                    deadline = Instant::now() + delay;
                }
                Some(Command::Flush(reply)) => {
                    let ok = write_next(&storage, &mut slots, &warnings).await;
                    let _ = reply.send(ok);
                }
                Some(Command::Shutdown(reply)) => {
                    write_next(&storage, &mut slots, &warnings).await;
                    let _ = reply.send(());
                    break;
                }
                None => {
                    write_next(&storage, &mut slots, &warnings).await;
                    break;
                }
            },

            () = tokio::time::sleep_until(deadline), if slots.pending.is_some() => {
                write_next(&storage, &mut slots, &warnings).await;
            }
        }
    }

    if let Some(document) = slots.retained {
        tracing::warn!(tasks = document.tasks.len(), "task writer stopped with unsaved list");
    } else {
        tracing::debug!("task writer stopped");
    }
}

/// Documents waiting to be written.
#[derive(Default)]
struct Slots {
    /// Scheduled and waiting for the quiet period.
    pending: Option<TaskDocument>,
    /// Last document whose write failed.
    retained: Option<TaskDocument>,
}

/// Writes the pending document, or else the retained one.
///
/// Returns `true` when there was nothing to write or the write succeeded.
async fn write_next<S: TaskStorage>(
    storage: &S,
    slots: &mut Slots,
    warnings: &mpsc::Sender<PersistWarning>,
) -> bool {
    let Some(document) = slots.pending.take().or_else(|| slots.retained.take()) else {
        return true;
    };
    match storage.save(&document).await {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(
                tasks = document.tasks.len(),
                error = %err,
                "task save failed, list kept in memory"
            );
            let _ = warnings.try_send(PersistWarning::WriteFailed {
                tasks: document.tasks.len(),
                reason: err.to_string(),
            });
            slots.retained = Some(document);
            false
        }
    }
}
