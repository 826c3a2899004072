//! Persistence for the task list.
//!
//! The whole list is stored as one JSON document. [`TaskStorage`] is the
//! read/write seam, [`JsonFileStorage`] the on-disk implementation and
//! [`InMemoryStorage`] the test double. [`DebouncedWriter`] coalesces bursts
//! of save requests into a single write, and [`load_or_reset`] turns any
//! read failure into a freshly written default document.

pub mod file;
pub mod memory;
pub mod writer;

pub use file::JsonFileStorage;
pub use memory::InMemoryStorage;
pub use writer::{DebouncedWriter, PersistWarning, SaveScheduler};

use dotasks_proto::task::{Task, TaskDocument};

use crate::tasks::{StoreLimits, normalize_tasks};

/// Errors that can occur while reading or writing the task document.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// No document exists yet.
    #[error("document not found: {0}")]
    NotFound(String),

    /// The document exists but is blank.
    #[error("document is empty")]
    Empty,

    /// The document does not match the expected shape.
    #[error("document is corrupt: {0}")]
    Corrupt(String),

    /// An I/O operation failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing store refused the operation.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Read/write access to the persisted task document.
pub trait TaskStorage: Send + Sync {
    /// Read the stored task list in display order.
    fn load(&self) -> impl std::future::Future<Output = Result<Vec<Task>, StorageError>> + Send;

    /// Replace the stored document.
    fn save(
        &self,
        document: &TaskDocument,
    ) -> impl std::future::Future<Output = Result<(), StorageError>> + Send;
}

/// Loads the stored list, falling back to `defaults` on any read error.
///
/// On fallback the defaults are written back immediately so the next launch
/// finds a valid document. A failed reset write is logged and otherwise
/// ignored. Loaded tasks are normalized against `limits`.
pub async fn load_or_reset<S: TaskStorage>(
    storage: &S,
    limits: StoreLimits,
    defaults: Vec<Task>,
) -> Vec<Task> {
    match storage.load().await {
        Ok(tasks) => {
            let tasks = normalize_tasks(limits, tasks);
            tracing::info!(count = tasks.len(), "task list loaded");
            tasks
        }
        Err(err) => {
            if matches!(err, StorageError::NotFound(_)) {
                tracing::info!(error = %err, "no stored task list, starting fresh");
            } else {
                tracing::warn!(error = %err, "stored task list unreadable, resetting");
            }
            let defaults = normalize_tasks(limits, defaults);
            if let Err(err) = storage.save(&TaskDocument::new(defaults.clone())).await {
                tracing::warn!(error = %err, "could not write default task list");
            }
            defaults
        }
    }
}

/// The two example tasks seeded on first launch when enabled in config.
#[must_use]
pub fn default_examples() -> Vec<Task> {
    vec![
        Task::with_fields("1", "Buy groceries", 0),
        Task::with_fields("2", "Walk the dog", 1),
    ]
}
