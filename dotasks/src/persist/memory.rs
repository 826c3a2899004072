//! In-memory [`TaskStorage`] for tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use dotasks_proto::codec::{self, CodecError};
use dotasks_proto::task::{Task, TaskDocument};
use parking_lot::Mutex;

use super::{StorageError, TaskStorage};

/// Storage backed by a byte buffer, with write counting and failure
/// injection. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStorage {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    contents: Mutex<Option<Vec<u8>>>,
    writes: AtomicUsize,
    failing: AtomicBool,
}

impl InMemoryStorage {
    /// Creates storage with no document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates storage pre-filled with raw document bytes.
    #[must_use]
    pub fn with_contents(bytes: Vec<u8>) -> Self {
        let storage = Self::default();
        *storage.inner.contents.lock() = Some(bytes);
        storage
    }

    /// Number of successful saves.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.inner.writes.load(Ordering::SeqCst)
    }

    /// Raw bytes of the stored document.
    #[must_use]
    pub fn contents(&self) -> Option<Vec<u8>> {
        self.inner.contents.lock().clone()
    }

    /// The stored document, if present and decodable.
    #[must_use]
    pub fn document(&self) -> Option<TaskDocument> {
        self.contents().and_then(|bytes| codec::decode(&bytes).ok())
    }

    /// Makes subsequent saves fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.inner.failing.store(failing, Ordering::SeqCst);
    }
}

impl TaskStorage for InMemoryStorage {
    async fn load(&self) -> Result<Vec<Task>, StorageError> {
        let Some(bytes) = self.contents() else {
            return Err(StorageError::NotFound("in-memory document".to_string()));
        };
        match codec::decode(&bytes) {
            Ok(document) => Ok(document.tasks),
            Err(CodecError::Empty) => Err(StorageError::Empty),
            Err(err) => Err(StorageError::Corrupt(err.to_string())),
        }
    }

    async fn save(&self, document: &TaskDocument) -> Result<(), StorageError> {
        if self.inner.failing.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("simulated write failure".to_string()));
        }
        let bytes = codec::encode(document).map_err(|e| StorageError::Corrupt(e.to_string()))?;
        *self.inner.contents.lock() = Some(bytes);
        self.inner.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
