//! File-backed [`TaskStorage`].

use std::path::{Path, PathBuf};

use dotasks_proto::codec::{self, CodecError};
use dotasks_proto::task::{Task, TaskDocument};

use super::{StorageError, TaskStorage};

/// Stores the task document as a single JSON file.
///
/// Saves go through a sibling `.tmp` file that is renamed over the target,
/// so a crash mid-write leaves the previous document intact.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    /// Storage at an explicit file path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Storage for `file_name` inside `dir`.
    #[must_use]
    pub fn in_dir(dir: impl AsRef<Path>, file_name: &str) -> Self {
        Self::new(dir.as_ref().join(file_name))
    }

    /// Path of the document.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl TaskStorage for JsonFileStorage {
    async fn load(&self) -> Result<Vec<Task>, StorageError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(self.path.display().to_string()));
            }
            Err(e) => return Err(StorageError::Io(e)),
        };
        match codec::decode(&bytes) {
            Ok(document) => Ok(document.tasks),
            Err(CodecError::Empty) => Err(StorageError::Empty),
            Err(err) => Err(StorageError::Corrupt(err.to_string())),
        }
    }

    async fn save(&self, document: &TaskDocument) -> Result<(), StorageError> {
        let bytes = codec::encode(document).map_err(|e| StorageError::Corrupt(e.to_string()))?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let temp = self.temp_path();
        tokio::fs::write(&temp, &bytes).await?;
        tokio::fs::rename(&temp, &self.path).await?;
        tracing::debug!(
            path = %self.path.display(),
            tasks = document.tasks.len(),
            "task document written"
        );
        Ok(())
    }
}
