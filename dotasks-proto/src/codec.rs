//! JSON encoding for the task document.

use crate::task::TaskDocument;

/// Error type for codec encode/decode operations.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The input is empty or only whitespace.
    #[error("document is empty")]
    Empty,
    /// Serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Encodes a [`TaskDocument`] as compact JSON.
///
/// # Errors
///
/// Returns `CodecError::Serialization` if the document cannot be serialized.
pub fn encode(document: &TaskDocument) -> Result<Vec<u8>, CodecError> {
    serde_json::to_vec(document).map_err(|e| CodecError::Serialization(e.to_string()))
}

/// Decodes a [`TaskDocument`] from JSON bytes.
///
/// The input must be an object with a `tasks` array of task records.
///
/// # Errors
///
/// Returns `CodecError::Empty` for blank input, or
/// `CodecError::Serialization` if the bytes do not match the document shape.
pub fn decode(bytes: &[u8]) -> Result<TaskDocument, CodecError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(CodecError::Empty);
    }
    serde_json::from_slice(bytes).map_err(|e| CodecError::Serialization(e.to_string()))
}
