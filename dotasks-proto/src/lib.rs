//! Persisted data model for the doTasks task document.

pub mod codec;
pub mod task;
