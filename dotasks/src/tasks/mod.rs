//! The task list store.
//!
//! [`TaskListStore`] is the only mutator of the task list. It enforces the
//! list invariants (unique ids, status inside the palette, bounded length),
//! runs the selection-mode and edit-focus state machines, and notifies
//! subscribers with an immutable [`Snapshot`] after each mutation.

pub mod store;

pub use store::{
    Change, Snapshot, StoreEvent, StoreLimits, SubscriptionId, TaskListStore, normalize_tasks,
};

use thiserror::Error;

/// Errors that can occur during task operations.
///
/// Every error leaves the store unchanged.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaskError {
    /// Task with the given ID was not found.
    #[error("task not found: {0}")]
    TaskNotFound(String),
    /// The operation requires selection mode.
    #[error("selection mode is not active")]
    SelectionInactive,
    /// The operation is not allowed while selection mode is active.
    #[error("not allowed while selection mode is active")]
    SelectionActive,
    /// A reorder did not name exactly the current set of task ids.
    #[error("new order does not match the current tasks: {0}")]
    OrderMismatch(String),
}
