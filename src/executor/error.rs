//! Task manager error types.

use super::types::TaskId;

/// Errors returned by [`TaskManager`](super::manager::TaskManager) operations.
///
/// A failing executable is not an error here: it ends as a `Failed` task
/// with the failure text in its `result`.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TaskError {
    /// The task type is empty or has no registered factory.
    #[error("unknown task type: {0:?}")]
    UnknownType(String),

    /// A freshly generated ID collided with an existing task.
    #[error("task already exists: {0}")]
    AlreadyExists(TaskId),

    /// The type already has as many pending/running tasks as its queue holds.
    #[error("task queue limit reached for type {task_type:?} (capacity {capacity})")]
    QueueLimitReached { task_type: String, capacity: usize },

    /// No task with this ID is registered.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The task is running and cannot be removed.
    #[error("task in progress: {0}")]
    InProgress(TaskId),

    /// The secure random source failed. Not recoverable.
    #[error("failed to generate secure task ID: {0}")]
    IdGeneration(String),
}

impl TaskError {
    /// True for environment faults that indicate the process cannot continue normally.
    pub fn is_fatal(&self) -> bool {
        matches!(self, TaskError::IdGeneration(_))
    }
}
