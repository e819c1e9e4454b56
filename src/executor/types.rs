use super::error::TaskError;

use chrono::{DateTime, Utc};
use rand::RngCore;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Number of random bytes behind a task ID (rendered as 32 hex characters).
const TASK_ID_BYTES: usize = 16;

/// Unique identifier for a task.
///
/// Drawn from the operating system's CSPRNG and hex-encoded, so IDs are
/// fixed-length and unguessable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct TaskId(pub String);

impl TaskId {
    /// Generates a fresh random TaskId.
    ///
    /// Fails only when the OS entropy source is unavailable, which callers
    /// should treat as an unrecoverable environment fault.
    pub fn generate() -> Result<Self, TaskError> {
        let mut bytes = [0u8; TASK_ID_BYTES];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| TaskError::IdGeneration(e.to_string()))?;

        Ok(Self(hex::encode(bytes)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Lifecycle state of a task.
///
/// Transitions are strictly `Pending -> Running -> (Done | Failed)`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Queued, waiting for its type's worker.
    Pending,
    /// Currently executing on its type's worker.
    Running,
    /// Finished successfully.
    Done,
    /// The executable reported a failure.
    Failed,
}

impl TaskStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskStatus::Done | TaskStatus::Failed)
    }
}

/// A submitted unit of work and its observable lifecycle.
///
/// `id`, `task_type` and `created_at` never change after creation; the rest
/// is written only by the manager and the task's worker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: TaskId,
    #[serde(rename = "type")]
    pub task_type: String,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    /// Elapsed running time, e.g. `"3m12s"`. Absent until the task starts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    /// Outcome message. Absent until the task is terminal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
}

impl Task {
    pub fn new(id: TaskId, task_type: impl Into<String>) -> Self {
        Self {
            id,
            task_type: task_type.into(),
            status: TaskStatus::Pending,
            created_at: Utc::now(),
            duration: None,
            result: None,
        }
    }
}

/// Renders an elapsed time truncated to whole seconds: `0s`, `42s`, `3m0s`, `1h2m3s`.
pub fn format_elapsed(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    if hours > 0 {
        format!("{hours}h{minutes}m{seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m{seconds}s")
    } else {
        format!("{seconds}s")
    }
}
