//! Task Manager
//!
//! Single source of truth for every task in the process. The manager owns the
//! task registry, the factory table, and one [`TypeQueue`] per task type, all
//! behind one reader/writer lock. Workers and duration trackers mutate tasks
//! only through the manager, so a `get_task` snapshot is never torn.

use super::error::TaskError;
use super::queue::TypeQueue;
use super::registry::SharedFactory;
use super::types::*;
use super::worker;

use anyhow::Result;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Default per-type admission limit.
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;
/// Default period between duration updates of a running task, in milliseconds.
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 500;
/// Default period between duration updates of a running task.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(DEFAULT_TICK_INTERVAL_MS);

/// Result text of a task whose executable returned `Ok`.
pub const SUCCESS_RESULT: &str = "Task completed successfully";

#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Maximum pending + running tasks per type.
    pub queue_capacity: usize,
    /// How often a running task's `duration` is refreshed.
    pub tick_interval: Duration,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            tick_interval: DEFAULT_TICK_INTERVAL,
        }
    }
}

#[derive(Default)]
struct ManagerState {
    tasks: HashMap<TaskId, Task>,
    factories: HashMap<String, SharedFactory>,
    queues: HashMap<String, TypeQueue>,
}

pub struct TaskManager {
    state: RwLock<ManagerState>,
    config: ManagerConfig,
}

impl TaskManager {
    pub fn new(config: ManagerConfig) -> Arc<Self> {
        Arc::new(Self {
            state: RwLock::new(ManagerState::default()),
            config,
        })
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Binds `factory` to `task_type`.
    ///
    /// The first registration of a type also creates its queue and spawns its
    /// worker; later registrations only replace the factory. Called outside a
    /// tokio runtime, the worker runs on its own thread.
    pub fn register_factory(self: &Arc<Self>, task_type: &str, factory: SharedFactory) {
        let new_queue = {
            let mut state = self.state.write();
            state.factories.insert(task_type.to_string(), factory);

            if state.queues.contains_key(task_type) {
                None
            } else {
                let queue = TypeQueue::new(self.config.queue_capacity);
                let notify = queue.notifier();
                state.queues.insert(task_type.to_string(), queue);
                Some(notify)
            }
        };

        match new_queue {
            Some(notify) => {
                worker::spawn_worker(self.clone(), task_type.to_string(), notify);
                tracing::info!(
                    "Registered task type '{}' (queue capacity {})",
                    task_type,
                    self.config.queue_capacity
                );
            }
            None => tracing::info!("Replaced factory for task type '{}'", task_type),
        }
    }

    /// Creates a pending task of `task_type` and queues it for its worker.
    ///
    /// The task is visible to `get_task` before this returns.
    pub fn create_task(&self, task_type: &str) -> Result<Task, TaskError> {
        if task_type.is_empty() {
            return Err(TaskError::UnknownType(String::new()));
        }

        let mut state = self.state.write();

        if !state.factories.contains_key(task_type) {
            return Err(TaskError::UnknownType(task_type.to_string()));
        }

        let queue = state
            .queues
            .get(task_type)
            .ok_or_else(|| TaskError::UnknownType(task_type.to_string()))?;

        if queue.is_full() {
            tracing::warn!(
                "Rejecting task of type '{}': {} tasks already active",
                task_type,
                queue.active()
            );
            return Err(TaskError::QueueLimitReached {
                task_type: task_type.to_string(),
                capacity: queue.capacity(),
            });
        }

        let id = TaskId::generate()?;
        if state.tasks.contains_key(&id) {
            return Err(TaskError::AlreadyExists(id));
        }

        let task = Task::new(id.clone(), task_type);
        state.tasks.insert(id.clone(), task.clone());
        if let Some(queue) = state.queues.get_mut(task_type) {
            queue.push(id);
        }

        tracing::info!("Task {} created (type: {})", task.id, task_type);

        Ok(task)
    }

    /// Returns a snapshot of the task's current state.
    pub fn get_task(&self, id: &TaskId) -> Result<Task, TaskError> {
        self.state
            .read()
            .tasks
            .get(id)
            .cloned()
            .ok_or_else(|| TaskError::NotFound(id.clone()))
    }

    /// Removes a task that is not running.
    ///
    /// A pending task is also pulled out of its queue and frees its slot.
    pub fn delete_task(&self, id: &TaskId) -> Result<(), TaskError> {
        let mut state = self.state.write();

        let (status, task_type) = match state.tasks.get(id) {
            Some(task) => (task.status, task.task_type.clone()),
            None => return Err(TaskError::NotFound(id.clone())),
        };

        match status {
            TaskStatus::Running => {
                tracing::warn!("Refusing to delete running task {}", id);
                return Err(TaskError::InProgress(id.clone()));
            }
            TaskStatus::Pending => {
                if let Some(queue) = state.queues.get_mut(&task_type) {
                    queue.remove(id);
                }
            }
            TaskStatus::Done | TaskStatus::Failed => {}
        }

        state.tasks.remove(id);
        tracing::info!("Task {} deleted (was {:?})", id, status);

        Ok(())
    }

    /// Names of all registered task types, sorted.
    pub fn registered_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.state.read().factories.keys().cloned().collect();
        types.sort();
        types
    }

    /// Pending + running tasks of a type (0 for unknown types).
    pub fn active_count(&self, task_type: &str) -> usize {
        self.state
            .read()
            .queues
            .get(task_type)
            .map(|queue| queue.active())
            .unwrap_or(0)
    }

    // --- Worker-side transitions ---

    /// Dequeues the next task of `task_type`, marks it running, and returns a
    /// snapshot together with the factory that should build it.
    pub(super) fn claim_next(&self, task_type: &str) -> Option<(Task, SharedFactory)> {
        let mut state = self.state.write();
        let state = &mut *state;

        let factory = state.factories.get(task_type)?.clone();
        let queue = state.queues.get_mut(task_type)?;

        while let Some(id) = queue.pop() {
            match state.tasks.get_mut(&id) {
                Some(task) if task.status == TaskStatus::Pending => {
                    task.status = TaskStatus::Running;
                    return Some((task.clone(), factory));
                }
                _ => {
                    // Deleted pending tasks leave the queue with their slot, so this is unexpected.
                    tracing::warn!("Skipping stale queue entry {} (type: {})", id, task_type);
                    queue.release();
                }
            }
        }

        None
    }

    /// Publishes the elapsed running time of a task.
    pub(super) fn update_duration(&self, id: &TaskId, elapsed: Duration) {
        let mut state = self.state.write();
        if let Some(task) = state.tasks.get_mut(id) {
            if task.status == TaskStatus::Running {
                task.duration = Some(format_elapsed(elapsed));
            }
        }
    }

    /// Records the outcome of a running task and frees its queue slot.
    pub(super) fn finalize(&self, id: &TaskId, task_type: &str, outcome: Result<()>) {
        let mut state = self.state.write();

        if let Some(task) = state.tasks.get_mut(id) {
            match outcome {
                Ok(()) => {
                    task.status = TaskStatus::Done;
                    task.result = Some(SUCCESS_RESULT.to_string());
                    tracing::info!(
                        "Task {} completed (type: {}, duration: {})",
                        id,
                        task_type,
                        task.duration.as_deref().unwrap_or("0s")
                    );
                }
                Err(e) => {
                    task.status = TaskStatus::Failed;
                    task.result = Some(format!("Task execution failed: {e}"));
                    tracing::warn!("Task {} failed (type: {}): {}", id, task_type, e);
                }
            }
        } else {
            tracing::warn!("Finished task {} is no longer registered", id);
        }

        if let Some(queue) = state.queues.get_mut(task_type) {
            queue.release();
        }
    }
}
