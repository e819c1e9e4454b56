//! Per-Type Task Queue
//!
//! Every registered task type owns one bounded FIFO of pending task IDs plus
//! an admission counter. The counter covers both queued and running tasks, so
//! a type can never hold more than `capacity` unfinished tasks.
//!
//! The queue itself is not synchronized: it lives inside the manager's state
//! and is only touched under the manager's lock. Wake-ups for the type's worker
//! go through a shared [`Notify`], which keeps a permit when nobody is waiting,
//! so a push that lands between an empty `pop` and the worker's wait is never lost.

use super::types::TaskId;

use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Notify;

pub struct TypeQueue {
    /// Tasks waiting for the worker, oldest first.
    pending: VecDeque<TaskId>,
    /// Pending + running tasks of this type.
    active: usize,
    /// Admission limit for `active`.
    capacity: usize,
    notify: Arc<Notify>,
}

impl TypeQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            pending: VecDeque::with_capacity(capacity),
            active: 0,
            capacity,
            notify: Arc::new(Notify::new()),
        }
    }

    /// Handle the worker waits on while the queue is empty.
    pub fn notifier(&self) -> Arc<Notify> {
        self.notify.clone()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn active(&self) -> usize {
        self.active
    }

    pub fn is_full(&self) -> bool {
        self.active >= self.capacity
    }

    /// Enqueues a task and counts it as active. Callers check `is_full` first.
    pub fn push(&mut self, task_id: TaskId) {
        self.pending.push_back(task_id);
        self.active += 1;
        self.notify.notify_one();
    }

    /// Takes the oldest pending task. It stays active until [`release`](Self::release).
    pub fn pop(&mut self) -> Option<TaskId> {
        self.pending.pop_front()
    }

    /// Drops a still-pending task from the queue and frees its slot.
    /// Returns false if the task was not queued.
    pub fn remove(&mut self, task_id: &TaskId) -> bool {
        match self.pending.iter().position(|id| id == task_id) {
            Some(index) => {
                self.pending.remove(index);
                self.release();
                true
            }
            None => false,
        }
    }

    /// Frees the slot of a task that left the active set.
    pub fn release(&mut self) {
        self.active = self.active.saturating_sub(1);
    }
}
