//! Per-Type Worker
//!
//! Each registered task type gets exactly one long-lived worker. It takes the
//! oldest pending task, builds an executable through the type's factory, and
//! runs it to completion before looking at the queue again. That gives strict
//! FIFO order and mutual exclusion within a type, while different types run
//! in parallel on their own workers.

use super::manager::TaskManager;
use super::registry::SharedFactory;
use super::tracker::DurationTracker;
use super::types::*;

use anyhow::Result;
use std::sync::Arc;
use tokio::runtime::{Builder, Handle};
use tokio::sync::Notify;

/// Starts the worker for `task_type`.
///
/// Inside a tokio runtime the worker is a task on that runtime. Otherwise it
/// gets a dedicated thread driving its own current-thread runtime.
pub(super) fn spawn_worker(manager: Arc<TaskManager>, task_type: String, notify: Arc<Notify>) {
    if let Ok(handle) = Handle::try_current() {
        handle.spawn(worker_loop(manager, task_type, notify));
        return;
    }

    let thread_name = format!("worker-{}", task_type);
    let spawned = std::thread::Builder::new()
        .name(thread_name)
        .spawn(move || match Builder::new_current_thread().enable_all().build() {
            Ok(runtime) => runtime.block_on(worker_loop(manager, task_type, notify)),
            Err(e) => tracing::error!(
                "Failed to build runtime for task type '{}' worker: {}",
                task_type,
                e
            ),
        });

    if let Err(e) = spawned {
        tracing::error!("Failed to spawn worker thread: {}", e);
    }
}

/// Main loop of one type's worker. Suspends on `notify` while the queue is empty.
async fn worker_loop(manager: Arc<TaskManager>, task_type: String, notify: Arc<Notify>) {
    tracing::info!("Worker for task type '{}' started", task_type);

    loop {
        match manager.claim_next(&task_type) {
            Some((task, factory)) => run_task(&manager, task, factory).await,
            None => notify.notified().await,
        }
    }
}

/// Runs one claimed task while tracking its duration, then records the outcome.
async fn run_task(manager: &Arc<TaskManager>, task: Task, factory: SharedFactory) {
    tracing::info!("Task {} started (type: {})", task.id, task.task_type);

    let tracker = {
        let manager = manager.clone();
        let id = task.id.clone();
        DurationTracker::start(manager.config().tick_interval, move |elapsed| {
            manager.update_duration(&id, elapsed);
        })
    };

    let outcome = execute(factory, &task).await;

    tracker.stop().await;

    manager.finalize(&task.id, &task.task_type, outcome);
}

/// Builds and runs the executable on its own tokio task so a panic inside it
/// fails the task instead of killing the worker.
async fn execute(factory: SharedFactory, task: &Task) -> Result<()> {
    let snapshot = task.clone();

    let handle = tokio::spawn(async move {
        let mut executable = factory.create(&snapshot);
        executable.run().await
    });

    match handle.await {
        Ok(outcome) => outcome,
        Err(e) if e.is_panic() => Err(anyhow::anyhow!("task panicked")),
        Err(e) => Err(anyhow::anyhow!(e)),
    }
}
