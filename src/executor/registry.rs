//! Task Factories
//!
//! The manager never knows what a task actually does. Each task type is bound
//! to a [`TaskFactory`], which turns a task's metadata into an
//! [`ExecutableTask`] when its worker picks it up. Adding a new type means
//! implementing this pair (or wrapping an async closure in [`FnFactory`]) and
//! registering it with the manager.

use super::types::Task;

use anyhow::Result;
use async_trait::async_trait;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// A unit of work that runs once to completion.
///
/// `Ok(())` marks the task `Done`; an `Err` marks it `Failed` and its text
/// becomes the task result.
#[async_trait]
pub trait ExecutableTask: Send {
    async fn run(&mut self) -> Result<()>;
}

/// Builds executable tasks for one task type.
pub trait TaskFactory: Send + Sync {
    fn create(&self, task: &Task) -> Box<dyn ExecutableTask>;
}

/// Type-erased factory as stored in the manager's factory table.
pub type SharedFactory = Arc<dyn TaskFactory>;

/// Type alias for a thread-safe, asynchronous task body.
/// It takes a snapshot of the `Task` and returns a Future resolving to a `Result<()>`.
pub type TaskFn =
    Arc<dyn Fn(Task) -> Pin<Box<dyn Future<Output = Result<()>> + Send>> + Send + Sync>;

/// Factory backed by an async closure.
pub struct FnFactory {
    body: TaskFn,
}

impl FnFactory {
    pub fn new<F, Fut>(body: F) -> Self
    where
        F: Fn(Task) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        // Box::pin erases the concrete future type so different closures share one table.
        let body: TaskFn = Arc::new(move |task: Task| {
            Box::pin(body(task)) as Pin<Box<dyn Future<Output = Result<()>> + Send>>
        });

        Self { body }
    }

    /// Convenience for registering directly with the manager.
    pub fn shared<F, Fut>(body: F) -> SharedFactory
    where
        F: Fn(Task) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        Arc::new(Self::new(body))
    }
}

impl TaskFactory for FnFactory {
    fn create(&self, task: &Task) -> Box<dyn ExecutableTask> {
        Box::new(FnTask {
            body: self.body.clone(),
            task: task.clone(),
        })
    }
}

struct FnTask {
    body: TaskFn,
    task: Task,
}

#[async_trait]
impl ExecutableTask for FnTask {
    async fn run(&mut self) -> Result<()> {
        (self.body)(self.task.clone()).await
    }
}
