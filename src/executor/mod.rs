//! Asynchronous Task Executor Module
//!
//! Accepts work items of a declared type, queues them, runs them in the
//! background, and keeps their status, duration and result available for polling.
//!
//! ## Architecture Overview
//! 1. **Registration**: A [`TaskFactory`](registry::TaskFactory) is bound to a type name.
//!    The first registration of a type creates its bounded queue and starts its worker.
//! 2. **Admission**: `create_task` rejects unknown types and types whose pending + running
//!    count has reached the queue capacity, then stores the task as `Pending` and enqueues it.
//! 3. **Execution**: The type's single worker runs tasks one at a time in FIFO order,
//!    while a duration tracker republishes the elapsed time of the running task.
//! 4. **Polling**: Clients read snapshots by ID and may delete tasks that are not running.
//!
//! ## Submodules
//! - **`manager`**: The `TaskManager` facade owning all shared state.
//! - **`queue`**: Per-type FIFO with admission counting.
//! - **`worker`**: The per-type execution loop.
//! - **`tracker`**: Periodic duration updates for a running task.
//! - **`registry`**: Factory / executable-task abstractions.
//! - **`simulated`**: The built-in workload simulator.
//! - **`handlers`** / **`protocol`**: The HTTP surface.

pub mod error;
pub mod handlers;
pub mod manager;
pub mod protocol;
pub mod queue;
pub mod registry;
pub mod simulated;
pub mod tracker;
pub mod types;
mod worker;
