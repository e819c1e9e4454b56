//! Asynchronous Task Runner Library
//!
//! Clients submit work items of a declared type over HTTP; the service gives
//! each an ID, queues it, runs it on that type's background worker, and
//! exposes its status, duration and result for polling.
//!
//! ## Modules
//! - **`executor`**: Task lifecycle management: factories, per-type queues and
//!   workers, duration tracking, and the HTTP handlers on top of them.
//! - **`config`**: Command-line / environment configuration.
//! - **`server`**: Router construction and graceful shutdown.

pub mod config;
pub mod executor;
pub mod server;
