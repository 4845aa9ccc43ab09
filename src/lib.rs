//! A fixed-size pool of worker threads for executing fire-and-forget jobs,
//! with per-task identifiers and blocking completion waits.
//!
//! Submitting work never blocks and returns a [`TaskId`]; callers can later
//! block until that specific task has finished ([`ThreadPoolManager::wait`])
//! or until every submitted task has finished ([`ThreadPoolManager::wait_all`]).
//! Panics inside a job are caught at the worker boundary, logged, and the
//! task is still counted as complete.

mod error;
mod manager;
mod state;
mod task;
mod worker;

pub use error::PoolError;
pub use manager::ThreadPoolManager;
pub use task::{TaskId, WorkToExecute};
