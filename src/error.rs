use thiserror::Error;

/// Errors that can occur within the `waitpool` pool.
///
/// Only construction can fail. Failures inside submitted work functions are
/// caught at the worker boundary, logged, and never surfaced through this
/// type.
#[derive(Error, Debug)]
pub enum PoolError {
  #[error("Pool requires at least one worker thread")]
  ZeroWorkers,

  #[error("Failed to spawn a worker thread: {0}")]
  WorkerSpawn(#[from] std::io::Error),
}
