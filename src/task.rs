use std::fmt;

/// The unique identifier assigned to a task at submission time.
///
/// Identifiers start at 0, increase by 1 per submission, and are never
/// reused for the lifetime of a pool.
pub type TaskId = u64;

/// The type of work that the pool executes.
/// A zero-argument closure with no return value; it must be `Send` and
/// `'static`.
pub type WorkToExecute = Box<dyn FnOnce() + Send + 'static>;

/// Internal representation of a task sitting in the pool's queue.
///
/// Exclusively owned by the queue until a worker pops it, then exclusively
/// owned by that worker for the duration of execution.
pub(crate) struct QueuedTask {
  pub(crate) task_id: TaskId,
  pub(crate) work: WorkToExecute,
}

impl fmt::Debug for QueuedTask {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("QueuedTask")
      .field("task_id", &self.task_id)
      .finish_non_exhaustive()
  }
}
