use crate::error::PoolError;
use crate::state::Shared;
use crate::task::{TaskId, WorkToExecute};
use crate::worker::run_worker_loop;

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{debug, error, info, trace};

/// A fixed-size pool of worker threads executing fire-and-forget jobs.
///
/// Work is submitted with [`submit`](Self::submit), which returns a
/// [`TaskId`] immediately; callers block on completion with
/// [`wait`](Self::wait) or [`wait_all`](Self::wait_all). Dropping the
/// manager (or calling [`shutdown`](Self::shutdown)) stops the workers after
/// they have drained every task already queued, and joins them.
///
/// All methods take `&self`, so a pool wrapped in an `Arc` can be shared
/// across producer threads.
pub struct ThreadPoolManager {
  pool_name: Arc<String>,
  shared: Arc<Shared>,
  workers: Vec<JoinHandle<()>>,
}

impl ThreadPoolManager {
  /// Creates a pool with `worker_count` threads, each named
  /// `{pool_name}-worker-{index}`.
  ///
  /// # Errors
  ///
  /// Returns [`PoolError::ZeroWorkers`] for a zero worker count, and
  /// [`PoolError::WorkerSpawn`] if the OS refuses a thread. On a spawn
  /// failure the workers already started are stopped and joined before the
  /// error is returned.
  pub fn new(worker_count: usize, pool_name: &str) -> Result<Self, PoolError> {
    if worker_count == 0 {
      return Err(PoolError::ZeroWorkers);
    }

    let pool_name = Arc::new(pool_name.to_string());
    let shared = Arc::new(Shared::new());
    let mut workers = Vec::with_capacity(worker_count);

    for worker_index in 0..worker_count {
      let builder = thread::Builder::new().name(format!("{pool_name}-worker-{worker_index}"));
      let worker_pool_name = pool_name.clone();
      let worker_shared = shared.clone();

      match builder.spawn(move || run_worker_loop(worker_pool_name, worker_index, worker_shared)) {
        Ok(handle) => workers.push(handle),
        Err(spawn_error) => {
          error!(
            pool_name = %*pool_name,
            worker_index,
            "Failed to spawn worker thread: {spawn_error}. Stopping the workers already started."
          );
          let mut partial = Self {
            pool_name,
            shared,
            workers,
          };
          partial.stop_and_join();
          return Err(PoolError::WorkerSpawn(spawn_error));
        }
      }
    }

    info!(pool_name = %*pool_name, worker_count, "Pool started.");
    Ok(Self {
      pool_name,
      shared,
      workers,
    })
  }

  /// The name given at construction, carried into thread names and logs.
  pub fn name(&self) -> &str {
    &self.pool_name
  }

  /// The fixed number of worker threads in the pool.
  pub fn worker_count(&self) -> usize {
    self.workers.len()
  }

  /// The number of tasks submitted but not yet picked up by a worker.
  pub fn queued_task_count(&self) -> usize {
    self.shared.state.lock().queue.len()
  }

  /// The total number of tasks ever submitted to this pool.
  pub fn submitted_task_count(&self) -> u64 {
    self.shared.state.lock().next_task_id
  }

  /// Enqueues `work` and returns its identifier. Never blocks.
  ///
  /// Identifiers are assigned sequentially from 0 in submission order, and
  /// tasks are dequeued in that order. Completion order is unordered: it
  /// depends on how long each task runs.
  pub fn submit(&self, work: WorkToExecute) -> TaskId {
    let task_id = {
      let mut state = self.shared.state.lock();
      state.enqueue(work)
    };
    // One task was queued, so one idle worker is enough to wake.
    self.shared.work_ready.notify_one();
    debug!(pool_name = %*self.pool_name, %task_id, "Task queued.");
    task_id
  }

  /// Blocks until the task with `task_id` has finished executing, then
  /// claims its identifier and returns.
  ///
  /// Safe to call concurrently with other waiters and with ongoing
  /// submissions. Each completed identifier can be claimed exactly once:
  /// waiting again on an identifier this method already returned for, or on
  /// one that was never issued by [`submit`](Self::submit), blocks forever.
  pub fn wait(&self, task_id: TaskId) {
    trace!(pool_name = %*self.pool_name, %task_id, "Waiting for task.");
    let mut state = self.shared.state.lock();
    while !state.completed.contains(&task_id) {
      self.shared.progress.wait(&mut state);
    }
    state.completed.remove(&task_id);
    state.consumed += 1;
    debug!(pool_name = %*self.pool_name, %task_id, "Wait satisfied; identifier claimed.");
  }

  /// Blocks until every task submitted so far has finished executing.
  ///
  /// This waits for the queue to drain AND for every identifier ever handed
  /// out to be accounted for, so tasks still running inside a worker when
  /// the queue empties are waited on too.
  pub fn wait_all(&self) {
    trace!(pool_name = %*self.pool_name, "Waiting for all submitted tasks.");
    let mut state = self.shared.state.lock();
    while !state.all_finished() {
      self.shared.progress.wait(&mut state);
    }
    debug!(
      pool_name = %*self.pool_name,
      submitted = state.next_task_id,
      "All submitted tasks finished."
    );
  }

  /// Stops the pool explicitly, joining every worker thread.
  ///
  /// Workers exit only once the queue is empty, so tasks already queued but
  /// not yet started still run to completion before this returns. Dropping
  /// the manager performs the same teardown implicitly.
  pub fn shutdown(mut self) {
    self.stop_and_join();
  }

  /// Raises the stop flag, wakes every worker, and joins them all. Used by
  /// both the explicit shutdown path and `Drop`; a second call is a no-op
  /// since the handle list is drained by the first.
  fn stop_and_join(&mut self) {
    if self.workers.is_empty() {
      return;
    }

    info!(pool_name = %*self.pool_name, "Initiating pool shutdown.");
    {
      let mut state = self.shared.state.lock();
      state.stop = true;
    }
    self.shared.work_ready.notify_all();

    for handle in self.workers.drain(..) {
      if handle.join().is_err() {
        // Task panics are caught inside the loop, so a panicked worker
        // thread indicates a bug in the pool itself. Log and keep joining.
        error!(pool_name = %*self.pool_name, "A worker thread panicked outside task execution.");
      }
    }
    info!(pool_name = %*self.pool_name, "Pool shutdown complete. All workers joined.");
  }
}

impl Drop for ThreadPoolManager {
  fn drop(&mut self) {
    self.stop_and_join();
  }
}

impl std::fmt::Debug for ThreadPoolManager {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let state = self.shared.state.lock();
    f.debug_struct("ThreadPoolManager")
      .field("pool_name", &*self.pool_name)
      .field("worker_count", &self.workers.len())
      .field("state", &*state)
      .finish()
  }
}
