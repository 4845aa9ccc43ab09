use crate::state::Shared;

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::{debug, error, trace};

/// The loop run by every worker thread in the pool.
///
/// Each iteration pops the head task under the shared lock, releases the
/// lock, runs the work, then re-acquires the lock to record completion and
/// wake blocked waiters. The thread exits once the stop flag is observed
/// with an empty queue, so queued-but-unstarted tasks still run during
/// shutdown.
pub(crate) fn run_worker_loop(pool_name: Arc<String>, worker_index: usize, shared: Arc<Shared>) {
  debug!(pool_name = %*pool_name, worker_index, "Worker started.");

  loop {
    let task = {
      let mut state = shared.state.lock();
      loop {
        if let Some(task) = state.queue.pop_front() {
          break task;
        }
        if state.stop {
          debug!(
            pool_name = %*pool_name,
            worker_index,
            "Stop flag observed with empty queue. Worker exiting."
          );
          return;
        }
        shared.work_ready.wait(&mut state);
      }
    };

    let task_id = task.task_id;
    trace!(pool_name = %*pool_name, worker_index, %task_id, "Executing task.");

    // The work runs with the lock released, so other workers proceed in
    // parallel. A panic is contained here: the task is still marked complete
    // so no waiter blocks on it, and the worker keeps running.
    if panic::catch_unwind(AssertUnwindSafe(task.work)).is_err() {
      error!(
        pool_name = %*pool_name,
        worker_index,
        %task_id,
        "Task panicked during execution. Marking it complete and continuing."
      );
    } else {
      trace!(pool_name = %*pool_name, worker_index, %task_id, "Task executed successfully.");
    }

    let mut state = shared.state.lock();
    state.record_completion(task_id);
    // Either a `wait(task_id)` or a `wait_all` caller may now be
    // satisfiable, so every waiter gets to re-check its predicate.
    shared.progress.notify_all();
  }
}
