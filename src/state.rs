use crate::task::{QueuedTask, TaskId, WorkToExecute};

use std::collections::{HashSet, VecDeque};
use std::fmt;

use parking_lot::{Condvar, Mutex};

/// Everything the pool's threads coordinate over, guarded by a single mutex.
///
/// The state is never handed out; workers and the manager's methods lock it,
/// mutate it, and release it around every queue, completion-set, or counter
/// access. Work functions themselves run with the lock released.
pub(crate) struct PoolState {
  /// Pending tasks in FIFO submission order. A task appears here at most
  /// once, and only before execution begins.
  pub(crate) queue: VecDeque<QueuedTask>,
  /// Identifiers of tasks whose work function has returned and that no
  /// `wait` call has claimed yet.
  pub(crate) completed: HashSet<TaskId>,
  /// The identifier the next submission will receive.
  pub(crate) next_task_id: TaskId,
  /// How many completed identifiers have been removed by `wait` calls.
  pub(crate) consumed: u64,
  /// Set once at shutdown; workers exit when they observe it with an empty
  /// queue.
  pub(crate) stop: bool,
}

impl PoolState {
  pub(crate) fn new() -> Self {
    Self {
      queue: VecDeque::new(),
      completed: HashSet::new(),
      next_task_id: 0,
      consumed: 0,
      stop: false,
    }
  }

  /// Assigns the next sequential identifier to `work` and appends it to the
  /// queue tail. The counter advances by exactly 1 regardless of queue state.
  pub(crate) fn enqueue(&mut self, work: WorkToExecute) -> TaskId {
    let task_id = self.next_task_id;
    self.next_task_id += 1;
    self.queue.push_back(QueuedTask { task_id, work });
    task_id
  }

  /// Records that `task_id`'s work function has returned control to a worker.
  pub(crate) fn record_completion(&mut self, task_id: TaskId) {
    self.completed.insert(task_id);
  }

  /// The `wait_all` predicate: the queue is empty AND every identifier ever
  /// handed out is accounted for, either still sitting in the completion set
  /// or already claimed by a `wait` call. An empty queue alone is not
  /// enough, since tasks may be mid-execution inside a worker.
  pub(crate) fn all_finished(&self) -> bool {
    self.queue.is_empty() && self.completed.len() as u64 + self.consumed == self.next_task_id
  }
}

impl fmt::Debug for PoolState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("PoolState")
      .field("queued", &self.queue.len())
      .field("completed_unclaimed", &self.completed.len())
      .field("next_task_id", &self.next_task_id)
      .field("consumed", &self.consumed)
      .field("stop", &self.stop)
      .finish()
  }
}

/// The state plus the two condition variables the pool coordinates with.
///
/// `work_ready` is where idle workers sleep; its predicate is "queue
/// non-empty or stopping", so `submit` can wake exactly one worker without
/// the wakeup being absorbed by an unrelated waiter. `progress` is where
/// `wait` and `wait_all` callers sleep; task completion notifies all of
/// them, since either kind of waiter may have become satisfiable.
pub(crate) struct Shared {
  pub(crate) state: Mutex<PoolState>,
  pub(crate) work_ready: Condvar,
  pub(crate) progress: Condvar,
}

impl Shared {
  pub(crate) fn new() -> Self {
    Self {
      state: Mutex::new(PoolState::new()),
      work_ready: Condvar::new(),
      progress: Condvar::new(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn noop() -> WorkToExecute {
    Box::new(|| {})
  }

  #[test]
  fn enqueue_assigns_sequential_ids() {
    let mut state = PoolState::new();
    for expected in 0..5u64 {
      assert_eq!(state.enqueue(noop()), expected);
    }
    assert_eq!(state.next_task_id, 5);
    assert_eq!(state.queue.len(), 5);
  }

  #[test]
  fn queue_pops_in_submission_order() {
    let mut state = PoolState::new();
    for _ in 0..4 {
      state.enqueue(noop());
    }
    let mut popped = Vec::new();
    while let Some(task) = state.queue.pop_front() {
      popped.push(task.task_id);
    }
    assert_eq!(popped, vec![0, 1, 2, 3]);
  }

  #[test]
  fn all_finished_requires_completion_not_just_empty_queue() {
    let mut state = PoolState::new();
    assert!(state.all_finished(), "A fresh pool has nothing outstanding");

    let id = state.enqueue(noop());
    assert!(!state.all_finished());

    // Dequeued but still executing: the queue is empty, yet the task is
    // unaccounted for.
    let _in_flight = state.queue.pop_front().unwrap();
    assert!(!state.all_finished());

    state.record_completion(id);
    assert!(state.all_finished());
  }

  #[test]
  fn consumed_identifiers_still_count_as_finished() {
    let mut state = PoolState::new();
    let a = state.enqueue(noop());
    let b = state.enqueue(noop());
    state.queue.clear();
    state.record_completion(a);
    state.record_completion(b);

    // A `wait(a)` claims the identifier.
    assert!(state.completed.remove(&a));
    state.consumed += 1;

    assert!(state.all_finished());
  }
}
