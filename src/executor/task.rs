//! Task representation and execution.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Global task ID counter
static TASK_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

impl TaskId {
    fn next() -> Self {
        TaskId(TASK_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// A single-shot unit of work.
///
/// All inputs are captured when the task is built; [`run`](Task::run)
/// consumes the task, so it can execute at most once.
pub struct Task {
    id: TaskId,
    func: Box<dyn FnOnce() + Send + 'static>,
    captures_result: bool,
    created_at: Instant,
}

impl Task {
    /// Fire-and-forget task.
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Task {
            id: TaskId::next(),
            func: Box::new(f),
            captures_result: false,
            created_at: Instant::now(),
        }
    }

    /// Task that stores the value returned by `f` into `slot` when run.
    ///
    /// The task holds its own reference to the slot, so the slot outlives
    /// the task no matter what the caller does with its handle.
    pub fn with_result<R, F>(slot: &Arc<ResultSlot<R>>, f: F) -> Self
    where
        R: Send + 'static,
        F: FnOnce() -> R + Send + 'static,
    {
        let slot = Arc::clone(slot);
        Task {
            id: TaskId::next(),
            func: Box::new(move || slot.fill(f())),
            captures_result: true,
            created_at: Instant::now(),
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn captures_result(&self) -> bool {
        self.captures_result
    }

    /// Time since the task was built.
    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }

    /// Execute the task. A panic in the wrapped callable unwinds out of here.
    pub fn run(self) {
        (self.func)();
    }
}

impl std::fmt::Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.id)
            .field("captures_result", &self.captures_result)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Output cell written by a result-capturing [`Task`].
///
/// Reading is the caller's job to order after completion, e.g. after
/// [`WorkerPool::stop`](crate::executor::WorkerPool::stop) returns.
#[derive(Debug)]
pub struct ResultSlot<T> {
    value: Mutex<Option<T>>,
}

impl<T> ResultSlot<T> {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            value: Mutex::new(None),
        })
    }

    fn fill(&self, value: T) {
        *self.value.lock() = Some(value);
    }

    pub fn is_filled(&self) -> bool {
        self.value.lock().is_some()
    }

    pub fn take(&self) -> Option<T> {
        self.value.lock().take()
    }
}

impl<T: Clone> ResultSlot<T> {
    pub fn get(&self) -> Option<T> {
        self.value.lock().clone()
    }
}
