//! Panic containment for pool tasks.
//!
//! Every task a worker pops goes through [`PanicHandler::run_task`]. A
//! panicking task never takes its worker down with it (unless the strategy is
//! [`PanicStrategy::Abort`]); the handler records it and the worker moves on.

use super::task::{Task, TaskId};
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};

/// What a worker does when a task panics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanicStrategy {
    /// Abort the whole process.
    Abort,
    /// Swallow the panic silently; only the counter moves.
    Isolate,
    /// Log the panic at error level and keep the worker running.
    #[default]
    LogAndContinue,
}

/// Shared by all workers of one pool. Holds the pool-wide panic count.
#[derive(Debug, Default)]
pub struct PanicHandler {
    strategy: PanicStrategy,
    panicked: AtomicU64,
}

impl PanicHandler {
    pub fn new(strategy: PanicStrategy) -> Self {
        Self {
            strategy,
            panicked: AtomicU64::new(0),
        }
    }

    /// Runs `task` to completion, containing a panic according to the
    /// strategy. A task whose body panicked leaves its result slot empty.
    pub fn run_task(&self, task: Task) -> Result<(), PanicInfo> {
        let id = task.id();
        catch_unwind(AssertUnwindSafe(|| task.run()))
            .map_err(|payload| self.record(PanicInfo::new(id, payload)))
    }

    fn record(&self, info: PanicInfo) -> PanicInfo {
        self.panicked.fetch_add(1, Ordering::Relaxed);

        match self.strategy {
            PanicStrategy::Abort => {
                tracing::error!(task = info.task.as_u64(), panic = %info.message, "task panicked, aborting");
                std::process::abort();
            }
            PanicStrategy::Isolate => {}
            PanicStrategy::LogAndContinue => {
                tracing::error!(task = info.task.as_u64(), panic = %info.message, "task panicked");
            }
        }
        info
    }

    /// Tasks that have panicked so far, across every worker sharing this handler.
    pub fn panicked(&self) -> u64 {
        self.panicked.load(Ordering::Relaxed)
    }

    pub fn strategy(&self) -> PanicStrategy {
        self.strategy
    }
}

/// A contained task panic.
#[derive(Debug, Clone)]
pub struct PanicInfo {
    pub task: TaskId,
    pub message: String,
}

impl PanicInfo {
    fn new(task: TaskId, payload: Box<dyn Any + Send>) -> Self {
        let message = match payload.downcast::<String>() {
            Ok(s) => *s,
            Err(payload) => payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "non-string panic payload".to_string()),
        };

        Self { task, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::ResultSlot;

    #[test]
    fn test_isolated_panic_is_counted() {
        let handler = PanicHandler::new(PanicStrategy::Isolate);
        let task = Task::new(|| panic!("bad task"));
        let id = task.id();

        let info = handler.run_task(task).unwrap_err();
        assert_eq!(info.task, id);
        assert_eq!(info.message, "bad task");
        assert_eq!(handler.panicked(), 1);
    }

    #[test]
    fn test_clean_task_fills_slot() {
        let handler = PanicHandler::new(PanicStrategy::Isolate);
        let slot = ResultSlot::new();

        handler.run_task(Task::with_result(&slot, || 42)).unwrap();
        assert_eq!(slot.take(), Some(42));
        assert_eq!(handler.panicked(), 0);
    }

    #[test]
    fn test_panicking_task_leaves_slot_empty() {
        let handler = PanicHandler::default();
        assert_eq!(handler.strategy(), PanicStrategy::LogAndContinue);

        let slot: std::sync::Arc<ResultSlot<u32>> = ResultSlot::new();
        let info = handler
            .run_task(Task::with_result(&slot, || panic!("task {} failed", 7)))
            .unwrap_err();

        assert_eq!(info.message, "task 7 failed");
        assert!(!slot.is_filled());
    }

    #[test]
    fn test_non_string_payload() {
        let handler = PanicHandler::new(PanicStrategy::Isolate);
        let info = handler
            .run_task(Task::new(|| std::panic::panic_any(17u32)))
            .unwrap_err();
        assert_eq!(info.message, "non-string panic payload");
    }

    #[test]
    fn test_count_accumulates() {
        let handler = PanicHandler::new(PanicStrategy::LogAndContinue);
        for _ in 0..5 {
            let _ = handler.run_task(Task::new(|| panic!("again")));
        }
        handler.run_task(Task::new(|| {})).unwrap();

        assert_eq!(handler.panicked(), 5);
    }
}
