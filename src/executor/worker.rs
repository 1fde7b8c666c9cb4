// worker thread stuff
use super::panic_handler::PanicHandler;
use super::task::Task;
use crate::queue::BlockingQueue;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

pub type WorkerId = usize;

/// Queue entry. `None` is the shutdown sentinel.
pub(crate) type Job = Option<Task>;

// stats for each worker
#[derive(Debug)]
pub struct WorkerState {
    pub tasks_executed: AtomicU64,
    pub busy_time_ns: AtomicU64,
}

impl WorkerState {
    fn new() -> Self {
        Self {
            tasks_executed: AtomicU64::new(0),
            busy_time_ns: AtomicU64::new(0),
        }
    }
}

pub(crate) struct Worker {
    pub id: WorkerId,
    pub state: Arc<WorkerState>,
    queue: Arc<BlockingQueue<Job>>,
    panic_handler: Arc<PanicHandler>,
}

impl Worker {
    pub fn new(
        id: WorkerId,
        queue: Arc<BlockingQueue<Job>>,
        panic_handler: Arc<PanicHandler>,
    ) -> Self {
        Self {
            id,
            state: Arc::new(WorkerState::new()),
            queue,
            panic_handler,
        }
    }

    // main loop
    pub fn run(&self) {
        tracing::trace!(worker = self.id, "worker started");

        loop {
            match self.queue.pop() {
                Some(Some(task)) => self.execute_task(task),
                Some(None) => {
                    tracing::trace!(worker = self.id, "shutdown sentinel received");
                    break;
                }
                // closed and drained without a sentinel for us
                None => break,
            }
        }

        tracing::trace!(worker = self.id, "worker exiting");
    }

    fn execute_task(&self, task: Task) {
        let span = tracing::trace_span!("task", task = task.id().as_u64(), worker = self.id);
        let _enter = span.enter();
        tracing::trace!(queued_us = task.age().as_micros() as u64, "running task");

        let start = Instant::now();
        // panics are counted and logged by the handler
        let _ = self.panic_handler.run_task(task);
        let duration_ns = start.elapsed().as_nanos() as u64;

        self.state
            .busy_time_ns
            .fetch_add(duration_ns, Ordering::Relaxed);
        self.state.tasks_executed.fetch_add(1, Ordering::Relaxed);
    }
}
