use super::panic_handler::{PanicHandler, PanicStrategy};
use super::task::{ResultSlot, Task};
use super::worker::{Job, Worker, WorkerId, WorkerState};
use crate::config::PoolConfig;
use crate::error::{Error, Result};
use crate::queue::{BlockingQueue, PushError};
use parking_lot::Mutex;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Lifecycle of a [`WorkerPool`]. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolState {
    /// Workers are being spawned.
    Created,
    /// Accepting submissions.
    Running,
    /// Sentinels injected; submissions are refused.
    Stopping,
    /// Every worker has been joined.
    Stopped,
}

/// Counters summed over all workers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    pub tasks_executed: u64,
    pub tasks_panicked: u64,
    pub busy_time_ns: u64,
}

struct WorkerHandle {
    id: WorkerId,
    thread: Option<JoinHandle<()>>,
}

/// Fixed set of worker threads draining a bounded FIFO of [`Task`]s.
///
/// Submissions block while the queue is full. [`stop`](WorkerPool::stop)
/// lets every task accepted so far run, then joins the workers; dropping
/// the pool does the same.
///
/// ```
/// use veda_sync::executor::WorkerPool;
///
/// let pool = WorkerPool::new(4).unwrap();
/// let slot = pool.submit_with_result(|| 6 * 7).unwrap();
/// pool.stop().unwrap();
/// assert_eq!(slot.take(), Some(42));
/// ```
pub struct WorkerPool {
    workers: Mutex<Vec<WorkerHandle>>,
    worker_states: Vec<Arc<WorkerState>>,
    queue: Arc<BlockingQueue<Job>>,
    panic_handler: Arc<PanicHandler>,
    state: Mutex<PoolState>,
    num_workers: usize,
}

impl WorkerPool {
    /// Spawns `num_workers` threads with otherwise default settings.
    pub fn new(num_workers: usize) -> Result<Self> {
        Self::with_config(PoolConfig::with_workers(num_workers))
    }

    pub fn with_config(config: PoolConfig) -> Result<Self> {
        config.validate()?;

        let num_workers = config.num_workers;
        let queue = Arc::new(BlockingQueue::bounded(config.queue_capacity()));
        let panic_handler = Arc::new(PanicHandler::new(config.panic_strategy));
        let state = Mutex::new(PoolState::Created);

        let mut handles = Vec::with_capacity(num_workers);
        let mut worker_states = Vec::with_capacity(num_workers);

        for id in 0..num_workers {
            let worker = Worker::new(id, queue.clone(), panic_handler.clone());
            let worker_state = worker.state.clone();
            let name = format!("{}-{}", config.thread_name_prefix, id);

            let mut builder = thread::Builder::new().name(name);
            if let Some(stack_size) = config.stack_size {
                builder = builder.stack_size(stack_size);
            }

            match builder.spawn(move || worker.run()) {
                Ok(thread) => {
                    handles.push(WorkerHandle {
                        id,
                        thread: Some(thread),
                    });
                    worker_states.push(worker_state);
                }
                Err(e) => {
                    // wind down whatever already started before reporting
                    queue.close_with(std::iter::repeat_with(|| None).take(handles.len()));
                    for handle in handles {
                        if let Some(thread) = handle.thread {
                            let _ = thread.join();
                        }
                    }
                    return Err(Error::Spawn(e));
                }
            }
        }

        *state.lock() = PoolState::Running;
        tracing::debug!(
            workers = num_workers,
            queue_capacity = queue.capacity(),
            "worker pool started"
        );

        Ok(Self {
            workers: Mutex::new(handles),
            worker_states,
            queue,
            panic_handler,
            state,
            num_workers,
        })
    }

    /// Enqueues `task`, blocking while the queue is full.
    pub fn submit(&self, task: Task) -> Result<()> {
        self.queue
            .push(Some(task))
            .map_err(|_| Error::PoolStopped)
    }

    /// Enqueues `task` only if there is room right now.
    pub fn try_submit(&self, task: Task) -> Result<()> {
        self.queue.try_push(Some(task)).map_err(|e| match e {
            PushError::Full(_) => Error::QueueFull,
            PushError::Closed(_) => Error::PoolStopped,
        })
    }

    pub fn execute<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.submit(Task::new(f))
    }

    /// Submits `f` and hands back the slot its return value will land in.
    pub fn submit_with_result<R, F>(&self, f: F) -> Result<Arc<ResultSlot<R>>>
    where
        R: Send + 'static,
        F: FnOnce() -> R + Send + 'static,
    {
        let slot = ResultSlot::new();
        self.submit(Task::with_result(&slot, f))?;
        Ok(slot)
    }

    /// Stops accepting work, lets queued tasks finish, and joins every worker.
    ///
    /// Only the first call does anything; later calls return `Ok(())` at once.
    /// Must not be called from inside a task running on this pool.
    pub fn stop(&self) -> Result<()> {
        {
            let mut state = self.state.lock();
            if *state != PoolState::Running {
                return Ok(());
            }
            *state = PoolState::Stopping;
        }

        tracing::debug!(
            workers = self.num_workers,
            pending = self.queue.len(),
            "stopping worker pool"
        );

        // one sentinel per worker, queued behind every accepted task
        self.queue
            .close_with(std::iter::repeat_with(|| None).take(self.num_workers));

        let handles = std::mem::take(&mut *self.workers.lock());
        let mut crashed = Vec::new();
        for mut handle in handles {
            if let Some(thread) = handle.thread.take() {
                if thread.join().is_err() {
                    tracing::warn!(worker = handle.id, "worker thread panicked");
                    crashed.push(handle.id);
                }
            }
        }

        *self.state.lock() = PoolState::Stopped;
        tracing::debug!("worker pool stopped");

        if crashed.is_empty() {
            Ok(())
        } else {
            Err(Error::worker_panic(format!(
                "workers {:?} exited abnormally",
                crashed
            )))
        }
    }

    pub fn state(&self) -> PoolState {
        *self.state.lock()
    }

    pub fn is_running(&self) -> bool {
        self.state() == PoolState::Running
    }

    pub fn worker_count(&self) -> usize {
        self.num_workers
    }

    /// Entries currently queued.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn queue_capacity(&self) -> usize {
        self.queue.capacity()
    }

    pub fn panic_strategy(&self) -> PanicStrategy {
        self.panic_handler.strategy()
    }

    pub fn stats(&self) -> PoolStats {
        let init = PoolStats {
            tasks_panicked: self.panic_handler.panicked(),
            ..PoolStats::default()
        };
        self.worker_states.iter().fold(init, |mut acc, s| {
            acc.tasks_executed += s.tasks_executed.load(Ordering::Relaxed);
            acc.busy_time_ns += s.busy_time_ns.load(Ordering::Relaxed);
            acc
        })
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("num_workers", &self.num_workers)
            .field("state", &self.state())
            .field("queue", &self.queue)
            .finish()
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}
