//! Task execution infrastructure.
//!
//! This module provides the single-shot [`Task`], the per-thread worker loop,
//! panic isolation, and the fixed-size [`WorkerPool`] that ties them together.

pub mod panic_handler;
pub mod pool;
pub mod task;
pub mod worker;

pub use panic_handler::{PanicHandler, PanicInfo, PanicStrategy};
pub use pool::{PoolState, PoolStats, WorkerPool};
pub use task::{ResultSlot, Task, TaskId};
pub use worker::WorkerId;
