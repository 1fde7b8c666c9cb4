//! Lock + condition variable queues.
//!
//! [`BoundedPriorityQueue`] is the top-K / bottom-K tracker; [`BlockingQueue`]
//! is the bounded FIFO the worker pool pulls tasks from.

pub mod blocking;
pub mod priority;

pub use blocking::{BlockingQueue, PushError};
pub use priority::{Admission, BoundedPriorityQueue, Retain};
