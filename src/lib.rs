//! VEDA sync - bounded priority queues and a fixed worker pool
//!
//! Small in-process concurrency primitives built on a mutex + condition
//! variable monitor per structure.
//!
//! # Quick Start
//!
//! ```
//! use veda_sync::prelude::*;
//!
//! // Track the three largest values seen
//! let top3 = BoundedPriorityQueue::largest(3);
//! for x in [5, 1, 9, 2, 7] {
//!     top3.push(x);
//! }
//! assert_eq!(top3.into_sorted_vec(), vec![9, 7, 5]);
//!
//! // Run work on a fixed set of threads
//! let pool = WorkerPool::new(4).unwrap();
//! let squares: Vec<_> = (0..10u64)
//!     .map(|i| pool.submit_with_result(move || i * i).unwrap())
//!     .collect();
//! pool.stop().unwrap();
//! assert_eq!(squares[9].take(), Some(81));
//! ```
//!
//! # Features
//!
//! - **Bounded Priority Queue**: keep-smallest-K / keep-largest-K admission with blocking pop
//! - **Worker Pool**: fixed threads, bounded FIFO backpressure, sentinel-based drain on stop
//! - **Tasks**: single-shot closures, optionally writing a result slot
//! - **Panic Isolation**: a panicking task never takes its worker down (configurable)

#![warn(missing_debug_implementations)]

pub mod config;
pub mod error;
pub mod executor;
pub mod prelude;
pub mod queue;

pub use config::{PoolConfig, PoolConfigBuilder, DEFAULT_QUEUE_CAPACITY, DEFAULT_WORKER_COUNT};
pub use error::{Error, Result};
pub use executor::{ResultSlot, Task, WorkerPool};
pub use queue::{Admission, BoundedPriorityQueue, Retain};
