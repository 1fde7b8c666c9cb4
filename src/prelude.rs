pub use crate::config::{PoolConfig, PoolConfigBuilder};
pub use crate::error::{Error, Result};
pub use crate::executor::{PanicStrategy, PoolState, ResultSlot, Task, WorkerPool};
pub use crate::queue::{Admission, BlockingQueue, BoundedPriorityQueue, Retain};
