use crate::error::{Error, Result};
use crate::executor::PanicStrategy;

/// Capacity used by bounded priority queues when the caller does not pick one.
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Worker count used by [`PoolConfig::default`].
pub const DEFAULT_WORKER_COUNT: usize = 20;

const MAX_WORKERS: usize = 1024;

#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub num_workers: usize,
    /// Bound on queued tasks. `None` sizes the queue to `num_workers`.
    pub queue_capacity: Option<usize>,
    pub thread_name_prefix: String,
    pub stack_size: Option<usize>,
    pub panic_strategy: PanicStrategy,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            num_workers: DEFAULT_WORKER_COUNT,
            queue_capacity: None,
            thread_name_prefix: "veda-worker".to_string(),
            stack_size: Some(2 * 1024 * 1024),
            panic_strategy: PanicStrategy::default(),
        }
    }
}

impl PoolConfig {
    pub fn builder() -> PoolConfigBuilder {
        PoolConfigBuilder::new()
    }

    /// Shorthand for a default config with `n` workers.
    pub fn with_workers(n: usize) -> Self {
        Self {
            num_workers: n,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.num_workers == 0 {
            return Err(Error::config("num_workers must be > 0"));
        }
        if self.num_workers > MAX_WORKERS {
            return Err(Error::config(format!(
                "num_workers too large (max {})",
                MAX_WORKERS
            )));
        }

        if self.queue_capacity == Some(0) {
            return Err(Error::config("queue_capacity must be > 0"));
        }

        if self.thread_name_prefix.contains('\0') {
            return Err(Error::config("thread_name_prefix must not contain NUL"));
        }

        Ok(())
    }

    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity.unwrap_or(self.num_workers)
    }
}

#[derive(Debug, Default)]
pub struct PoolConfigBuilder {
    config: PoolConfig,
}

impl PoolConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: PoolConfig::default(),
        }
    }

    pub fn num_workers(mut self, n: usize) -> Self {
        self.config.num_workers = n;
        self
    }

    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.config.queue_capacity = Some(capacity);
        self
    }

    pub fn thread_name_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.config.thread_name_prefix = prefix.into();
        self
    }

    pub fn stack_size(mut self, size: usize) -> Self {
        self.config.stack_size = Some(size);
        self
    }

    pub fn panic_strategy(mut self, strategy: PanicStrategy) -> Self {
        self.config.panic_strategy = strategy;
        self
    }

    pub fn build(self) -> Result<PoolConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
