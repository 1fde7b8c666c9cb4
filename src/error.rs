//! Error types shared by the queues and the worker pool.

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("worker pool is stopped")]
    PoolStopped,

    #[error("task queue is full")]
    QueueFull,

    #[error("worker panic: {0}")]
    WorkerPanic(String),
}

impl Error {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    pub fn worker_panic<S: Into<String>>(msg: S) -> Self {
        Error::WorkerPanic(msg.into())
    }
}
