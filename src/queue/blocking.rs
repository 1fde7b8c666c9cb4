//! Bounded FIFO queue with blocking push/pop and close semantics.
//!
//! This is the work queue behind [`WorkerPool`](crate::executor::WorkerPool).
//! Producers block while the queue is full, consumers block while it is
//! empty. Closing the queue turns away new producers but lets consumers
//! drain whatever was accepted before the close.

use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::fmt;
use std::time::{Duration, Instant};

/// Returned when an item could not be enqueued. Carries the item back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushError<T> {
    Full(T),
    Closed(T),
}

impl<T> PushError<T> {
    pub fn into_inner(self) -> T {
        match self {
            PushError::Full(item) | PushError::Closed(item) => item,
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, PushError::Closed(_))
    }
}

impl<T> fmt::Display for PushError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PushError::Full(_) => f.write_str("queue is full"),
            PushError::Closed(_) => f.write_str("queue is closed"),
        }
    }
}

struct State<T> {
    items: VecDeque<T>,
    // producers turned away
    closed: bool,
    // no more items will ever arrive; set after any close tail is queued
    sealed: bool,
}

pub struct BlockingQueue<T> {
    state: Mutex<State<T>>,
    not_empty: Condvar,
    not_full: Condvar,
    capacity: usize,
}

impl<T> BlockingQueue<T> {
    /// Creates a queue holding at most `capacity` items. A capacity of zero
    /// could never hand anything over, so it is raised to one.
    pub fn bounded(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            state: Mutex::new(State {
                items: VecDeque::with_capacity(capacity.min(1024)),
                closed: false,
                sealed: false,
            }),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
            capacity,
        }
    }

    /// Appends `item`, waiting for space while the queue is full.
    pub fn push(&self, item: T) -> Result<(), PushError<T>> {
        let mut state = self.state.lock();
        loop {
            if state.closed {
                return Err(PushError::Closed(item));
            }
            if state.items.len() < self.capacity {
                break;
            }
            self.not_full.wait(&mut state);
        }

        state.items.push_back(item);
        drop(state);
        self.not_empty.notify_one();
        Ok(())
    }

    pub fn try_push(&self, item: T) -> Result<(), PushError<T>> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(PushError::Closed(item));
        }
        if state.items.len() >= self.capacity {
            return Err(PushError::Full(item));
        }

        state.items.push_back(item);
        drop(state);
        self.not_empty.notify_one();
        Ok(())
    }

    /// Removes the oldest item, waiting while the queue is empty.
    ///
    /// Returns `None` only once the queue is closed, any tail handed to
    /// [`close_with`](Self::close_with) is queued, and everything is drained.
    pub fn pop(&self) -> Option<T> {
        let mut state = self.state.lock();
        loop {
            if let Some(item) = state.items.pop_front() {
                drop(state);
                self.not_full.notify_one();
                return Some(item);
            }
            if state.sealed {
                return None;
            }
            self.not_empty.wait(&mut state);
        }
    }

    pub fn try_pop(&self) -> Option<T> {
        let item = self.state.lock().items.pop_front();
        if item.is_some() {
            self.not_full.notify_one();
        }
        item
    }

    /// Like [`pop`](Self::pop) but gives up after `timeout`. A timeout too
    /// large to represent as a deadline waits without limit.
    pub fn pop_timeout(&self, timeout: Duration) -> Option<T> {
        let deadline = match Instant::now().checked_add(timeout) {
            Some(deadline) => deadline,
            None => return self.pop(),
        };
        let mut state = self.state.lock();
        loop {
            if let Some(item) = state.items.pop_front() {
                drop(state);
                self.not_full.notify_one();
                return Some(item);
            }
            if state.sealed {
                return None;
            }
            if self.not_empty.wait_until(&mut state, deadline).timed_out() {
                // one last look: the wakeup may have raced the deadline
                let item = state.items.pop_front();
                if item.is_some() {
                    drop(state);
                    self.not_full.notify_one();
                }
                return item;
            }
        }
    }

    /// Rejects all further pushes and wakes every blocked producer and consumer.
    pub fn close(&self) {
        {
            let mut state = self.state.lock();
            state.closed = true;
            state.sealed = true;
        }
        self.not_full.notify_all();
        self.not_empty.notify_all();
    }

    /// Closes the queue, then appends `tail` behind everything already
    /// accepted, waiting for space as consumers drain.
    ///
    /// Because the close happens first, nothing a producer pushes can land
    /// after the tail. Consumers keep blocking on an empty queue until the
    /// whole tail is in, so none of it is left behind.
    pub fn close_with<I>(&self, tail: I)
    where
        I: IntoIterator<Item = T>,
    {
        let mut state = self.state.lock();
        state.closed = true;
        self.not_full.notify_all();

        for item in tail {
            while state.items.len() >= self.capacity {
                self.not_full.wait(&mut state);
            }
            state.items.push_back(item);
            self.not_empty.notify_one();
        }
        state.sealed = true;
        drop(state);
        self.not_empty.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    pub fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.state.lock().items.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<T> fmt::Debug for BlockingQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("BlockingQueue")
            .field("len", &state.items.len())
            .field("capacity", &self.capacity)
            .field("closed", &state.closed)
            .finish()
    }
}
