//! Thread-safe priority queue with optional top-K / bottom-K retention.
//!
//! A [`BoundedPriorityQueue`] keeps its elements ordered under `T: Ord`. When
//! a capacity is set it acts as an admission filter: once full, an incoming
//! element only gets in by beating the current worst retained element, which
//! is then evicted. This makes it a running tracker of the K smallest (or K
//! largest) elements seen so far.
//!
//! ```
//! use veda_sync::queue::BoundedPriorityQueue;
//!
//! let queue = BoundedPriorityQueue::largest(3);
//! for x in [5, 1, 9, 2, 7] {
//!     queue.push(x);
//! }
//! assert_eq!(queue.pop(), 9);
//! assert_eq!(queue.pop(), 7);
//! assert_eq!(queue.pop(), 5);
//! assert!(queue.try_pop().is_none());
//! ```

use crate::config::DEFAULT_QUEUE_CAPACITY;
use parking_lot::{Condvar, Mutex};
use std::collections::BTreeSet;
use std::fmt;
use std::time::{Duration, Instant};

/// Which end of the order a queue keeps, and pops first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Retain {
    /// Keep the K smallest elements; `pop` yields ascending order.
    Smallest,
    /// Keep the K largest elements; `pop` yields descending order.
    Largest,
}

impl Retain {
    /// Strict comparison: equal elements are never preferred.
    fn prefers<T: Ord>(self, candidate: &T, incumbent: &T) -> bool {
        match self {
            Retain::Smallest => candidate < incumbent,
            Retain::Largest => candidate > incumbent,
        }
    }
}

/// What happened to an element handed to [`BoundedPriorityQueue::push`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission<T> {
    /// There was room; nothing was evicted.
    Inserted,
    /// The element got in and pushed out the returned one.
    Replaced(T),
    /// The queue was full and the element did not beat the threshold.
    Rejected(T),
}

impl<T> Admission<T> {
    pub fn is_admitted(&self) -> bool {
        !matches!(self, Admission::Rejected(_))
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, Admission::Rejected(_))
    }
}

// `seq` keeps equal items distinct inside the set.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct Entry<T> {
    item: T,
    seq: u64,
}

struct Inner<T> {
    entries: BTreeSet<Entry<T>>,
    next_seq: u64,
}

impl<T: Ord> Inner<T> {
    fn insert(&mut self, item: T) {
        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        self.entries.insert(Entry { item, seq });
    }

    fn best(&self, retain: Retain) -> Option<&T> {
        match retain {
            Retain::Smallest => self.entries.first(),
            Retain::Largest => self.entries.last(),
        }
        .map(|e| &e.item)
    }

    fn worst(&self, retain: Retain) -> Option<&T> {
        match retain {
            Retain::Smallest => self.entries.last(),
            Retain::Largest => self.entries.first(),
        }
        .map(|e| &e.item)
    }

    fn pop_best(&mut self, retain: Retain) -> Option<T> {
        match retain {
            Retain::Smallest => self.entries.pop_first(),
            Retain::Largest => self.entries.pop_last(),
        }
        .map(|e| e.item)
    }

    fn pop_worst(&mut self, retain: Retain) -> Option<T> {
        match retain {
            Retain::Smallest => self.entries.pop_last(),
            Retain::Largest => self.entries.pop_first(),
        }
        .map(|e| e.item)
    }

    fn into_sorted(self, retain: Retain) -> Vec<T> {
        let items = self.entries.into_iter().map(|e| e.item);
        match retain {
            Retain::Smallest => items.collect(),
            Retain::Largest => items.rev().collect(),
        }
    }
}

pub struct BoundedPriorityQueue<T> {
    inner: Mutex<Inner<T>>,
    not_empty: Condvar,
    retain: Retain,
    capacity: Option<usize>,
}

impl<T: Ord> BoundedPriorityQueue<T> {
    /// Creates an empty queue. `capacity: None` disables admission control.
    pub fn new(retain: Retain, capacity: Option<usize>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: BTreeSet::new(),
                next_seq: 0,
            }),
            not_empty: Condvar::new(),
            retain,
            capacity,
        }
    }

    /// Keeps the `capacity` smallest elements.
    pub fn smallest(capacity: usize) -> Self {
        Self::new(Retain::Smallest, Some(capacity))
    }

    /// Keeps the `capacity` largest elements.
    pub fn largest(capacity: usize) -> Self {
        Self::new(Retain::Largest, Some(capacity))
    }

    pub fn unbounded(retain: Retain) -> Self {
        Self::new(retain, None)
    }

    pub fn with_default_capacity(retain: Retain) -> Self {
        Self::new(retain, Some(DEFAULT_QUEUE_CAPACITY))
    }

    /// Offers `item` to the queue.
    ///
    /// Below capacity the item is always inserted. At capacity it replaces
    /// the current [`threshold`](Self::threshold) only if it is strictly
    /// better; otherwise it is handed back as [`Admission::Rejected`].
    pub fn push(&self, item: T) -> Admission<T> {
        let mut inner = self.inner.lock();

        let admission = match self.capacity {
            Some(cap) if inner.entries.len() >= cap => {
                let better = inner
                    .worst(self.retain)
                    .map_or(false, |worst| self.retain.prefers(&item, worst));
                if !better {
                    return Admission::Rejected(item);
                }
                match inner.pop_worst(self.retain) {
                    Some(evicted) => Admission::Replaced(evicted),
                    None => Admission::Inserted,
                }
            }
            _ => Admission::Inserted,
        };

        inner.insert(item);
        drop(inner);
        self.not_empty.notify_one();
        admission
    }

    /// Removes and returns the extreme element, waiting while the queue is empty.
    pub fn pop(&self) -> T {
        let mut inner = self.inner.lock();
        loop {
            if let Some(item) = inner.pop_best(self.retain) {
                return item;
            }
            self.not_empty.wait(&mut inner);
        }
    }

    pub fn try_pop(&self) -> Option<T> {
        self.inner.lock().pop_best(self.retain)
    }

    /// Like [`pop`](Self::pop) but gives up after `timeout`. A timeout too
    /// large to represent as a deadline waits without limit.
    pub fn pop_timeout(&self, timeout: Duration) -> Option<T> {
        let deadline = match Instant::now().checked_add(timeout) {
            Some(deadline) => deadline,
            None => return Some(self.pop()),
        };
        let mut inner = self.inner.lock();
        loop {
            if let Some(item) = inner.pop_best(self.retain) {
                return Some(item);
            }
            if self.not_empty.wait_until(&mut inner, deadline).timed_out() {
                return inner.pop_best(self.retain);
            }
        }
    }

    /// Removes every element and returns them in pop order.
    pub fn drain_sorted(&self) -> Vec<T> {
        let mut inner = self.inner.lock();
        let taken = Inner {
            entries: std::mem::take(&mut inner.entries),
            next_seq: 0,
        };
        drop(inner);
        taken.into_sorted(self.retain)
    }

    pub fn into_sorted_vec(self) -> Vec<T> {
        let retain = self.retain;
        self.inner.into_inner().into_sorted(retain)
    }

    pub fn clear(&self) {
        self.inner.lock().entries.clear();
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }

    /// Always false for an unbounded queue.
    pub fn is_full(&self) -> bool {
        match self.capacity {
            Some(cap) => self.inner.lock().entries.len() >= cap,
            None => false,
        }
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    pub fn retain(&self) -> Retain {
        self.retain
    }
}

impl<T: Ord + Clone> BoundedPriorityQueue<T> {
    /// Peeks at the element the next [`pop`](Self::pop) would return.
    pub fn top(&self) -> Option<T> {
        self.inner.lock().best(self.retain).cloned()
    }

    /// Peeks at the worst retained element, the one the next successful
    /// push into a full queue would evict.
    pub fn threshold(&self) -> Option<T> {
        self.inner.lock().worst(self.retain).cloned()
    }
}

impl<T> fmt::Debug for BoundedPriorityQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedPriorityQueue")
            .field("retain", &self.retain)
            .field("capacity", &self.capacity)
            .field("len", &self.inner.lock().entries.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_largest_k_scenario() {
        let queue = BoundedPriorityQueue::largest(3);
        for x in [5, 1, 9, 2, 7] {
            queue.push(x);
        }

        assert_eq!(queue.len(), 3);
        assert!(queue.is_full());
        assert_eq!(queue.pop(), 9);
        assert_eq!(queue.pop(), 7);
        assert_eq!(queue.pop(), 5);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_smallest_k_keeps_smallest() {
        let queue = BoundedPriorityQueue::smallest(3);
        for x in [5, 1, 9, 2, 7, 0] {
            queue.push(x);
        }

        assert_eq!(queue.threshold(), Some(2));
        assert_eq!(queue.top(), Some(0));
        assert_eq!(queue.drain_sorted(), vec![0, 1, 2]);
    }

    #[test]
    fn test_admission_outcomes() {
        let queue = BoundedPriorityQueue::smallest(2);
        assert_eq!(queue.push(4), Admission::Inserted);
        assert_eq!(queue.push(8), Admission::Inserted);
        assert_eq!(queue.push(6), Admission::Replaced(8));
        assert_eq!(queue.push(9), Admission::Rejected(9));
        assert!(queue.push(6).is_rejected());
        assert_eq!(queue.into_sorted_vec(), vec![4, 6]);
    }

    #[test]
    fn test_equal_to_threshold_is_dropped() {
        let queue = BoundedPriorityQueue::largest(2);
        queue.push(3);
        queue.push(5);
        assert!(queue.push(3).is_rejected());
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_zero_capacity_retains_nothing() {
        let queue = BoundedPriorityQueue::smallest(0);
        for x in 0..10 {
            assert!(queue.push(x).is_rejected());
        }
        assert!(queue.is_empty());
        assert!(queue.is_full());
        assert_eq!(queue.try_pop(), None);
    }

    #[test]
    fn test_unbounded_keeps_everything() {
        let queue = BoundedPriorityQueue::unbounded(Retain::Largest);
        for x in 0..1000 {
            assert_eq!(queue.push(x), Admission::Inserted);
        }
        assert_eq!(queue.len(), 1000);
        assert!(!queue.is_full());
        assert_eq!(queue.capacity(), None);
        assert_eq!(queue.pop(), 999);
    }

    #[test]
    fn test_default_capacity() {
        let queue: BoundedPriorityQueue<u32> =
            BoundedPriorityQueue::with_default_capacity(Retain::Smallest);
        assert_eq!(queue.capacity(), Some(DEFAULT_QUEUE_CAPACITY));
    }

    #[test]
    fn test_duplicates_are_kept() {
        let queue = BoundedPriorityQueue::unbounded(Retain::Smallest);
        for x in [2, 1, 2, 1] {
            queue.push(x);
        }
        assert_eq!(queue.drain_sorted(), vec![1, 1, 2, 2]);
    }

    #[test]
    fn test_try_pop_and_peek_on_empty() {
        let queue: BoundedPriorityQueue<i64> = BoundedPriorityQueue::largest(4);
        assert_eq!(queue.try_pop(), None);
        assert_eq!(queue.top(), None);
        assert_eq!(queue.threshold(), None);
    }

    #[test]
    fn test_pop_timeout() {
        let queue: BoundedPriorityQueue<i32> = BoundedPriorityQueue::smallest(4);
        assert_eq!(queue.pop_timeout(Duration::from_millis(20)), None);

        queue.push(3);
        assert_eq!(queue.pop_timeout(Duration::from_millis(20)), Some(3));
    }

    #[test]
    fn test_pop_timeout_huge_duration() {
        let queue = BoundedPriorityQueue::largest(4);
        queue.push(1);
        assert_eq!(queue.pop_timeout(Duration::MAX), Some(1));
    }

    #[test]
    fn test_clear() {
        let queue = BoundedPriorityQueue::largest(4);
        queue.push(1);
        queue.push(2);
        queue.clear();
        assert!(queue.is_empty());
        assert_eq!(queue.push(3), Admission::Inserted);
    }

    #[test]
    fn test_blocking_pop_wakes_on_push() {
        let queue = Arc::new(BoundedPriorityQueue::smallest(8));

        let consumer = {
            let queue = queue.clone();
            thread::spawn(move || queue.pop())
        };

        thread::sleep(Duration::from_millis(20));
        queue.push(42);
        assert_eq!(consumer.join().unwrap(), 42);
    }

    #[test]
    fn test_debug_output() {
        let queue = BoundedPriorityQueue::largest(3);
        queue.push(1);
        let rendered = format!("{:?}", queue);
        assert!(rendered.contains("Largest"));
        assert!(rendered.contains("len: 1"));
    }
}
