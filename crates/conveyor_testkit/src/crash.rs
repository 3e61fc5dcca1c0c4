//! Crash recovery testing for the queue.
//!
//! A "crash" here is the loss of all in-memory state without a clean
//! close: the queue value is dropped, leaving only whatever reached disk,
//! and a fresh queue is opened on the same folder. With `always_flush`
//! enabled, every enqueue that returned success must survive this.

use crate::fixtures::{QueueFolder, StringQueue};

/// Drives crash/reopen cycles against one queue folder.
///
/// # Example
///
/// ```rust
/// use conveyor_testkit::crash::CrashHarness;
///
/// let harness = CrashHarness::new(2);
/// let queue = harness.open();
/// queue.enqueue("a".to_string()).unwrap();
/// let queue = harness.crash(queue);
/// assert_eq!(queue.dequeue().unwrap(), "a");
/// ```
pub struct CrashHarness {
    folder: QueueFolder,
}

impl CrashHarness {
    /// Creates a harness with the given segment capacity.
    ///
    /// Queues opened by the harness run with `always_flush` enabled, so
    /// every successful write-side operation is durable at the moment it
    /// returns.
    pub fn new(capacity: usize) -> Self {
        Self {
            folder: QueueFolder::new(capacity).always_flush(true),
        }
    }

    /// Opens a queue on the harness folder.
    pub fn open(&self) -> StringQueue {
        self.folder.open()
    }

    /// Simulates a crash: drops the queue without closing it and reopens
    /// the folder.
    pub fn crash(&self, queue: StringQueue) -> StringQueue {
        drop(queue);
        self.folder.open()
    }

    /// Returns the underlying folder for on-disk assertions.
    pub fn folder(&self) -> &QueueFolder {
        &self.folder
    }

    /// Dequeues every live item, asserting the queue then reports empty.
    pub fn drain_all(&self, queue: &StringQueue) -> Vec<String> {
        let mut items = Vec::new();
        loop {
            match queue.dequeue() {
                Ok(item) => items.push(item),
                Err(e) if e.is_empty_error() => break,
                Err(e) => panic!("unexpected error while draining: {e}"),
            }
        }
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enqueues_survive_crash() {
        let harness = CrashHarness::new(2);
        let queue = harness.open();
        for item in ["a", "b", "c"] {
            queue.enqueue(item.to_string()).unwrap();
        }

        let queue = harness.crash(queue);
        assert_eq!(harness.drain_all(&queue), vec!["a", "b", "c"]);
    }

    #[test]
    fn consumed_items_stay_consumed_after_crash() {
        let harness = CrashHarness::new(2);
        let queue = harness.open();
        for item in ["a", "b", "c"] {
            queue.enqueue(item.to_string()).unwrap();
        }
        assert_eq!(queue.dequeue().unwrap(), "a");

        let queue = harness.crash(queue);
        assert_eq!(harness.drain_all(&queue), vec!["b", "c"]);
    }
}
