//! Test fixtures and queue helpers.
//!
//! Provides temporary queue folders that survive close/reopen cycles
//! within a test, plus helpers for inspecting the segment files on disk.

use std::path::Path;

use conveyor_codec::Utf8Codec;
use conveyor_core::{Queue, QueueOptions};
use tempfile::TempDir;

/// The queue type used throughout the testkit: string items, UTF-8 codec.
pub type StringQueue = Queue<String, Utf8Codec>;

/// A temporary folder for queue tests, with automatic cleanup.
///
/// The folder outlives any queue opened on it, so tests can close (or
/// drop) a queue and reopen the same folder to exercise recovery.
pub struct QueueFolder {
    temp_dir: TempDir,
    capacity: usize,
    always_flush: bool,
}

impl QueueFolder {
    /// Creates a fresh temporary folder with the given segment capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            temp_dir: TempDir::new().expect("failed to create temp directory"),
            capacity,
            always_flush: false,
        }
    }

    /// Sets whether queues opened on this folder fsync every write.
    #[must_use]
    pub fn always_flush(mut self, value: bool) -> Self {
        self.always_flush = value;
        self
    }

    /// Changes the capacity used for subsequently opened queues.
    ///
    /// Segments already on disk keep their stamped capacity; this only
    /// affects segments the next queue instance creates.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
    }

    /// Returns the folder path.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Builds queue options for this folder.
    pub fn options(&self) -> QueueOptions<Utf8Codec> {
        QueueOptions::new(self.path(), Utf8Codec)
            .max_objects_per_segment(self.capacity)
            .always_flush(self.always_flush)
    }

    /// Opens a queue on this folder.
    pub fn open(&self) -> StringQueue {
        Queue::open(self.options()).expect("failed to open queue")
    }

    /// Returns the segment numbers currently present on disk, sorted.
    pub fn segment_numbers(&self) -> Vec<u64> {
        let mut numbers: Vec<u64> = std::fs::read_dir(self.path())
            .expect("failed to read queue folder")
            .filter_map(|entry| {
                let entry = entry.expect("failed to read directory entry");
                let name = entry.file_name();
                let name = name.to_str()?;
                let digits = name.strip_suffix(".queue")?;
                digits.parse().ok()
            })
            .collect();
        numbers.sort_unstable();
        numbers
    }
}

/// Runs a test body against a queue on a fresh temporary folder.
///
/// # Example
///
/// ```rust
/// use conveyor_testkit::fixtures::with_temp_queue;
///
/// with_temp_queue(2, |queue| {
///     queue.enqueue("a".to_string()).unwrap();
///     assert_eq!(queue.dequeue().unwrap(), "a");
/// });
/// ```
pub fn with_temp_queue<F, R>(capacity: usize, f: F) -> R
where
    F: FnOnce(&StringQueue) -> R,
{
    let folder = QueueFolder::new(capacity);
    let queue = folder.open();
    f(&queue)
}
