//! The durable FIFO queue.
//!
//! A queue is an ordered list of segments identified by a strictly
//! increasing number. Two segments are active at any time: the *head*
//! (being drained) and the *tail* (being appended to); between them lie
//! zero or more full segments, closed on disk. Head and tail are the same
//! instance when the queue fits in one segment.
//!
//! ## Recovery
//!
//! Opening a queue lists its folder, matches entries against the segment
//! filename pattern, and rebuilds head and tail from the minimum- and
//! maximum-numbered files. Middle segments are left untouched until the
//! head drains down to them. Gaps in the numbering are tolerated.

use std::fs::DirBuilder;
use std::path::Path;
use std::sync::Arc;

use conveyor_codec::Codec;
use parking_lot::Mutex;
use tracing::debug;

use crate::error::{QueueError, QueueResult};
use crate::options::QueueOptions;
use crate::segment::{Segment, SEGMENT_FILENAME};

/// A durable, persistent FIFO queue backed by segment files.
///
/// Thread-safe: all public operations acquire the queue's mutex for their
/// full duration, so concurrent callers see a strict serial order. The
/// folder is owned by this instance for its lifetime; opening a second
/// queue on the same folder is not supported.
///
/// # Example
///
/// ```no_run
/// use conveyor_codec::Utf8Codec;
/// use conveyor_core::{Queue, QueueOptions};
///
/// let queue = Queue::open(QueueOptions::new("/var/lib/app/outbox", Utf8Codec)).unwrap();
/// queue.enqueue("first".to_string()).unwrap();
/// assert_eq!(queue.dequeue().unwrap(), "first");
/// ```
pub struct Queue<T, C> {
    options: Arc<QueueOptions<C>>,
    inner: Mutex<QueueInner<T, C>>,
}

struct QueueInner<T, C> {
    head: Arc<Segment<T, C>>,
    tail: Arc<Segment<T, C>>,
    /// The tail's segment number; the largest ever used by this queue.
    segment_number: u64,
}

impl<T, C: Codec<T>> Queue<T, C> {
    /// Opens the queue at `options.folder_path`, creating the folder and
    /// the first segment if the folder is empty.
    ///
    /// With existing segment files, the minimum-numbered file becomes the
    /// head and the maximum-numbered the tail; both are fully replayed.
    ///
    /// # Errors
    ///
    /// Fails on invalid options, on I/O errors, or with
    /// [`QueueError::CorruptSegment`] if replay of the head or tail finds a
    /// structural violation.
    pub fn open(options: QueueOptions<C>) -> QueueResult<Self> {
        options.validate()?;
        let options = Arc::new(options);
        create_folder(&options.folder_path, options.file_mode)?;

        let range = scan_segment_numbers(&options.folder_path)?;
        let inner = match range {
            None => {
                let segment = Arc::new(Segment::create(1, Arc::clone(&options))?);
                QueueInner {
                    head: Arc::clone(&segment),
                    tail: segment,
                    segment_number: 1,
                }
            }
            Some((min, max)) if min == max => {
                let segment = Arc::new(Segment::open(min, Arc::clone(&options))?);
                QueueInner {
                    head: Arc::clone(&segment),
                    tail: segment,
                    segment_number: min,
                }
            }
            Some((min, max)) => {
                let head = Arc::new(Segment::open(min, Arc::clone(&options))?);
                let tail = Arc::new(Segment::open(max, Arc::clone(&options))?);
                QueueInner {
                    head,
                    tail,
                    segment_number: max,
                }
            }
        };
        debug!(
            folder = %options.folder_path.display(),
            head = inner.head.number(),
            tail = inner.tail.number(),
            "opened queue"
        );
        Ok(Self {
            options,
            inner: Mutex::new(inner),
        })
    }

    /// Appends one item to the back of the queue.
    ///
    /// Rolls over to a new tail segment first if the current tail is full.
    /// When the call returns with `always_flush` enabled, the item's bytes
    /// are fsynced.
    pub fn enqueue(&self, item: T) -> QueueResult<()> {
        let mut inner = self.inner.lock();
        if inner.tail.count_on_disk() >= inner.tail.capacity() {
            self.roll_tail(&mut inner)?;
        }
        inner.tail.add(item)
    }

    /// Appends a batch of items in input order, rolling over segment
    /// boundaries as needed.
    ///
    /// A failure mid-batch surfaces the error; items appended before the
    /// failure stay in the queue.
    pub fn enqueue_many(&self, items: Vec<T>) -> QueueResult<()> {
        let mut rest = items;
        let mut inner = self.inner.lock();
        while !rest.is_empty() {
            if inner.tail.count_on_disk() >= inner.tail.capacity() {
                self.roll_tail(&mut inner)?;
            }
            let room = inner.tail.capacity() - inner.tail.count_on_disk();
            let take = room.min(rest.len());
            let batch: Vec<T> = rest.drain(..take).collect();
            inner.tail.add_many(batch)?;
        }
        Ok(())
    }

    /// Removes and returns the oldest item in the queue.
    ///
    /// If the head segment is fully drained afterwards, its file is
    /// deleted and the head advances to the next segment.
    ///
    /// # Errors
    ///
    /// Fails with [`QueueError::Empty`] if the queue has no live items.
    pub fn dequeue(&self) -> QueueResult<T> {
        let mut inner = self.inner.lock();
        let item = inner.head.remove()?;
        if head_drained(&inner) {
            self.advance_head(&mut inner)?;
        }
        Ok(item)
    }

    /// Removes and returns up to `n` of the oldest items, in FIFO order,
    /// crossing segment boundaries as needed.
    ///
    /// Returns fewer than `n` items if the queue runs out.
    ///
    /// # Errors
    ///
    /// Fails with [`QueueError::Empty`] if the queue has no live items at
    /// all.
    pub fn dequeue_many(&self, n: usize) -> QueueResult<Vec<T>> {
        let mut inner = self.inner.lock();
        let mut items = Vec::new();
        let mut remaining = n;
        while remaining > 0 {
            let batch = match inner.head.remove_many(remaining) {
                Ok(batch) => batch,
                Err(QueueError::Empty) => {
                    if items.is_empty() {
                        return Err(QueueError::Empty);
                    }
                    break;
                }
                Err(e) => return Err(e),
            };
            remaining -= batch.len();
            items.extend(batch);
            if head_drained(&inner) {
                self.advance_head(&mut inner)?;
            } else if remaining > 0 {
                // Head still has room to fill: the queue is exhausted.
                break;
            }
        }
        Ok(items)
    }

    /// Syncs and closes the head and tail segment files.
    pub fn close(&self) -> QueueResult<()> {
        let inner = self.inner.lock();
        inner.head.close()?;
        if !Arc::ptr_eq(&inner.head, &inner.tail) {
            inner.tail.close()?;
        }
        Ok(())
    }

    /// Replaces a full tail with a freshly created segment.
    ///
    /// The old tail is closed unless it is also the head.
    fn roll_tail(&self, inner: &mut QueueInner<T, C>) -> QueueResult<()> {
        if !Arc::ptr_eq(&inner.head, &inner.tail) {
            inner.tail.close()?;
        }
        let next = inner.segment_number + 1;
        let segment = Arc::new(Segment::create(next, Arc::clone(&self.options))?);
        inner.segment_number = next;
        inner.tail = segment;
        debug!(segment = next, "rolled over to new tail segment");
        Ok(())
    }

    /// Deletes the drained head segment and advances to its successor.
    fn advance_head(&self, inner: &mut QueueInner<T, C>) -> QueueResult<()> {
        let span = inner.tail.number() - inner.head.number() + 1;
        let drained = inner.head.number();
        inner.head.delete()?;
        if span == 1 {
            // Head was also the tail: start over with a fresh segment.
            let next = inner.segment_number + 1;
            let segment = Arc::new(Segment::create(next, Arc::clone(&self.options))?);
            inner.segment_number = next;
            inner.head = Arc::clone(&segment);
            inner.tail = segment;
        } else if span == 2 {
            inner.head = Arc::clone(&inner.tail);
        } else {
            let segment = Arc::new(Segment::open(drained + 1, Arc::clone(&self.options))?);
            inner.head = segment;
        }
        debug!(
            deleted = drained,
            head = inner.head.number(),
            "advanced head segment"
        );
        Ok(())
    }
}

impl<T, C> std::fmt::Debug for Queue<T, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("Queue")
            .field("head", &inner.head.number())
            .field("tail", &inner.tail.number())
            .finish_non_exhaustive()
    }
}

fn head_drained<T, C>(inner: &QueueInner<T, C>) -> bool {
    inner.head.count() == 0 && inner.head.count_on_disk() >= inner.head.capacity()
}

fn create_folder(folder: &Path, file_mode: u32) -> QueueResult<()> {
    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(file_mode);
    }
    #[cfg(not(unix))]
    let _ = file_mode;
    builder.create(folder)?;
    Ok(())
}

/// Scans the folder for segment files, returning the minimum and maximum
/// segment numbers present, or `None` if there are none.
///
/// Directories and entries that do not match the segment filename pattern
/// are ignored.
fn scan_segment_numbers(folder: &Path) -> QueueResult<Option<(u64, u64)>> {
    let mut range: Option<(u64, u64)> = None;
    for entry in std::fs::read_dir(folder)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        let Some(captures) = SEGMENT_FILENAME.captures(name) else {
            continue;
        };
        let Ok(number) = captures[1].parse::<u64>() else {
            continue;
        };
        range = Some(match range {
            None => (number, number),
            Some((min, max)) => (min.min(number), max.max(number)),
        });
    }
    Ok(range)
}
