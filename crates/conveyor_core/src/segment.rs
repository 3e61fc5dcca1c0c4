//! Append-only queue segments.
//!
//! A segment is one file on disk holding up to *capacity* items plus the
//! tombstones recording their removal. Frames are only ever appended;
//! nothing in the file is rewritten or moved.
//!
//! ## Segment File Format
//!
//! ```text
//! | capacity (4, u32-le) | frame | frame | ...
//!
//! frame := item frame:      | length (4, u32-le, > 0) | payload (length) |
//!        | tombstone frame: | 00 00 00 00 |
//! ```
//!
//! The capacity header is stamped when the segment is created and read back
//! on load, so segments written under an older `max_objects_per_segment`
//! keep their original capacity for room and drain arithmetic.
//!
//! The Kth tombstone marks the Kth item frame as removed. Replay walks the
//! frames from the start, appending items to the live buffer and popping
//! the front for each tombstone; any structural violation (short frame,
//! tombstone with nothing left to remove, more frames than capacity) fails
//! with [`QueueError::CorruptSegment`].

use std::collections::VecDeque;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use conveyor_codec::{Codec, CodecError};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use regex::Regex;
use tracing::{debug, trace};

use crate::error::{QueueError, QueueResult};
use crate::options::QueueOptions;

/// Size of a frame length word; also the size of a tombstone frame.
const FRAME_LEN_SIZE: usize = 4;

/// Size of the per-segment capacity header.
const HEADER_SIZE: usize = 4;

/// One tombstone frame.
const TOMBSTONE: [u8; FRAME_LEN_SIZE] = [0; FRAME_LEN_SIZE];

/// Pattern a directory entry must match to count as a segment file.
///
/// Writes always use the zero-padded [`segment_file_name`] format, but
/// recovery accepts any digit width.
pub(crate) static SEGMENT_FILENAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)\.queue").expect("segment filename pattern must compile"));

/// Formats the on-disk file name for a segment number.
pub(crate) fn segment_file_name(number: u64) -> String {
    format!("{number:05}.queue")
}

/// An append-only segment of the queue.
///
/// Holds the live-item buffer and removal count in memory, mirroring the
/// frames on disk. All public operations acquire the segment's internal
/// mutex for their full duration.
pub struct Segment<T, C> {
    options: Arc<QueueOptions<C>>,
    number: u64,
    capacity: usize,
    inner: Mutex<SegmentInner<T>>,
}

struct SegmentInner<T> {
    /// Open append handle; `None` once the segment is closed.
    file: Option<File>,
    live: VecDeque<T>,
    remove_count: usize,
}

impl<T, C: Codec<T>> Segment<T, C> {
    /// Creates a new empty segment file, truncating any existing file with
    /// the same number.
    ///
    /// The current `max_objects_per_segment` is stamped into the file
    /// header as this segment's capacity.
    pub fn create(number: u64, options: Arc<QueueOptions<C>>) -> QueueResult<Self> {
        let capacity = options.max_objects_per_segment;
        let path = segment_path(&options.folder_path, number);
        let mut file = open_for_append(&path, options.file_mode, true)?;
        file.write_all(&(capacity as u32).to_le_bytes())?;
        if options.always_flush {
            file.sync_all()?;
        }
        debug!(segment = number, capacity, "created segment");
        Ok(Self {
            options,
            number,
            capacity,
            inner: Mutex::new(SegmentInner {
                file: Some(file),
                live: VecDeque::new(),
                remove_count: 0,
            }),
        })
    }

    /// Opens an existing segment file, replaying its frames to rebuild the
    /// live-item buffer and removal count.
    ///
    /// After a successful scan the file is reopened in append mode.
    ///
    /// # Errors
    ///
    /// Fails with [`QueueError::CorruptSegment`] on any structural
    /// violation: a missing or zero capacity header, a short length word or
    /// payload, a tombstone with no live item left to remove, more frames
    /// than the capacity admits, or a payload the codec cannot unmarshal.
    pub fn open(number: u64, options: Arc<QueueOptions<C>>) -> QueueResult<Self> {
        let path = segment_path(&options.folder_path, number);
        let mut reader = BufReader::new(File::open(&path)?);

        let mut header = [0u8; HEADER_SIZE];
        if read_full(&mut reader, &mut header)? < HEADER_SIZE {
            return Err(QueueError::corrupt_segment(format!(
                "segment {number}: missing capacity header"
            )));
        }
        let capacity = u32::from_le_bytes(header) as usize;
        if capacity == 0 {
            return Err(QueueError::corrupt_segment(format!(
                "segment {number}: capacity header is zero"
            )));
        }

        let mut live = VecDeque::new();
        let mut remove_count = 0usize;
        loop {
            let mut len_buf = [0u8; FRAME_LEN_SIZE];
            let read = read_full(&mut reader, &mut len_buf)?;
            if read == 0 {
                break;
            }
            if read < FRAME_LEN_SIZE {
                return Err(QueueError::corrupt_segment(format!(
                    "segment {number}: truncated length word ({read} of {FRAME_LEN_SIZE} bytes)"
                )));
            }
            let length = u32::from_le_bytes(len_buf) as usize;
            if length == 0 {
                if live.pop_front().is_none() {
                    return Err(QueueError::corrupt_segment(format!(
                        "segment {number}: tombstone with no live item to remove"
                    )));
                }
                remove_count += 1;
            } else {
                let mut payload = vec![0u8; length];
                let read = read_full(&mut reader, &mut payload)?;
                if read < length {
                    return Err(QueueError::corrupt_segment(format!(
                        "segment {number}: truncated item frame ({read} of {length} bytes)"
                    )));
                }
                let item = options.codec.unmarshal(&payload).map_err(|e| {
                    QueueError::corrupt_segment(format!(
                        "segment {number}: failed to unmarshal item: {e}"
                    ))
                })?;
                live.push_back(item);
            }
        }

        if live.len() + remove_count > capacity {
            return Err(QueueError::corrupt_segment(format!(
                "segment {number}: {} frames exceed capacity {capacity}",
                live.len() + remove_count
            )));
        }

        drop(reader);
        let file = open_for_append(&path, options.file_mode, false)?;
        Ok(Self {
            options,
            number,
            capacity,
            inner: Mutex::new(SegmentInner {
                file: Some(file),
                live,
                remove_count,
            }),
        })
    }

    /// Appends one item to the segment.
    ///
    /// The item is marshalled, written as a single length-prefixed frame,
    /// and appended to the live buffer. With `always_flush` the file is
    /// fsynced before returning.
    pub fn add(&self, item: T) -> QueueResult<()> {
        let mut inner = self.inner.lock();
        self.write_item_frame(&mut inner, &item)?;
        inner.live.push_back(item);
        if self.options.always_flush {
            flush(&mut inner)?;
        }
        Ok(())
    }

    /// Appends a batch of items in input order.
    ///
    /// Frames are written one by one; a failure mid-batch leaves the
    /// already-appended prefix in place, in memory and on disk. With
    /// `always_flush` a single fsync covers the whole batch.
    pub fn add_many(&self, items: Vec<T>) -> QueueResult<()> {
        let count = items.len();
        let mut inner = self.inner.lock();
        for item in items {
            self.write_item_frame(&mut inner, &item)?;
            inner.live.push_back(item);
        }
        if self.options.always_flush {
            flush(&mut inner)?;
        }
        trace!(segment = self.number, count, "appended item batch");
        Ok(())
    }

    /// Removes and returns the oldest live item.
    ///
    /// The item is popped from the live buffer first, then a tombstone
    /// frame is appended. If the tombstone write or flush fails the error
    /// is returned and the item stays consumed.
    ///
    /// # Errors
    ///
    /// Fails with [`QueueError::Empty`] if the segment has no live items.
    pub fn remove(&self) -> QueueResult<T> {
        let mut inner = self.inner.lock();
        if inner.file.is_none() {
            return Err(QueueError::Closed);
        }
        let item = match inner.live.pop_front() {
            Some(item) => item,
            None => return Err(QueueError::Empty),
        };
        file_mut(&mut inner)?.write_all(&TOMBSTONE)?;
        inner.remove_count += 1;
        if self.options.always_flush {
            flush(&mut inner)?;
        }
        Ok(item)
    }

    /// Removes and returns up to `n` of the oldest live items, in their
    /// original order.
    ///
    /// Returns fewer than `n` items if the segment runs out of live items.
    /// All tombstones for the batch are written as one contiguous write.
    ///
    /// # Errors
    ///
    /// Fails with [`QueueError::Empty`] if the segment has no live items.
    pub fn remove_many(&self, n: usize) -> QueueResult<Vec<T>> {
        let mut inner = self.inner.lock();
        if inner.file.is_none() {
            return Err(QueueError::Closed);
        }
        if inner.live.is_empty() {
            return Err(QueueError::Empty);
        }
        let take = n.min(inner.live.len());
        let mut items = Vec::with_capacity(take);
        for _ in 0..take {
            match inner.live.pop_front() {
                Some(item) => items.push(item),
                None => break,
            }
        }
        let tombstones = vec![0u8; items.len() * FRAME_LEN_SIZE];
        file_mut(&mut inner)?.write_all(&tombstones)?;
        inner.remove_count += items.len();
        if self.options.always_flush {
            flush(&mut inner)?;
        }
        Ok(items)
    }

    fn write_item_frame(&self, inner: &mut SegmentInner<T>, item: &T) -> QueueResult<()> {
        let payload = self.options.codec.marshal(item)?;
        if payload.is_empty() {
            return Err(CodecError::EmptyPayload.into());
        }
        let length = u32::try_from(payload.len()).map_err(|_| {
            CodecError::marshal_failed(format!(
                "payload of {} bytes exceeds the frame length range",
                payload.len()
            ))
        })?;
        let mut frame = Vec::with_capacity(FRAME_LEN_SIZE + payload.len());
        frame.extend_from_slice(&length.to_le_bytes());
        frame.extend_from_slice(&payload);
        file_mut(inner)?.write_all(&frame)?;
        Ok(())
    }
}

impl<T, C> Segment<T, C> {
    /// Returns the number of live items.
    pub fn count(&self) -> usize {
        self.inner.lock().live.len()
    }

    /// Returns the number of item frames on disk: live items plus
    /// tombstones.
    pub fn count_on_disk(&self) -> usize {
        let inner = self.inner.lock();
        inner.live.len() + inner.remove_count
    }

    /// Returns this segment's number.
    pub fn number(&self) -> u64 {
        self.number
    }

    /// Returns the capacity this segment was created with.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Syncs and closes the segment file. Idempotent.
    pub fn close(&self) -> QueueResult<()> {
        let mut inner = self.inner.lock();
        if let Some(file) = inner.file.take() {
            file.sync_all()?;
        }
        Ok(())
    }

    /// Closes the segment file and removes it from disk.
    pub fn delete(&self) -> QueueResult<()> {
        let mut inner = self.inner.lock();
        inner.file = None;
        fs::remove_file(self.file_path())?;
        debug!(segment = self.number, "deleted segment file");
        Ok(())
    }

    fn file_path(&self) -> PathBuf {
        segment_path(&self.options.folder_path, self.number)
    }
}

impl<T, C> std::fmt::Debug for Segment<T, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Segment")
            .field("number", &self.number)
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

pub(crate) fn segment_path(folder: &Path, number: u64) -> PathBuf {
    folder.join(segment_file_name(number))
}

fn file_mut<T>(inner: &mut SegmentInner<T>) -> QueueResult<&mut File> {
    inner.file.as_mut().ok_or(QueueError::Closed)
}

fn flush<T>(inner: &mut SegmentInner<T>) -> QueueResult<()> {
    file_mut(inner)?.sync_all()?;
    Ok(())
}

fn open_for_append(path: &Path, file_mode: u32, create: bool) -> io::Result<File> {
    let mut options = OpenOptions::new();
    if create {
        // `truncate` requires plain write access; it cannot be combined
        // with `append`. A freshly created/truncated file's cursor starts
        // at 0, so sequential writes through this sole handle land at the
        // same offsets append mode would produce.
        options.write(true).create(true).truncate(true);
    } else {
        options.append(true);
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(file_mode);
    }
    #[cfg(not(unix))]
    let _ = file_mode;
    options.open(path)
}

/// Reads as many bytes as possible into `buf`, stopping at EOF.
///
/// Unlike `read_exact` the caller can tell a clean EOF at a frame boundary
/// (0 bytes read) apart from a short read mid-frame.
fn read_full(reader: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
