//! Queue configuration.

use std::path::PathBuf;

use crate::error::{QueueError, QueueResult};

/// Default permission bits for the queue folder and segment files.
pub const DEFAULT_FILE_MODE: u32 = 0o755;

/// Default number of items per segment.
pub const DEFAULT_SEGMENT_CAPACITY: usize = 1024;

/// Configuration for opening a queue.
///
/// `folder_path` and `codec` are required; the rest have defaults. The
/// builder setters consume and return `self`:
///
/// ```
/// use conveyor_codec::Utf8Codec;
/// use conveyor_core::QueueOptions;
///
/// let options = QueueOptions::new("/tmp/my-queue", Utf8Codec)
///     .max_objects_per_segment(64)
///     .always_flush(true);
/// assert_eq!(options.max_objects_per_segment, 64);
/// ```
#[derive(Debug, Clone)]
pub struct QueueOptions<C> {
    /// Directory holding the segment files. Created on open if absent.
    pub folder_path: PathBuf,

    /// POSIX permission bits applied when creating the folder and segment
    /// files. Ignored on non-unix platforms.
    pub file_mode: u32,

    /// Capacity stamped into segments created by this queue instance.
    ///
    /// Segments already on disk keep the capacity they were created with;
    /// this value only affects new segments.
    pub max_objects_per_segment: usize,

    /// Whether to fsync after every successful write-side operation.
    ///
    /// When false, durability before [`Queue::close`](crate::Queue::close)
    /// is best-effort at the OS's discretion.
    pub always_flush: bool,

    /// Codec used to marshal items to segment frames and back.
    pub codec: C,
}

impl<C> QueueOptions<C> {
    /// Creates options with the given folder and codec, and defaults for
    /// everything else.
    pub fn new(folder_path: impl Into<PathBuf>, codec: C) -> Self {
        Self {
            folder_path: folder_path.into(),
            file_mode: DEFAULT_FILE_MODE,
            max_objects_per_segment: DEFAULT_SEGMENT_CAPACITY,
            always_flush: false,
            codec,
        }
    }

    /// Sets the permission bits for folder and segment file creation.
    #[must_use]
    pub fn file_mode(mut self, mode: u32) -> Self {
        self.file_mode = mode;
        self
    }

    /// Sets the capacity for newly created segments.
    #[must_use]
    pub fn max_objects_per_segment(mut self, capacity: usize) -> Self {
        self.max_objects_per_segment = capacity;
        self
    }

    /// Sets whether to fsync after every write-side operation.
    #[must_use]
    pub fn always_flush(mut self, value: bool) -> Self {
        self.always_flush = value;
        self
    }

    /// Checks the options for values the engine cannot operate with.
    pub(crate) fn validate(&self) -> QueueResult<()> {
        if self.max_objects_per_segment == 0 {
            return Err(QueueError::invalid_options(
                "max_objects_per_segment must be at least 1",
            ));
        }
        if self.max_objects_per_segment > u32::MAX as usize {
            return Err(QueueError::invalid_options(
                "max_objects_per_segment exceeds the segment header range",
            ));
        }
        Ok(())
    }
}
