//! # Conveyor Core
//!
//! A durable, persistent FIFO queue embedded as a library.
//!
//! Items are persisted to a local folder as an append-only log partitioned
//! into fixed-capacity segment files. The queue survives process restarts
//! and supports single and batch enqueue/dequeue over a host-supplied item
//! type with a pluggable binary codec.
//!
//! ## On-Disk Layout
//!
//! ```text
//! <folder>/
//! ├─ 00001.queue     # oldest segment (head)
//! ├─ 00002.queue
//! └─ 00003.queue     # newest segment (tail)
//! ```
//!
//! Each segment file starts with a 4-byte capacity header followed by
//! length-prefixed item frames and 4-byte zero tombstones marking
//! removals, in append order. See [`segment`] for the exact format.
//!
//! ## Invariants
//!
//! - Segment files are **append-only**; removal is a tombstone, never a
//!   rewrite
//! - Dequeues return items in strict FIFO order across segment boundaries
//! - A segment file is deleted only once fully drained, and its number is
//!   never reused
//! - With `always_flush`, an enqueue that returned success is durable
//!
//! ## Example
//!
//! ```no_run
//! use conveyor_codec::Utf8Codec;
//! use conveyor_core::{Queue, QueueOptions};
//!
//! let options = QueueOptions::new("/var/lib/app/outbox", Utf8Codec)
//!     .max_objects_per_segment(1024)
//!     .always_flush(true);
//! let queue = Queue::open(options).unwrap();
//!
//! queue.enqueue_many(vec!["a".into(), "b".into()]).unwrap();
//! assert_eq!(queue.dequeue_many(2).unwrap(), vec!["a", "b"]);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod options;
mod queue;
pub mod segment;

pub use error::{QueueError, QueueResult};
pub use options::{QueueOptions, DEFAULT_FILE_MODE, DEFAULT_SEGMENT_CAPACITY};
pub use queue::Queue;
pub use segment::Segment;
