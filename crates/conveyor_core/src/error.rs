//! Error types for queue operations.

use std::io;

use conveyor_codec::CodecError;
use thiserror::Error;

/// Result type for queue operations.
pub type QueueResult<T> = Result<T, QueueError>;

/// Errors that can occur during queue operations.
#[derive(Debug, Error)]
pub enum QueueError {
    /// Dequeue was called on a queue with no live items.
    ///
    /// This is the only expected, non-exceptional failure. Callers use it
    /// as a control signal for "nothing to consume right now".
    #[error("queue is empty")]
    Empty,

    /// An underlying filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The host codec failed to marshal or unmarshal an item.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// A structural violation was found while replaying a segment file.
    #[error("corrupt segment: {message}")]
    CorruptSegment {
        /// Description of the violation.
        message: String,
    },

    /// The segment or queue has already been closed.
    #[error("queue is closed")]
    Closed,

    /// The supplied options are invalid.
    #[error("invalid options: {message}")]
    InvalidOptions {
        /// Description of the option problem.
        message: String,
    },
}

impl QueueError {
    /// Creates a corrupt segment error.
    pub fn corrupt_segment(message: impl Into<String>) -> Self {
        Self::CorruptSegment {
            message: message.into(),
        }
    }

    /// Creates an invalid options error.
    pub fn invalid_options(message: impl Into<String>) -> Self {
        Self::InvalidOptions {
            message: message.into(),
        }
    }

    /// Returns true if this is the queue-empty control signal.
    #[must_use]
    pub fn is_empty_error(&self) -> bool {
        matches!(self, Self::Empty)
    }
}
