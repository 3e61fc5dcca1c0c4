//! Error types for the codec crate.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while marshalling or unmarshalling items.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Failed to marshal an item to bytes.
    #[error("marshal failed: {message}")]
    MarshalFailed {
        /// Description of the marshal error.
        message: String,
    },

    /// Failed to unmarshal an item from bytes.
    #[error("unmarshal failed: {message}")]
    UnmarshalFailed {
        /// Description of the unmarshal error.
        message: String,
    },

    /// The marshalled payload was empty.
    ///
    /// Zero-length payloads are forbidden because a zero length word on
    /// disk is a removal tombstone.
    #[error("marshalled payload is empty")]
    EmptyPayload,

    /// Payload bytes are not valid UTF-8.
    #[error("invalid UTF-8 payload")]
    InvalidUtf8,
}

impl CodecError {
    /// Creates a marshal failed error.
    pub fn marshal_failed(message: impl Into<String>) -> Self {
        Self::MarshalFailed {
            message: message.into(),
        }
    }

    /// Creates an unmarshal failed error.
    pub fn unmarshal_failed(message: impl Into<String>) -> Self {
        Self::UnmarshalFailed {
            message: message.into(),
        }
    }
}
