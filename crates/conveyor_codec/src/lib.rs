//! # Conveyor Codec
//!
//! The item codec boundary for the conveyor durable queue.
//!
//! The queue core treats items as opaque byte strings. This crate defines
//! the [`Codec`] trait that hosts implement to marshal their item type to
//! bytes and back, plus stock codecs for common cases:
//!
//! - [`BytesCodec`] - identity over `Vec<u8>`
//! - [`Utf8Codec`] - UTF-8 strings
//! - [`JsonCodec`] - any `serde` type, encoded as JSON
//!
//! ## Payload Rules
//!
//! A marshalled payload must be **non-empty**. The on-disk frame format
//! uses a zero length word as a removal tombstone, so a zero-length item
//! payload would be indistinguishable from one. The queue core rejects an
//! empty marshal result with [`CodecError::EmptyPayload`] before writing
//! anything.
//!
//! ## Usage
//!
//! ```
//! use conveyor_codec::{Codec, Utf8Codec};
//!
//! let codec = Utf8Codec;
//! let bytes = codec.marshal(&"hello".to_string()).unwrap();
//! let back = codec.unmarshal(&bytes).unwrap();
//! assert_eq!(back, "hello");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod json;
mod raw;

pub use error::{CodecError, CodecResult};
pub use json::JsonCodec;
pub use raw::{BytesCodec, Utf8Codec};

/// Marshals items of type `T` to bytes and back.
///
/// Both directions are fallible. Implementations must be pure: marshalling
/// the same item twice yields payloads that unmarshal to equal items, and
/// `unmarshal(marshal(item))` round-trips.
///
/// Codecs are shared across queue operations running on multiple threads,
/// so they must be `Send + Sync`.
pub trait Codec<T>: Send + Sync {
    /// Encodes an item to its byte representation.
    ///
    /// # Errors
    ///
    /// Returns an error if the item cannot be represented.
    fn marshal(&self, item: &T) -> CodecResult<Vec<u8>>;

    /// Decodes an item from its byte representation.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a valid encoding of `T`.
    fn unmarshal(&self, bytes: &[u8]) -> CodecResult<T>;
}
