//! JSON codec for arbitrary `serde` types.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{CodecError, CodecResult};
use crate::Codec;

/// Codec that encodes items as JSON via `serde_json`.
///
/// Works for any `T: Serialize + DeserializeOwned`. JSON never produces a
/// zero-length payload, so any such `T` is safe to store.
///
/// # Example
///
/// ```
/// use conveyor_codec::{Codec, JsonCodec};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize, PartialEq, Debug)]
/// struct Job { id: u64, payload: String }
///
/// let codec = JsonCodec::<Job>::new();
/// let job = Job { id: 7, payload: "resize".into() };
/// let bytes = codec.marshal(&job).unwrap();
/// assert_eq!(codec.unmarshal(&bytes).unwrap(), job);
/// ```
pub struct JsonCodec<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> std::fmt::Debug for JsonCodec<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonCodec").finish()
    }
}

impl<T> JsonCodec<T> {
    /// Creates a new JSON codec.
    #[must_use]
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for JsonCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for JsonCodec<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> Codec<T> for JsonCodec<T>
where
    T: Serialize + DeserializeOwned,
{
    fn marshal(&self, item: &T) -> CodecResult<Vec<u8>> {
        serde_json::to_vec(item).map_err(|e| CodecError::marshal_failed(e.to_string()))
    }

    fn unmarshal(&self, bytes: &[u8]) -> CodecResult<T> {
        serde_json::from_slice(bytes).map_err(|e| CodecError::unmarshal_failed(e.to_string()))
    }
}
