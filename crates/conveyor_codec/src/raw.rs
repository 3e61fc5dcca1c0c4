//! Identity codecs for raw bytes and UTF-8 strings.

use crate::error::{CodecError, CodecResult};
use crate::Codec;

/// Identity codec over `Vec<u8>`.
///
/// The item bytes *are* the payload. Hosts that already produce their own
/// wire format can use this to bypass any re-encoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct BytesCodec;

impl Codec<Vec<u8>> for BytesCodec {
    fn marshal(&self, item: &Vec<u8>) -> CodecResult<Vec<u8>> {
        Ok(item.clone())
    }

    fn unmarshal(&self, bytes: &[u8]) -> CodecResult<Vec<u8>> {
        Ok(bytes.to_vec())
    }
}

/// Codec for `String` items, stored as their UTF-8 bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct Utf8Codec;

impl Codec<String> for Utf8Codec {
    fn marshal(&self, item: &String) -> CodecResult<Vec<u8>> {
        Ok(item.clone().into_bytes())
    }

    fn unmarshal(&self, bytes: &[u8]) -> CodecResult<String> {
        String::from_utf8(bytes.to_vec()).map_err(|_| CodecError::InvalidUtf8)
    }
}
