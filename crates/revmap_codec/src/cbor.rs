//! CBOR encoding and decoding through `ciborium`.

use crate::error::{CodecError, CodecResult};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Encode a value to CBOR bytes.
///
/// Structs are written as maps keyed by field name in declaration order,
/// so encoding the same value twice yields identical bytes.
///
/// # Errors
///
/// Returns [`CodecError::EncodingFailed`] if the value cannot be serialized.
pub fn to_cbor<T>(value: &T) -> CodecResult<Vec<u8>>
where
    T: Serialize + ?Sized,
{
    let mut buffer = Vec::new();
    ciborium::ser::into_writer(value, &mut buffer)
        .map_err(|err| CodecError::encoding_failed(err.to_string()))?;
    Ok(buffer)
}

/// Decode exactly one CBOR item from `bytes`.
///
/// # Errors
///
/// Returns [`CodecError::DecodingFailed`] if the bytes are not a valid
/// encoding of `T`, and [`CodecError::TrailingBytes`] if input remains
/// after the item.
pub fn from_cbor<T>(bytes: &[u8]) -> CodecResult<T>
where
    T: DeserializeOwned,
{
    let mut reader = bytes;
    let value = ciborium::de::from_reader(&mut reader)
        .map_err(|err| CodecError::decoding_failed(err.to_string()))?;
    if !reader.is_empty() {
        return Err(CodecError::TrailingBytes {
            remaining: reader.len(),
        });
    }
    Ok(value)
}
