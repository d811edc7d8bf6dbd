//! # revmap Codec
//!
//! CBOR encoding/decoding for the opaque payloads revmap persists: leaf
//! bodies, root signatures and mapper metadata.
//!
//! The storage layer treats these payloads as byte strings. This crate owns
//! the format so that the storage crate never has to look inside them.
//!
//! ## Usage
//!
//! ```
//! use revmap_codec::{from_cbor, to_cbor};
//!
//! let bytes = to_cbor(&(7u32, "seven")).unwrap();
//! let decoded: (u32, String) = from_cbor(&bytes).unwrap();
//! assert_eq!(decoded, (7, "seven".to_string()));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod cbor;
mod error;

pub use cbor::{from_cbor, to_cbor};
pub use error::{CodecError, CodecResult};

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Trait for types that can be encoded to CBOR.
pub trait Encode {
    /// Encode this value to CBOR bytes.
    fn encode(&self) -> CodecResult<Vec<u8>>;
}

/// Trait for types that can be decoded from CBOR.
pub trait Decode: Sized {
    /// Decode this value from CBOR bytes.
    fn decode(bytes: &[u8]) -> CodecResult<Self>;
}

impl<T: Serialize> Encode for T {
    fn encode(&self) -> CodecResult<Vec<u8>> {
        to_cbor(self)
    }
}

impl<T: DeserializeOwned> Decode for T {
    fn decode(bytes: &[u8]) -> CodecResult<Self> {
        from_cbor(bytes)
    }
}
