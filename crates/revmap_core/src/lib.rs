//! # revmap Core
//!
//! Revisioned key-value map storage.
//!
//! This crate provides:
//! - Map handles that open transactions bound to a write revision
//! - Point-in-time leaf reads at any past revision
//! - Append-only storage of signed map roots
//! - SQLite-backed tree storage with statement caching
//!
//! Merkle hashing, proofs and signing live elsewhere; this crate stores
//! their outputs.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
pub mod map;
mod record;
pub mod schema;
pub mod tree;
mod types;

pub use config::{Config, RootOrdering};
pub use error::{CoreError, CoreResult};
pub use map::{MapReader, MapStorage, MapTx, MapWriter, ReadOnlyMapTx};
pub use record::{
    DigitallySigned, HashAlgorithm, MapLeaf, MapperMetadata, SignatureAlgorithm, SignedMapRoot,
};
pub use tree::{TreeStorage, TreeTx};
pub use types::{KeyHash, MapId, Revision};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
