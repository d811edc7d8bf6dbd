//! # revmap Testkit
//!
//! Test utilities for revmap.
//!
//! This crate provides:
//! - Test fixtures: in-memory and temp-file maps with the schema installed
//! - Property-based test generators using proptest
//! - A reference-model harness that checks every snapshot of a map
//!
//! ## Usage
//!
//! ```rust
//! use revmap_core::{MapReader, MapWriter};
//! use revmap_testkit::prelude::*;
//!
//! with_temp_map(|map| {
//!     let mut tx = map.begin().unwrap();
//!     tx.set(&key_hash("alice"), &leaf("alice", b"1")).unwrap();
//!     tx.commit().unwrap();
//! });
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod integration;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::integration::*;
}

pub use fixtures::*;
pub use generators::*;
pub use integration::*;
