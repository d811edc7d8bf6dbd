//! CLI command implementations.

pub mod get;
pub mod init;
pub mod inspect;
pub mod verify;
