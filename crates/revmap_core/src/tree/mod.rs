//! Tree storage: connection access, transactions and statement caching.
//!
//! This layer knows nothing about leaves or roots. It hands out
//! transactions that the map layer builds on.

mod statements;
mod storage;
mod tx;

pub use statements::{StatementCache, PLACEHOLDER};
pub use storage::TreeStorage;
pub use tx::TreeTx;
