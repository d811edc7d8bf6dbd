//! Map storage configuration.

use std::time::Duration;

/// How the "latest" signed root of a map is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RootOrdering {
    /// Highest `MapRevision` wins.
    #[default]
    Revision,
    /// Highest `MapHeadTimestamp` wins.
    ///
    /// Under clock skew or concurrent writers this can select a root whose
    /// revision is not the highest one stored.
    Timestamp,
}

/// Configuration for opening map storage.
#[derive(Debug, Clone)]
pub struct Config {
    /// Size in bytes of key hashes produced by the tree hasher.
    pub hash_size: usize,

    /// Ordering used to select the latest signed root.
    pub root_ordering: RootOrdering,

    /// Largest number of key hashes sent in one lookup statement.
    ///
    /// Bigger `get` batches are split, which also bounds the number of
    /// distinct statement shapes that get cached.
    pub max_key_batch: usize,

    /// How long the engine waits on a locked database before failing.
    pub busy_timeout: Duration,

    /// Whether to install the map relations when opening.
    pub create_schema: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hash_size: 32, // SHA-256
            root_ordering: RootOrdering::Revision,
            max_key_batch: 256,
            busy_timeout: Duration::from_secs(5),
            create_schema: false,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the key hash size.
    #[must_use]
    pub const fn hash_size(mut self, size: usize) -> Self {
        self.hash_size = size;
        self
    }

    /// Sets the latest-root ordering.
    #[must_use]
    pub const fn root_ordering(mut self, ordering: RootOrdering) -> Self {
        self.root_ordering = ordering;
        self
    }

    /// Sets the maximum lookup batch size. Zero is treated as one.
    #[must_use]
    pub const fn max_key_batch(mut self, size: usize) -> Self {
        self.max_key_batch = if size == 0 { 1 } else { size };
        self
    }

    /// Sets the busy timeout.
    #[must_use]
    pub const fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    /// Sets whether to install the schema on open.
    #[must_use]
    pub const fn create_schema(mut self, value: bool) -> Self {
        self.create_schema = value;
        self
    }
}
