//! Memoized statement shapes for variable-length key batches.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

/// Marker in a statement template replaced by one `?` per batch element.
pub const PLACEHOLDER: &str = "<placeholder>";

/// Process-wide cache of expanded SQL text keyed by `(template, count)`.
///
/// Prepared handles themselves live in the connection's statement cache;
/// this only saves rebuilding the text for every lookup of the same size.
#[derive(Debug, Default)]
pub struct StatementCache {
    shapes: RwLock<HashMap<(&'static str, usize), Arc<str>>>,
}

impl StatementCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cache shared by every tree storage handle in the process.
    pub fn global() -> &'static Self {
        static CACHE: OnceLock<StatementCache> = OnceLock::new();
        CACHE.get_or_init(StatementCache::new)
    }

    /// Returns `template` with [`PLACEHOLDER`] replaced by `count`
    /// comma-separated parameters, building it on first use.
    pub fn expand(&self, template: &'static str, count: usize) -> Arc<str> {
        if let Some(sql) = self.shapes.read().get(&(template, count)) {
            return Arc::clone(sql);
        }
        let mut shapes = self.shapes.write();
        let sql = shapes
            .entry((template, count))
            .or_insert_with(|| expand_placeholders(template, count).into());
        Arc::clone(sql)
    }

    /// Returns the number of cached shapes.
    pub fn len(&self) -> usize {
        self.shapes.read().len()
    }

    /// Returns true if nothing has been cached.
    pub fn is_empty(&self) -> bool {
        self.shapes.read().is_empty()
    }
}

fn expand_placeholders(template: &str, count: usize) -> String {
    let params = vec!["?"; count].join(",");
    template.replacen(PLACEHOLDER, &params, 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    const TEMPLATE: &str = "SELECT * FROM t WHERE k IN (<placeholder>) AND x = ?";

    #[test]
    fn expands_one_parameter_per_element() {
        let cache = StatementCache::new();
        assert_eq!(
            &*cache.expand(TEMPLATE, 3),
            "SELECT * FROM t WHERE k IN (?,?,?) AND x = ?"
        );
        assert_eq!(
            &*cache.expand(TEMPLATE, 1),
            "SELECT * FROM t WHERE k IN (?) AND x = ?"
        );
    }

    #[test]
    fn shapes_are_memoized() {
        let cache = StatementCache::new();
        let a = cache.expand(TEMPLATE, 4);
        let b = cache.expand(TEMPLATE, 4);
        assert!(Arc::ptr_eq(&a, &b));
        cache.expand(TEMPLATE, 5);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn concurrent_lookups_agree() {
        let cache = Arc::new(StatementCache::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || cache.expand(TEMPLATE, 1 + i % 2))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(cache.len(), 2);
    }
}
