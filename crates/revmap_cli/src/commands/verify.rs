//! Verify command implementation.

use revmap_core::{MapReader, MapStorage, SignedMapRoot};

/// Verification result.
#[derive(Debug, Default)]
pub struct VerifyResult {
    /// Number of roots checked.
    pub roots_checked: usize,
    /// Revisions skipped between consecutive roots.
    pub warnings: Vec<String>,
    /// Ordering problems found.
    pub errors: Vec<String>,
}

impl VerifyResult {
    fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Checks the signed root history of the map.
///
/// Every root must decode, timestamps must not go backwards as revisions
/// increase, and the latest root under the configured ordering must be the
/// root with the highest revision.
pub fn verify(storage: &MapStorage) -> Result<VerifyResult, Box<dyn std::error::Error>> {
    let snapshot = storage.snapshot()?;
    let roots = snapshot.signed_map_roots()?;
    let latest = snapshot.latest_signed_map_root()?;

    let mut result = VerifyResult {
        roots_checked: roots.len(),
        ..VerifyResult::default()
    };

    for pair in roots.windows(2) {
        check_pair(&pair[0], &pair[1], &mut result);
    }

    if let Some(highest) = roots.last() {
        if latest.map_revision != highest.map_revision {
            result.errors.push(format!(
                "latest root is at {} but the highest stored revision is {}",
                latest.map_revision, highest.map_revision
            ));
        }
    }

    Ok(result)
}

fn check_pair(prev: &SignedMapRoot, next: &SignedMapRoot, result: &mut VerifyResult) {
    if prev.map_revision.checked_next() != Some(next.map_revision) {
        result.warnings.push(format!(
            "revisions jump from {} to {}",
            prev.map_revision, next.map_revision
        ));
    }
    if next.timestamp_nanos < prev.timestamp_nanos {
        result.errors.push(format!(
            "root at {} is older ({} ns) than root at {} ({} ns)",
            next.map_revision, next.timestamp_nanos, prev.map_revision, prev.timestamp_nanos
        ));
    }
}

/// Runs the verify command.
pub fn run(storage: &MapStorage) -> Result<(), Box<dyn std::error::Error>> {
    println!("Verifying {}", storage.map_id());
    println!();

    let result = verify(storage)?;
    println!("Roots checked: {}", result.roots_checked);
    for warning in &result.warnings {
        println!("  warning: {warning}");
    }
    for error in &result.errors {
        println!("  error: {error}");
    }

    println!();
    if result.is_ok() {
        println!("✓ Map verification passed");
        Ok(())
    } else {
        println!("✗ Map verification failed");
        Err("Verification failed".into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use revmap_core::{Config, MapWriter, Revision, RootOrdering};
    use revmap_testkit::{signed_root, TestMap};

    fn store(map: &MapStorage, roots: &[(i64, i64)]) {
        let mut tx = map.begin().unwrap();
        for (revision, timestamp) in roots {
            tx.store_signed_map_root(&signed_root(Revision::new(*revision), *timestamp))
                .unwrap();
        }
        tx.commit().unwrap();
    }

    #[test]
    fn clean_history_passes() {
        let map = TestMap::memory();
        store(&map, &[(1, 10), (2, 20), (3, 30)]);
        let result = verify(&map).unwrap();
        assert_eq!(result.roots_checked, 3);
        assert!(result.is_ok());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn empty_map_passes() {
        let map = TestMap::memory();
        assert!(verify(&map).unwrap().is_ok());
    }

    #[test]
    fn revision_gap_is_a_warning() {
        let map = TestMap::memory();
        store(&map, &[(1, 10), (3, 30)]);
        let result = verify(&map).unwrap();
        assert!(result.is_ok());
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn skewed_timestamps_fail() {
        let map = TestMap::memory();
        store(&map, &[(1, 50), (2, 20)]);
        let result = verify(&map).unwrap();
        assert_eq!(result.errors.len(), 1);
    }

    #[test]
    fn timestamp_ordering_reports_stale_latest() {
        let map = TestMap::memory_with(Config::new().root_ordering(RootOrdering::Timestamp));
        store(&map, &[(1, 50), (2, 20)]);
        let result = verify(&map).unwrap();
        // Skewed pair plus the stale latest root.
        assert_eq!(result.errors.len(), 2);
    }
}
