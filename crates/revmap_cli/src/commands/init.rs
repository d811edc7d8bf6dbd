//! Init command implementation.

use revmap_core::{Config, TreeStorage};
use std::path::Path;
use tracing::info;

/// Runs the init command.
///
/// Creates the database file if needed and installs the map relations.
/// Running it against an initialized database changes nothing.
pub fn run(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    info!("Initializing map database at {:?}", path);
    TreeStorage::open(path, Config::new().create_schema(true))?;
    println!("✓ Map database ready at {:?}", path);
    Ok(())
}
