//! Inspect command implementation.

use revmap_core::{MapReader, MapStorage, SignedMapRoot};
use serde::Serialize;

/// Map inspection result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// Map ID.
    pub map_id: i64,
    /// Number of signed roots stored.
    pub root_count: usize,
    /// Revision the next transaction will write at.
    pub next_write_revision: i64,
    /// The latest signed root, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_root: Option<RootSummary>,
}

/// Printable view of a signed root.
#[derive(Debug, Serialize)]
pub struct RootSummary {
    /// Revision.
    pub revision: i64,
    /// Timestamp in nanoseconds.
    pub timestamp_nanos: i64,
    /// Hex root hash.
    pub root_hash: String,
    /// Signature algorithm.
    pub signature_algorithm: String,
    /// Hex signature.
    pub signature: String,
    /// Highest fully applied source sequence number, when recorded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highest_fully_completed_seq: Option<i64>,
}

impl From<&SignedMapRoot> for RootSummary {
    fn from(root: &SignedMapRoot) -> Self {
        Self {
            revision: root.map_revision.as_i64(),
            timestamp_nanos: root.timestamp_nanos,
            root_hash: hex::encode(&root.root_hash),
            signature_algorithm: format!("{:?}", root.signature.signature_algorithm),
            signature: hex::encode(&root.signature.signature),
            highest_fully_completed_seq: root
                .metadata
                .as_ref()
                .map(|metadata| metadata.highest_fully_completed_seq),
        }
    }
}

/// Collects inspection data for the map.
pub fn inspect(storage: &MapStorage) -> Result<InspectResult, Box<dyn std::error::Error>> {
    let snapshot = storage.snapshot()?;
    let roots = snapshot.signed_map_roots()?;
    let latest = snapshot.latest_signed_map_root()?;

    Ok(InspectResult {
        map_id: storage.map_id().as_i64(),
        root_count: roots.len(),
        next_write_revision: snapshot.write_revision().as_i64(),
        latest_root: (!roots.is_empty()).then(|| RootSummary::from(&latest)),
    })
}

/// Runs the inspect command.
pub fn run(storage: &MapStorage, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let result = inspect(storage)?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        _ => {
            print_text_output(&result);
        }
    }

    Ok(())
}

fn print_text_output(result: &InspectResult) {
    println!("revmap Map Inspection");
    println!("=====================");
    println!();
    println!("Map:                 {}", result.map_id);
    println!("Signed roots:        {}", result.root_count);
    println!("Next write revision: {}", result.next_write_revision);

    match &result.latest_root {
        Some(root) => {
            println!();
            println!("Latest root:");
            println!("  Revision:  {}", root.revision);
            println!("  Timestamp: {} ns", root.timestamp_nanos);
            println!("  Hash:      {}", root.root_hash);
            println!(
                "  Signature: {} ({})",
                root.signature, root.signature_algorithm
            );
            if let Some(seq) = root.highest_fully_completed_seq {
                println!("  Mapper:    fully applied through {seq}");
            }
        }
        None => {
            println!();
            println!("No signed roots yet");
        }
    }
}
