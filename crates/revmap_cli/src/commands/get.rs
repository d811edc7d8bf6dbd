//! Get command implementation.

use revmap_core::{KeyHash, MapReader, MapStorage, Revision};
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Snapshot read result.
#[derive(Debug, Serialize)]
pub struct GetResult {
    /// Revision the keys were read at.
    pub revision: i64,
    /// One entry per requested key, in request order.
    pub leaves: Vec<LeafView>,
}

/// Printable view of one requested key.
#[derive(Debug, Serialize)]
pub struct LeafView {
    /// Hex key hash.
    pub key_hash: String,
    /// Label the hash was derived from, when keys were given as labels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Value as UTF-8 if possible, hex otherwise. None if absent.
    pub value: Option<String>,
}

/// Reads `keys` at `revision`, or at the latest root when `None`.
pub fn get(
    storage: &MapStorage,
    keys: &[String],
    revision: Option<i64>,
    labels: bool,
) -> Result<GetResult, Box<dyn std::error::Error>> {
    let key_hashes = keys
        .iter()
        .map(|key| parse_key(key, labels))
        .collect::<Result<Vec<_>, _>>()?;

    let snapshot = storage.snapshot()?;
    let revision = match revision {
        Some(revision) => Revision::new(revision),
        None => snapshot.latest_signed_map_root()?.map_revision,
    };
    let found = snapshot.get(revision, &key_hashes)?;

    let leaves = keys
        .iter()
        .zip(&key_hashes)
        .map(|(key, key_hash)| LeafView {
            key_hash: key_hash.to_string(),
            label: labels.then(|| key.clone()),
            value: found
                .iter()
                .find(|leaf| &leaf.key_hash == key_hash)
                .map(|leaf| display_value(&leaf.leaf_value)),
        })
        .collect();

    Ok(GetResult {
        revision: revision.as_i64(),
        leaves,
    })
}

/// Runs the get command.
pub fn run(
    storage: &MapStorage,
    keys: &[String],
    revision: Option<i64>,
    labels: bool,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let result = get(storage, keys, revision, labels)?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&result)?),
        _ => {
            println!("As of revision {}:", result.revision);
            for leaf in &result.leaves {
                let name = leaf.label.as_deref().unwrap_or(&leaf.key_hash);
                match &leaf.value {
                    Some(value) => println!("  {name} = {value}"),
                    None => println!("  {name} (absent)"),
                }
            }
        }
    }

    Ok(())
}

fn parse_key(key: &str, label: bool) -> Result<KeyHash, Box<dyn std::error::Error>> {
    if label {
        return Ok(KeyHash::from_bytes(Sha256::digest(key.as_bytes()).to_vec()));
    }
    KeyHash::from_hex(key).map_err(|err| format!("Invalid key hash {key:?}: {err}").into())
}

fn display_value(value: &[u8]) -> String {
    match std::str::from_utf8(value) {
        Ok(text) => text.to_string(),
        Err(_) => hex::encode(value),
    }
}
