//! On-disk format of a label store.
//!
//! A store file is a single JSON object whose keys are labels and whose
//! values are the stored bytes as standard, padded base64 strings:
//!
//! ```text
//! {"foo":"YmFy","日本語":"5pel5pys6Kqe"}
//! ```
//!
//! `null` values decode to empty bytes so files written by older releases,
//! which emitted `null` for never-filled labels, load unchanged. Encoding
//! sorts keys and terminates the object with a newline, which makes the
//! empty store exactly [`EMPTY`].

use std::collections::{BTreeMap, HashMap};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Canonical serialization of a store with no labels.
pub const EMPTY: &[u8] = b"{}\n";

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("value of label {label:?} is not valid base64: {source}")]
    InvalidValue {
        label: String,
        #[source]
        source: base64::DecodeError,
    },
}

/// Decode a complete store file into its label map.
///
/// Either every entry decodes or the whole call fails; a partially filled
/// map is never returned.
pub fn decode(content: &[u8]) -> Result<HashMap<String, Vec<u8>>, CodecError> {
    let raw: HashMap<String, Option<String>> = serde_json::from_slice(content)?;

    raw.into_iter()
        .try_fold(HashMap::new(), |mut map, (label, value)| {
            let bytes = match value {
                Some(encoded) => STANDARD
                    .decode(encoded.as_bytes())
                    .map_err(|source| CodecError::InvalidValue {
                        label: label.clone(),
                        source,
                    })?,
                None => Vec::new(),
            };
            map.insert(label, bytes);
            Ok(map)
        })
}

/// Encode a label map. Keys are emitted in sorted order so identical maps
/// always produce identical files.
pub fn encode(map: &HashMap<String, Vec<u8>>) -> Vec<u8> {
    let sorted: BTreeMap<&str, String> = map
        .iter()
        .map(|(label, value)| (label.as_str(), STANDARD.encode(value)))
        .collect();

    let mut out = serde_json::to_vec(&sorted).expect("string map is valid JSON");
    out.push(b'\n');
    out
}
