//! Persisted collection format.
//!
//! # Responsibility
//! - Encode the item collection as a versioned JSON envelope.
//! - Decode both the envelope and the legacy bare JSON array.
//!
//! # Invariants
//! - Encoding always writes `CURRENT_FORMAT_VERSION`.
//! - Decoding never accepts a version newer than `CURRENT_FORMAT_VERSION`.
//! - Item order is preserved in both directions.

use crate::model::item::Item;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Format version written by this binary.
pub const CURRENT_FORMAT_VERSION: u32 = 1;

/// Version assigned to the legacy un-enveloped array.
pub const LEGACY_FORMAT_VERSION: u32 = 0;

/// Collection (de)serialization error.
#[derive(Debug)]
pub enum CodecError {
    Json(serde_json::Error),
    UnsupportedVersion { found: u32, latest_supported: u32 },
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "malformed item collection: {err}"),
            Self::UnsupportedVersion {
                found,
                latest_supported,
            } => write!(
                f,
                "item collection format version {found} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for CodecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::UnsupportedVersion { .. } => None,
        }
    }
}

impl From<serde_json::Error> for CodecError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    version: u32,
    items: &'a [Item],
}

#[derive(Deserialize)]
struct Envelope {
    version: u32,
    items: Vec<Item>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredCollection {
    Versioned(Envelope),
    Legacy(Vec<Item>),
}

/// Serializes the full collection into its persisted form.
pub fn encode_collection(items: &[Item]) -> Result<String, CodecError> {
    let envelope = EnvelopeRef {
        version: CURRENT_FORMAT_VERSION,
        items,
    };
    Ok(serde_json::to_string(&envelope)?)
}

/// Parses a persisted collection, returning its items and format version.
///
/// # Errors
/// - `CodecError::Json` when the payload is neither an envelope nor an array.
/// - `CodecError::UnsupportedVersion` when the envelope is from a newer binary.
pub fn decode_collection(raw: &str) -> Result<(Vec<Item>, u32), CodecError> {
    match serde_json::from_str::<StoredCollection>(raw)? {
        StoredCollection::Legacy(items) => Ok((items, LEGACY_FORMAT_VERSION)),
        StoredCollection::Versioned(envelope) => {
            if envelope.version > CURRENT_FORMAT_VERSION {
                return Err(CodecError::UnsupportedVersion {
                    found: envelope.version,
                    latest_supported: CURRENT_FORMAT_VERSION,
                });
            }
            Ok((envelope.items, envelope.version))
        }
    }
}
