//! Off-chain provenance document ("blob") model and schema validation.
//!
//! An event anchor's arweave id points at a JSON document of this shape:
//!
//! ```json
//! {
//!   "genesis": "64 hex chars",
//!   "eventType": "creation",
//!   "timestamp": "2026-01-27T18:37:00Z",
//!   "summary": { ... },
//!   "supports": [{ "id": "43-char arweave id", "label": "receipt.pdf" }]
//! }
//! ```
//!
//! Validation collects every violation instead of stopping at the first, so
//! callers can surface a complete report.

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Metadata tag name binding a support file to its chain's genesis hash.
pub const GENESIS_TAG: &str = "ChainRoute-Genesis";

/// Length of an arweave document/support id in characters.
pub const SUPPORT_ID_LEN: usize = 43;

/// A support file reference inside a blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportRef {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// A fully-typed provenance blob, produced after schema validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvenanceBlob {
    /// Genesis transaction hash of the chain this event belongs to (64 hex).
    pub genesis: String,
    pub event_type: String,
    pub timestamp: String,
    pub summary: Value,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub supports: Vec<SupportRef>,
}

#[derive(Debug, Error)]
pub enum BlobError {
    #[error("blob failed schema validation: {0}")]
    SchemaInvalid(String),

    #[error("blob is not valid JSON for the provenance schema: {0}")]
    Shape(#[from] serde_json::Error),
}

impl ProvenanceBlob {
    /// Convert a JSON value into the typed blob, running schema validation
    /// first so shape errors come back as the full violation list.
    pub fn from_value(value: &Value) -> Result<Self, BlobError> {
        let report = validate(value);
        if !report.valid {
            return Err(BlobError::SchemaInvalid(report.errors.join("; ")));
        }
        Ok(serde_json::from_value(value.clone())?)
    }
}

/// Outcome of validating a blob against the schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlobReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

/// True for a 64-character hex string.
pub fn is_hex64(s: &str) -> bool {
    s.len() == 64 && s.bytes().all(|b| b.is_ascii_hexdigit())
}

/// True for a 43-character arweave id (`[A-Za-z0-9_-]{43}`).
pub fn is_support_id(s: &str) -> bool {
    s.len() == SUPPORT_ID_LEN
        && s.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

fn is_iso8601(s: &str) -> bool {
    DateTime::parse_from_rfc3339(s).is_ok()
}

/// Validate a JSON value against the provenance blob schema.
///
/// Every rule is checked; the report lists all violations found.
pub fn validate(value: &Value) -> BlobReport {
    let mut errors = Vec::new();

    let Some(blob) = value.as_object() else {
        return BlobReport {
            valid: false,
            errors: vec!["blob must be a JSON object".to_string()],
        };
    };

    match blob.get("genesis").and_then(Value::as_str) {
        None => errors.push("missing or invalid \"genesis\" (required, string)".to_string()),
        Some(genesis) if !is_hex64(genesis) => {
            errors.push("\"genesis\" must be 64 hex characters".to_string());
        }
        Some(_) => {}
    }

    match blob.get("eventType").and_then(Value::as_str) {
        None | Some("") => {
            errors.push("missing or invalid \"eventType\" (required, non-empty string)".to_string());
        }
        Some(_) => {}
    }

    match blob.get("timestamp").and_then(Value::as_str) {
        None => errors.push("missing or invalid \"timestamp\" (required, string)".to_string()),
        Some(ts) if !is_iso8601(ts) => {
            errors.push(
                "\"timestamp\" should be ISO 8601 (e.g. 2026-01-27T18:37:00Z)".to_string(),
            );
        }
        Some(_) => {}
    }

    if !blob.get("summary").map(Value::is_object).unwrap_or(false) {
        errors.push("missing or invalid \"summary\" (required, object)".to_string());
    }

    if let Some(supports) = blob.get("supports") {
        match supports.as_array() {
            None => errors.push("\"supports\" must be an array".to_string()),
            Some(entries) => {
                for (i, entry) in entries.iter().enumerate() {
                    match entry.as_object() {
                        None => errors.push(format!("supports[{i}]: must be an object with \"id\"")),
                        Some(support) => match support.get("id").and_then(Value::as_str) {
                            None => errors.push(format!("supports[{i}]: missing \"id\"")),
                            Some(id) if !is_support_id(id) => {
                                errors.push(format!(
                                    "supports[{i}]: \"id\" must be 43 chars [A-Za-z0-9_-]"
                                ));
                            }
                            Some(_) => {}
                        },
                    }
                }
            }
        }
    }

    BlobReport {
        valid: errors.is_empty(),
        errors,
    }
}
