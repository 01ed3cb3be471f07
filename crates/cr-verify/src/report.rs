//! Report types describing a reconstructed and verified chain.

use std::fmt;

use cr_blob::SupportRef;
use cr_codec::DecodedPayload;
use serde::{Serialize, Serializer};
use serde_json::Value;

/// Position of an anchor in a chain: the genesis anchor or the Nth event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorStep {
    Genesis,
    Event(usize),
}

impl fmt::Display for AnchorStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnchorStep::Genesis => write!(f, "genesis"),
            AnchorStep::Event(n) => write!(f, "event-{n}"),
        }
    }
}

impl Serialize for AnchorStep {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One entry of a reconstructed chain, oldest-first.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainAnchor {
    pub step: AnchorStep,
    /// `0x`-prefixed transaction hash.
    pub tx_hash: String,
    pub decoded: DecodedPayload,
    /// `Some(true/false)` after blob cross-checking; `None` when the anchor
    /// references no document (not a failure).
    pub blob_ok: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blob_summary: Option<BlobSummary>,
}

/// Event detail lifted from an anchor's off-chain document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlobSummary {
    pub event_type: String,
    pub timestamp: String,
    pub summary: Value,
    pub supports: Vec<SupportRef>,
}

/// Ledger-layer outcome for a single anchor.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedAnchor {
    pub step: AnchorStep,
    pub tx_hash: String,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decoded: Option<DecodedPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Blob-layer outcome for a single anchor's document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedBlob {
    pub step: AnchorStep,
    pub blob_id: String,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Per-layer error list plus per-anchor results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerReport<T> {
    pub errors: Vec<String>,
    pub results: Vec<T>,
}

impl<T> Default for LayerReport<T> {
    fn default() -> Self {
        LayerReport {
            errors: Vec::new(),
            results: Vec::new(),
        }
    }
}

/// The complete verification report.
///
/// `valid` is true iff both the ledger and blob error lists are empty.
/// `support_tags_ok` is `None` when no anchor in the chain carries supports.
/// `complete` is false when cancellation cut the run short; whatever was
/// accumulated up to that point is still reported.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyReport {
    /// Lowercase genesis hash, or empty when it could not be established.
    pub genesis_hash: String,
    pub anchors: Vec<ChainAnchor>,
    pub ledger: LayerReport<VerifiedAnchor>,
    pub blob: LayerReport<VerifiedBlob>,
    pub support_tags_ok: Option<bool>,
    pub support_errors: Vec<String>,
    pub complete: bool,
    pub valid: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchor_step_display() {
        assert_eq!(AnchorStep::Genesis.to_string(), "genesis");
        assert_eq!(AnchorStep::Event(3).to_string(), "event-3");
    }

    #[test]
    fn test_anchor_step_serializes_as_string() {
        let json = serde_json::to_value(AnchorStep::Event(1)).unwrap();
        assert_eq!(json, serde_json::json!("event-1"));
    }
}
