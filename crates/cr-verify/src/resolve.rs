//! Classify a user-supplied identifier into a walk strategy.
//!
//! Accepted inputs: a `0x`-prefixed transaction hash (backward walk), a bare
//! 64-hex genesis hash (forward walk), or a 43-character arweave id. An
//! arweave id resolves through the document's `genesis` field first, then
//! through its `ChainRoute-Genesis` tag, so both event blobs and support
//! files lead back to their chain.

use cr_blob::{is_hex64, is_support_id, GENESIS_TAG};
use cr_client::{BlobStore, RetryPolicy};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Which walk to run, and from where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    Backward { tx_hash: String },
    Forward { genesis_hash: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("arweave id {0}: not an event blob (no genesis) and no ChainRoute-Genesis tag")]
    NoGenesis(String),

    #[error(
        "unrecognized input: use a tx hash (0x + 64 hex), arweave id (43 chars), \
         or genesis hash (64 hex)"
    )]
    Unrecognized,
}

/// Resolve `input` to a walk strategy, consulting the blob store when the
/// input is an arweave id. Store failures during resolution fall through to
/// the next strategy rather than failing outright.
pub async fn resolve_input<S: BlobStore + ?Sized>(
    store: &S,
    retry: &RetryPolicy,
    input: &str,
) -> Result<Resolved, ResolveError> {
    let s = input.trim();

    if let Some(rest) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        if is_hex64(rest) {
            return Ok(Resolved::Backward {
                tx_hash: s.to_string(),
            });
        }
        return Err(ResolveError::Unrecognized);
    }

    if is_hex64(s) {
        return Ok(Resolved::Forward {
            genesis_hash: s.to_ascii_lowercase(),
        });
    }

    if is_support_id(s) {
        debug!(id = %s, "resolving arweave id");
        if let Ok(doc) = retry.run(|| store.get_document(s)).await {
            if let Some(genesis) = doc.get("genesis").and_then(Value::as_str) {
                if is_hex64(genesis) {
                    return Ok(Resolved::Forward {
                        genesis_hash: genesis.to_ascii_lowercase(),
                    });
                }
            }
        }
        if let Ok(tags) = retry.run(|| store.get_document_tags(s)).await {
            if let Some(tag) = tags
                .iter()
                .find(|tag| tag.name == GENESIS_TAG && is_hex64(&tag.value))
            {
                return Ok(Resolved::Forward {
                    genesis_hash: tag.value.to_ascii_lowercase(),
                });
            }
        }
        return Err(ResolveError::NoGenesis(s.to_string()));
    }

    Err(ResolveError::Unrecognized)
}
