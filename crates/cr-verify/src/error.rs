use cr_client::TransportError;
use thiserror::Error;

/// Verification failure kinds.
///
/// These never escape the verifier as `Err`; they are rendered into the
/// report's error lists so callers always get a complete structured result.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("transaction not found: {0}")]
    NotFound(String),

    #[error("malformed payload in {tx_hash}: {reason}")]
    MalformedPayload { tx_hash: String, reason: String },

    #[error("linkage mismatch at {tx_hash}: {reason}")]
    LinkageMismatch { tx_hash: String, reason: String },

    #[error("blob {blob_id} failed schema validation: {reasons}")]
    BlobSchemaInvalid { blob_id: String, reasons: String },

    #[error("blob {blob_id} genesis does not match chain genesis")]
    BlobGenesisMismatch { blob_id: String },

    #[error("support {id}: missing or mismatched ChainRoute-Genesis tag")]
    TagMissingOrMismatched { id: String },

    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),
}
