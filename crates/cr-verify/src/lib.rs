//! Chain reconstruction and verification.
//!
//! A provenance chain is a sequence of ledger anchors, each carrying a
//! 127-byte payload that links to the previous anchor and optionally points
//! at an off-chain document. This crate reconstructs such chains two ways:
//!
//! - [`walk_backward`]: from a known recent transaction hash, following
//!   `previousHash` links back to the genesis anchor.
//! - [`walk_forward`]: from a genesis hash alone, discovering later anchors
//!   through each delegate's address transaction history.
//!
//! Reconstructed anchors are then enriched with their off-chain documents
//! (schema-validated and cross-checked against the chain genesis) and their
//! support files are checked for a binding genesis tag. The result is a
//! structured [`VerifyReport`]; business-level invalidity never surfaces as
//! an `Err`, only as entries in the report's error lists.

mod enrich;
mod error;
mod report;
mod resolve;
mod supports;
mod verifier;
mod walk;

pub use error::VerifyError;
pub use report::{
    AnchorStep, BlobSummary, ChainAnchor, LayerReport, VerifiedAnchor, VerifiedBlob, VerifyReport,
};
pub use resolve::{resolve_input, Resolved, ResolveError};
pub use supports::TagCheckMode;
pub use verifier::{Verifier, VerifyOptions};
pub use walk::{walk_backward, walk_forward, WalkOutcome};
