//! The verification façade: walk, enrich, check tags, assemble the report.

use std::sync::Arc;

use cr_client::{AnchorTransport, BlobStore, RetryPolicy};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::enrich::enrich_blobs;
use crate::report::{LayerReport, VerifyReport};
use crate::resolve::{resolve_input, Resolved, ResolveError};
use crate::supports::{check_support_tags, TagCheckMode};
use crate::walk::{walk_backward, walk_forward, WalkOutcome};

/// Every policy knob the verification pipeline honors.
///
/// The three original frontends hard-coded diverging values for all of
/// these; they are centralized here so behavior is configured, not forked.
#[derive(Debug, Clone)]
pub struct VerifyOptions {
    /// Timeout + single-retry policy for every network call.
    pub retry: RetryPolicy,
    /// Worker-pool bound for blob and tag fetches.
    pub max_concurrency: usize,
    pub tag_check: TagCheckMode,
    /// Cancelling this token aborts in-flight and future calls; the report
    /// comes back with `complete = false` and whatever was accumulated.
    pub cancel: CancellationToken,
}

impl Default for VerifyOptions {
    fn default() -> Self {
        VerifyOptions {
            retry: RetryPolicy::default(),
            max_concurrency: 4,
            tag_check: TagCheckMode::default(),
            cancel: CancellationToken::new(),
        }
    }
}

/// Reconstructs and verifies provenance chains over injected transports.
pub struct Verifier<T, S> {
    transport: Arc<T>,
    store: Arc<S>,
    options: VerifyOptions,
}

impl<T, S> Verifier<T, S>
where
    T: AnchorTransport + 'static,
    S: BlobStore + 'static,
{
    pub fn new(transport: T, store: S) -> Self {
        Self::with_options(transport, store, VerifyOptions::default())
    }

    pub fn with_options(transport: T, store: S, options: VerifyOptions) -> Self {
        Self {
            transport: Arc::new(transport),
            store: Arc::new(store),
            options,
        }
    }

    pub fn options(&self) -> &VerifyOptions {
        &self.options
    }

    /// Verify a chain starting from a recent transaction hash (backward
    /// walk to genesis).
    pub async fn verify_from_tx(&self, tx_hash: &str) -> VerifyReport {
        let outcome = walk_backward(
            self.transport.as_ref(),
            &self.options.retry,
            &self.options.cancel,
            tx_hash,
        )
        .await;
        self.finish(outcome).await
    }

    /// Verify a chain starting from its genesis hash (forward discovery via
    /// delegate address history).
    pub async fn verify_from_genesis(&self, genesis_hash: &str) -> VerifyReport {
        let outcome = walk_forward(
            self.transport.as_ref(),
            &self.options.retry,
            &self.options.cancel,
            genesis_hash,
        )
        .await;
        self.finish(outcome).await
    }

    /// Resolve a user-supplied identifier (tx hash, genesis hash or arweave
    /// id) and run the appropriate walk.
    pub async fn verify_input(&self, input: &str) -> Result<VerifyReport, ResolveError> {
        let resolved = resolve_input(self.store.as_ref(), &self.options.retry, input).await?;
        Ok(match resolved {
            Resolved::Backward { tx_hash } => self.verify_from_tx(&tx_hash).await,
            Resolved::Forward { genesis_hash } => self.verify_from_genesis(&genesis_hash).await,
        })
    }

    async fn finish(&self, outcome: WalkOutcome) -> VerifyReport {
        let WalkOutcome {
            genesis_hash,
            mut anchors,
            ledger,
            complete: walk_complete,
        } = outcome;

        let (blob, enrich_complete) = if genesis_hash.is_empty() || anchors.is_empty() {
            (LayerReport::default(), true)
        } else {
            enrich_blobs(
                &self.store,
                self.options.retry,
                &self.options.cancel,
                &mut anchors,
                &genesis_hash,
                self.options.max_concurrency,
            )
            .await
        };

        let tags = check_support_tags(
            &self.store,
            self.options.retry,
            &self.options.cancel,
            &anchors,
            &genesis_hash,
            self.options.tag_check,
            self.options.max_concurrency,
        )
        .await;

        let valid = ledger.errors.is_empty() && blob.errors.is_empty();
        let complete = walk_complete && enrich_complete && tags.complete;
        info!(
            genesis = %genesis_hash,
            anchors = anchors.len(),
            valid,
            complete,
            "verification finished"
        );

        VerifyReport {
            genesis_hash,
            anchors,
            ledger,
            blob,
            support_tags_ok: tags.ok,
            support_errors: tags.errors,
            complete,
            valid,
        }
    }
}
