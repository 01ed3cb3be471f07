//! Attach off-chain documents to reconstructed anchors.

use std::collections::HashMap;
use std::sync::Arc;

use cr_blob::ProvenanceBlob;
use cr_client::{BlobStore, RetryPolicy, TransportError};
use serde_json::Value;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::VerifyError;
use crate::report::{AnchorStep, BlobSummary, ChainAnchor, LayerReport, VerifiedBlob};

struct EnrichOutcome {
    index: usize,
    row: VerifiedBlob,
    error: Option<String>,
    blob_ok: bool,
    summary: Option<BlobSummary>,
}

/// Fetch, validate and cross-check the document of every anchor that
/// references one. Anchors without a document are left at `blob_ok = None`.
///
/// Documents are independent, so fetches run concurrently under a bounded
/// worker pool; outcomes are re-ordered by anchor index before reporting so
/// the result is deterministic regardless of completion order. A failed
/// fetch is recorded as a blob-layer error and never blocks sibling anchors.
pub(crate) async fn enrich_blobs<S: BlobStore + 'static>(
    store: &Arc<S>,
    retry: RetryPolicy,
    cancel: &CancellationToken,
    anchors: &mut [ChainAnchor],
    genesis_hash: &str,
    max_concurrency: usize,
) -> (LayerReport<VerifiedBlob>, bool) {
    let semaphore = Arc::new(Semaphore::new(max_concurrency.max(1)));
    let mut tasks: JoinSet<Option<EnrichOutcome>> = JoinSet::new();
    let mut pending: HashMap<usize, (AnchorStep, String, String)> = HashMap::new();

    for (index, anchor) in anchors.iter().enumerate() {
        if anchor.decoded.arweave_id.is_empty() {
            continue;
        }
        let id = anchor.decoded.arweave_id.clone();
        let step = anchor.step;
        let tx_hash = anchor.tx_hash.clone();
        pending.insert(index, (step, tx_hash.clone(), id.clone()));
        let store = Arc::clone(store);
        let genesis = genesis_hash.to_string();
        let semaphore = Arc::clone(&semaphore);
        let cancel = cancel.clone();

        tasks.spawn(async move {
            let Ok(_permit) = semaphore.acquire_owned().await else {
                return None;
            };
            if cancel.is_cancelled() {
                return None;
            }
            debug!(%id, %tx_hash, "enriching anchor blob");
            let fetched = tokio::select! {
                _ = cancel.cancelled() => return None,
                fetched = retry.run(|| store.get_document(&id)) => fetched,
            };
            Some(check_document(index, step, &tx_hash, &id, &genesis, fetched))
        });
    }

    let mut outcomes = Vec::new();
    let mut cancelled = false;
    let mut crashed = false;
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Some(outcome)) => {
                pending.remove(&outcome.index);
                outcomes.push(outcome);
            }
            Ok(None) => cancelled = true,
            Err(err) => {
                warn!(error = %err, "enrichment task failed");
                crashed = true;
            }
        }
    }
    // A crashed task never reported an outcome; fail its row explicitly so
    // the anchor is not rendered as "no document to check".
    if crashed && !cancelled {
        let mut leftover: Vec<_> = pending.into_iter().collect();
        leftover.sort_by_key(|(index, _)| *index);
        for (index, (step, tx_hash, id)) in leftover {
            let message = format!("document check for {id} did not finish");
            outcomes.push(EnrichOutcome {
                index,
                row: VerifiedBlob {
                    step,
                    blob_id: id,
                    ok: false,
                    error: Some(message.clone()),
                },
                error: Some(format!("[{tx_hash}] {message}")),
                blob_ok: false,
                summary: None,
            });
        }
    }
    outcomes.sort_by_key(|o| o.index);

    let mut layer = LayerReport::default();
    for outcome in outcomes {
        anchors[outcome.index].blob_ok = Some(outcome.blob_ok);
        anchors[outcome.index].blob_summary = outcome.summary;
        if let Some(error) = outcome.error {
            layer.errors.push(error);
        }
        layer.results.push(outcome.row);
    }
    (layer, !cancelled)
}

fn check_document(
    index: usize,
    step: AnchorStep,
    tx_hash: &str,
    blob_id: &str,
    genesis_hash: &str,
    fetched: Result<Value, TransportError>,
) -> EnrichOutcome {
    let fail = |message: String, summary: Option<BlobSummary>| EnrichOutcome {
        index,
        row: VerifiedBlob {
            step,
            blob_id: blob_id.to_string(),
            ok: false,
            error: Some(message.clone()),
        },
        error: Some(format!("[{tx_hash}] {message}")),
        blob_ok: false,
        summary,
    };

    let value = match fetched {
        Ok(value) => value,
        Err(err) => {
            let kind = if err.is_not_found() {
                VerifyError::NotFound(blob_id.to_string())
            } else {
                VerifyError::Transport(err)
            };
            return fail(kind.to_string(), None);
        }
    };

    let blob = match ProvenanceBlob::from_value(&value) {
        Ok(blob) => blob,
        Err(err) => {
            let reasons = match err {
                cr_blob::BlobError::SchemaInvalid(reasons) => reasons,
                cr_blob::BlobError::Shape(err) => err.to_string(),
            };
            return fail(
                VerifyError::BlobSchemaInvalid {
                    blob_id: blob_id.to_string(),
                    reasons,
                }
                .to_string(),
                None,
            );
        }
    };

    let summary = BlobSummary {
        event_type: blob.event_type.clone(),
        timestamp: blob.timestamp.clone(),
        summary: blob.summary.clone(),
        supports: blob.supports.clone(),
    };

    if !blob.genesis.eq_ignore_ascii_case(genesis_hash) {
        return fail(
            VerifyError::BlobGenesisMismatch {
                blob_id: blob_id.to_string(),
            }
            .to_string(),
            Some(summary),
        );
    }

    EnrichOutcome {
        index,
        row: VerifiedBlob {
            step,
            blob_id: blob_id.to_string(),
            ok: true,
            error: None,
        },
        error: None,
        blob_ok: true,
        summary: Some(summary),
    }
}
