//! Support-tag verification: every support file referenced by a chain's
//! documents must carry a `ChainRoute-Genesis` tag naming the chain.

use std::sync::Arc;

use cr_blob::GENESIS_TAG;
use cr_client::{BlobStore, RetryPolicy, Tag};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::VerifyError;
use crate::report::ChainAnchor;

/// How far to take support-tag checking once a failure is found.
///
/// The original verifier frontends disagreed on this; exhaustive checking
/// with every failing id reported is the canonical behavior, and fail-fast
/// is kept for callers that only need a yes/no answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TagCheckMode {
    #[default]
    Exhaustive,
    FailFast,
}

pub(crate) struct SupportCheck {
    /// `None` when no anchor in the chain carries supports.
    pub ok: Option<bool>,
    pub errors: Vec<String>,
    pub complete: bool,
}

fn has_genesis_tag(tags: &[Tag], genesis_hash: &str) -> bool {
    tags.iter()
        .any(|tag| tag.name == GENESIS_TAG && tag.value.eq_ignore_ascii_case(genesis_hash))
}

/// Collect the support ids of every anchor whose document attached validly.
fn support_ids(anchors: &[ChainAnchor]) -> Vec<String> {
    let mut ids = Vec::new();
    for anchor in anchors {
        if anchor.blob_ok != Some(true) {
            continue;
        }
        if let Some(summary) = &anchor.blob_summary {
            ids.extend(summary.supports.iter().map(|s| s.id.clone()));
        }
    }
    ids
}

async fn check_one<S: BlobStore>(
    store: &S,
    retry: &RetryPolicy,
    id: &str,
    genesis_hash: &str,
) -> Option<String> {
    debug!(%id, "checking support tag");
    match retry.run(|| store.get_document_tags(id)).await {
        Ok(tags) if has_genesis_tag(&tags, genesis_hash) => None,
        Ok(_) => Some(
            VerifyError::TagMissingOrMismatched { id: id.to_string() }.to_string(),
        ),
        Err(err) => Some(format!("support {id}: {err}")),
    }
}

/// Verify the genesis tag on every support of every enriched anchor.
///
/// Exhaustive mode runs the checks concurrently under the shared worker
/// bound and reports each failing id; fail-fast mode checks sequentially
/// and stops at the first failure.
pub(crate) async fn check_support_tags<S: BlobStore + 'static>(
    store: &Arc<S>,
    retry: RetryPolicy,
    cancel: &CancellationToken,
    anchors: &[ChainAnchor],
    genesis_hash: &str,
    mode: TagCheckMode,
    max_concurrency: usize,
) -> SupportCheck {
    let ids = support_ids(anchors);
    if ids.is_empty() {
        return SupportCheck {
            ok: None,
            errors: Vec::new(),
            complete: true,
        };
    }

    match mode {
        TagCheckMode::FailFast => {
            for id in &ids {
                if cancel.is_cancelled() {
                    return SupportCheck {
                        ok: None,
                        errors: Vec::new(),
                        complete: false,
                    };
                }
                if let Some(error) = check_one(store.as_ref(), &retry, id, genesis_hash).await {
                    return SupportCheck {
                        ok: Some(false),
                        errors: vec![error],
                        complete: true,
                    };
                }
            }
            SupportCheck {
                ok: Some(true),
                errors: Vec::new(),
                complete: true,
            }
        }
        TagCheckMode::Exhaustive => {
            let semaphore = Arc::new(Semaphore::new(max_concurrency.max(1)));
            let mut tasks: JoinSet<Option<(usize, Option<String>)>> = JoinSet::new();
            for (index, id) in ids.iter().enumerate() {
                let store = Arc::clone(store);
                let id = id.clone();
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
                    tokio::select! {
                        _ = cancel.cancelled() => None,
                        failure = check_one(store.as_ref(), &retry, &id, &genesis) => {
                            Some((index, failure))
                        }
                    }
                });
            }

            let mut failures = Vec::new();
            let mut cancelled = false;
            while let Some(joined) = tasks.join_next().await {
                match joined {
                    Ok(Some(result)) => failures.push(result),
                    Ok(None) | Err(_) => cancelled = true,
                }
            }
            failures.sort_by_key(|(index, _)| *index);
            let errors: Vec<String> = failures
                .into_iter()
                .filter_map(|(_, failure)| failure)
                .collect();

            let ok = if cancelled && errors.is_empty() {
                // Incomplete with no failures found: cannot attest either way.
                None
            } else {
                Some(errors.is_empty())
            };
            SupportCheck {
                ok,
                errors,
                complete: !cancelled,
            }
        }
    }
}
