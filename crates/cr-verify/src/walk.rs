//! Chain reconstruction: backward from a known anchor, forward from genesis.

use std::collections::{HashMap, HashSet};

use cr_client::{AnchorTransport, RetryPolicy, TransportError};
use cr_codec::{decode, normalize_hash, DecodedPayload, PAYLOAD_LEN, ZERO_HASH_HEX};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::VerifyError;
use crate::report::{AnchorStep, ChainAnchor, LayerReport, VerifiedAnchor};

/// Result of a walk: the ordered anchors plus the ledger-layer report.
#[derive(Debug, Clone, PartialEq)]
pub struct WalkOutcome {
    /// Lowercase genesis hash; empty when it could not be established.
    pub genesis_hash: String,
    /// Anchors that verified at the ledger layer, oldest-first.
    pub anchors: Vec<ChainAnchor>,
    pub ledger: LayerReport<VerifiedAnchor>,
    /// False when cancellation stopped the walk early.
    pub complete: bool,
}

impl WalkOutcome {
    fn failed(error: String) -> Self {
        WalkOutcome {
            genesis_hash: String::new(),
            anchors: Vec::new(),
            ledger: LayerReport {
                errors: vec![error],
                results: Vec::new(),
            },
            complete: true,
        }
    }
}

fn is_hex64(s: &str) -> bool {
    s.len() == 64 && s.bytes().all(|b| b.is_ascii_hexdigit())
}

fn fetch_error(tx_hash: &str, err: TransportError) -> VerifyError {
    if err.is_not_found() {
        VerifyError::NotFound(tx_hash.to_string())
    } else {
        VerifyError::Transport(err)
    }
}

/// One visited transaction, recorded before chain order is known.
struct RawStep {
    tx_hash: String,
    decoded: Option<DecodedPayload>,
    error: Option<String>,
}

/// Walk from a recent transaction hash back to the genesis anchor.
///
/// Each step fetches the cursor transaction, decodes its payload and follows
/// `previousHash` (an all-zero value points at the genesis anchor itself). A
/// missing transaction or malformed payload is fatal: the link is broken and
/// there is no way to continue. A genesis-hash mismatch marks that anchor
/// invalid and aborts, but anchors already visited stay valid in the report.
pub async fn walk_backward<T: AnchorTransport + ?Sized>(
    transport: &T,
    retry: &RetryPolicy,
    cancel: &CancellationToken,
    start_tx_hash: &str,
) -> WalkOutcome {
    let start = normalize_hash(start_tx_hash.trim());
    if !is_hex64(&start) {
        return WalkOutcome::failed(
            "invalid transaction hash (expected 0x + 64 hex characters)".to_string(),
        );
    }

    // Visited newest-first, reversed once the walk terminates.
    let mut raw: Vec<RawStep> = Vec::new();
    let mut errors: Vec<String> = Vec::new();
    let mut cursor = format!("0x{start}");
    let mut genesis: Option<String> = None;
    let mut reached_genesis = false;
    let mut complete = true;
    let mut seen: HashSet<String> = HashSet::new();

    loop {
        if cancel.is_cancelled() {
            complete = false;
            break;
        }
        if !seen.insert(normalize_hash(&cursor)) {
            let msg = format!("cycle detected at tx {cursor}");
            errors.push(msg.clone());
            raw.push(RawStep {
                tx_hash: cursor.clone(),
                decoded: None,
                error: Some(msg),
            });
            break;
        }

        debug!(%cursor, "backward walk step");
        let fetched = tokio::select! {
            _ = cancel.cancelled() => {
                complete = false;
                break;
            }
            fetched = retry.run(|| transport.get_transaction(&cursor)) => fetched,
        };
        let tx = match fetched {
            Ok(tx) => tx,
            Err(err) => {
                let msg = fetch_error(&cursor, err).to_string();
                errors.push(msg.clone());
                raw.push(RawStep {
                    tx_hash: cursor.clone(),
                    decoded: None,
                    error: Some(msg),
                });
                break;
            }
        };

        if tx.data.len() != PAYLOAD_LEN {
            let msg = VerifyError::MalformedPayload {
                tx_hash: tx.hash.clone(),
                reason: format!("expected {PAYLOAD_LEN} payload bytes, got {}", tx.data.len()),
            }
            .to_string();
            errors.push(msg.clone());
            raw.push(RawStep {
                tx_hash: tx.hash,
                decoded: None,
                error: Some(msg),
            });
            break;
        }

        let decoded = match decode(&tx.data) {
            Ok(decoded) => decoded,
            Err(err) => {
                let msg = VerifyError::MalformedPayload {
                    tx_hash: tx.hash.clone(),
                    reason: err.to_string(),
                }
                .to_string();
                errors.push(msg.clone());
                raw.push(RawStep {
                    tx_hash: tx.hash,
                    decoded: None,
                    error: Some(msg),
                });
                break;
            }
        };

        if decoded.is_genesis() {
            genesis = Some(normalize_hash(&tx.hash));
            reached_genesis = true;
            raw.push(RawStep {
                tx_hash: tx.hash,
                decoded: Some(decoded),
                error: None,
            });
            break;
        }

        match &genesis {
            // First event visited fixes the expected genesis for the rest.
            None => genesis = Some(decoded.genesis_hash.clone()),
            Some(expected) if *expected != decoded.genesis_hash => {
                let msg = VerifyError::LinkageMismatch {
                    tx_hash: tx.hash.clone(),
                    reason: format!(
                        "payload names genesis {}, chain expects {expected}",
                        decoded.genesis_hash
                    ),
                }
                .to_string();
                errors.push(msg.clone());
                raw.push(RawStep {
                    tx_hash: tx.hash,
                    decoded: Some(decoded),
                    error: Some(msg),
                });
                break;
            }
            Some(_) => {}
        }

        let previous = decoded.previous_hash.clone();
        raw.push(RawStep {
            tx_hash: tx.hash,
            decoded: Some(decoded),
            error: None,
        });

        // An all-zero previous hash means "directly after genesis".
        cursor = if previous == ZERO_HASH_HEX {
            match &genesis {
                Some(g) => format!("0x{g}"),
                None => unreachable!("genesis is fixed before the first advance"),
            }
        } else {
            format!("0x{previous}")
        };
    }

    raw.reverse();
    let offset = usize::from(!reached_genesis);
    let mut anchors = Vec::new();
    let mut results = Vec::new();
    for (i, step) in raw.into_iter().enumerate() {
        let label = if reached_genesis && i == 0 {
            AnchorStep::Genesis
        } else {
            AnchorStep::Event(i + offset)
        };
        let ok = step.error.is_none();
        if ok {
            if let Some(decoded) = step.decoded.clone() {
                anchors.push(ChainAnchor {
                    step: label,
                    tx_hash: step.tx_hash.clone(),
                    decoded,
                    blob_ok: None,
                    blob_summary: None,
                });
            }
        }
        results.push(VerifiedAnchor {
            step: label,
            tx_hash: step.tx_hash,
            ok,
            decoded: step.decoded,
            error: step.error,
        });
    }

    WalkOutcome {
        genesis_hash: genesis.unwrap_or_default(),
        anchors,
        ledger: LayerReport { errors, results },
        complete,
    }
}

struct Candidate {
    tx_hash: String,
    hash_hex: String,
    decoded: DecodedPayload,
}

/// Sequence candidates by previous-hash linkage starting from `tail`.
///
/// A candidate whose previous hash is all-zero links directly after genesis.
/// Chosen entries are consumed so a self-referential payload cannot loop.
fn order_by_prev(candidates: Vec<Candidate>, tail: &str, genesis_hex: &str) -> Vec<Candidate> {
    let mut by_prev: HashMap<String, Vec<Candidate>> = HashMap::new();
    for candidate in candidates {
        let prev = if candidate.decoded.previous_hash == ZERO_HASH_HEX {
            genesis_hex.to_string()
        } else {
            candidate.decoded.previous_hash.clone()
        };
        by_prev.entry(prev).or_default().push(candidate);
    }

    let mut ordered = Vec::new();
    let mut current = tail.to_string();
    loop {
        let Some(bucket) = by_prev.get_mut(&current) else {
            break;
        };
        if bucket.is_empty() {
            break;
        }
        let next = bucket.remove(0);
        current = next.hash_hex.clone();
        ordered.push(next);
    }
    ordered
}

/// Walk forward from a genesis hash, discovering events through each
/// delegate's address transaction history.
///
/// The history source is best-effort: running out of candidates simply ends
/// the chain, and a history lookup failure after the retry is recorded and
/// ends discovery with whatever was reconstructed so far. Only a missing or
/// non-genesis starting transaction is fatal.
pub async fn walk_forward<T: AnchorTransport + ?Sized>(
    transport: &T,
    retry: &RetryPolicy,
    cancel: &CancellationToken,
    genesis_hash: &str,
) -> WalkOutcome {
    let genesis_hex = normalize_hash(genesis_hash.trim());
    if !is_hex64(&genesis_hex) {
        return WalkOutcome::failed("invalid genesis hash (expected 64 hex characters)".to_string());
    }

    let genesis_tx = format!("0x{genesis_hex}");
    let fetched = tokio::select! {
        _ = cancel.cancelled() => {
            return WalkOutcome {
                genesis_hash: genesis_hex,
                anchors: Vec::new(),
                ledger: LayerReport::default(),
                complete: false,
            };
        }
        fetched = retry.run(|| transport.get_transaction(&genesis_tx)) => fetched,
    };
    let tx = match fetched {
        Ok(tx) => tx,
        Err(err) => {
            let mut outcome = WalkOutcome::failed(fetch_error(&genesis_tx, err).to_string());
            outcome.genesis_hash = genesis_hex;
            return outcome;
        }
    };

    let decoded = if tx.data.len() != PAYLOAD_LEN {
        Err(format!(
            "expected {PAYLOAD_LEN} payload bytes, got {}",
            tx.data.len()
        ))
    } else {
        decode(&tx.data).map_err(|e| e.to_string())
    };
    let decoded = match decoded {
        Ok(decoded) => decoded,
        Err(reason) => {
            let mut outcome = WalkOutcome::failed(
                VerifyError::MalformedPayload {
                    tx_hash: tx.hash,
                    reason,
                }
                .to_string(),
            );
            outcome.genesis_hash = genesis_hex;
            return outcome;
        }
    };
    if !decoded.is_genesis() {
        let mut outcome = WalkOutcome::failed(
            VerifyError::LinkageMismatch {
                tx_hash: tx.hash,
                reason: "transaction is not a genesis anchor (expected all-zero payload fields)"
                    .to_string(),
            }
            .to_string(),
        );
        outcome.genesis_hash = genesis_hex;
        return outcome;
    }

    let mut errors: Vec<String> = Vec::new();
    let mut complete = true;
    let mut current_delegate = decoded.delegate.to_ascii_lowercase();
    let mut seen_delegates: HashSet<String> = HashSet::from([current_delegate.clone()]);
    let mut seen_txs: HashSet<String> = HashSet::from([genesis_hex.clone()]);
    let mut anchors = vec![ChainAnchor {
        step: AnchorStep::Genesis,
        tx_hash: tx.hash.clone(),
        decoded: decoded.clone(),
        blob_ok: None,
        blob_summary: None,
    }];
    let mut results = vec![VerifiedAnchor {
        step: AnchorStep::Genesis,
        tx_hash: tx.hash,
        ok: true,
        decoded: Some(decoded),
        error: None,
    }];
    let mut event_index = 0usize;

    loop {
        if cancel.is_cancelled() {
            complete = false;
            break;
        }

        debug!(delegate = %current_delegate, "forward walk: fetching delegate history");
        let fetched = tokio::select! {
            _ = cancel.cancelled() => {
                complete = false;
                break;
            }
            fetched = retry.run(|| transport.transactions_from(&current_delegate)) => fetched,
        };
        let history = match fetched {
            Ok(history) => history,
            Err(err) => {
                warn!(delegate = %current_delegate, error = %err, "delegate history lookup failed");
                errors.push(format!(
                    "failed to get transactions for delegate {current_delegate}: {err}"
                ));
                break;
            }
        };

        let mut candidates = Vec::new();
        for tx in history {
            if tx.data.len() != PAYLOAD_LEN {
                continue;
            }
            let Ok(decoded) = decode(&tx.data) else {
                continue;
            };
            if decoded.genesis_hash != genesis_hex {
                continue;
            }
            let hash_hex = normalize_hash(&tx.hash);
            if seen_txs.contains(&hash_hex) {
                continue;
            }
            candidates.push(Candidate {
                tx_hash: tx.hash,
                hash_hex,
                decoded,
            });
        }

        let tail = normalize_hash(
            &anchors
                .last()
                .map(|a| a.tx_hash.clone())
                .unwrap_or_default(),
        );
        let ordered = order_by_prev(candidates, &tail, &genesis_hex);
        if ordered.is_empty() {
            break;
        }

        for candidate in &ordered {
            event_index += 1;
            let step = AnchorStep::Event(event_index);
            seen_txs.insert(candidate.hash_hex.clone());
            anchors.push(ChainAnchor {
                step,
                tx_hash: candidate.tx_hash.clone(),
                decoded: candidate.decoded.clone(),
                blob_ok: None,
                blob_summary: None,
            });
            results.push(VerifiedAnchor {
                step,
                tx_hash: candidate.tx_hash.clone(),
                ok: true,
                decoded: Some(candidate.decoded.clone()),
                error: None,
            });
        }

        let next_delegate = ordered
            .last()
            .map(|c| c.decoded.delegate.to_ascii_lowercase())
            .unwrap_or_default();
        if next_delegate == current_delegate || seen_delegates.contains(&next_delegate) {
            break;
        }
        seen_delegates.insert(next_delegate.clone());
        current_delegate = next_delegate;
    }

    WalkOutcome {
        genesis_hash: genesis_hex,
        anchors,
        ledger: LayerReport { errors, results },
        complete,
    }
}
