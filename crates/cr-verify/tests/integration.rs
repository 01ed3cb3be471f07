//! End-to-end verification against in-memory ledger and blob-store mocks.

use std::collections::HashMap;

use async_trait::async_trait;
use cr_client::{AnchorTransport, BlobStore, RawTransaction, Tag, TransportError};
use cr_codec::{encode, normalize_hash, PayloadFields, ZERO_HASH_HEX};
use cr_verify::{
    resolve_input, walk_backward, walk_forward, AnchorStep, Resolved, ResolveError, TagCheckMode,
    Verifier, VerifyOptions,
};
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

#[derive(Default)]
struct MockLedger {
    txs: HashMap<String, Vec<u8>>,
    history: HashMap<String, Vec<RawTransaction>>,
}

impl MockLedger {
    fn add_tx(&mut self, hash: &str, data: Vec<u8>) {
        self.txs.insert(normalize_hash(hash), data);
    }

    fn add_history(&mut self, delegate: &str, hash: &str, data: Vec<u8>) {
        self.history
            .entry(delegate.to_ascii_lowercase())
            .or_default()
            .push(RawTransaction {
                hash: format!("0x{}", normalize_hash(hash)),
                data,
            });
    }
}

#[async_trait]
impl AnchorTransport for MockLedger {
    async fn get_transaction(&self, tx_hash: &str) -> Result<RawTransaction, TransportError> {
        let key = normalize_hash(tx_hash);
        match self.txs.get(&key) {
            Some(data) => Ok(RawTransaction {
                hash: format!("0x{key}"),
                data: data.clone(),
            }),
            None => Err(TransportError::NotFound),
        }
    }

    async fn transactions_from(
        &self,
        address: &str,
    ) -> Result<Vec<RawTransaction>, TransportError> {
        Ok(self
            .history
            .get(&address.to_ascii_lowercase())
            .cloned()
            .unwrap_or_default())
    }
}

/// Serves known transactions; any other fetch fires the cancellation token
/// and then never resolves.
struct StallingLedger {
    cancel: CancellationToken,
    txs: HashMap<String, Vec<u8>>,
}

#[async_trait]
impl AnchorTransport for StallingLedger {
    async fn get_transaction(&self, tx_hash: &str) -> Result<RawTransaction, TransportError> {
        let key = normalize_hash(tx_hash);
        match self.txs.get(&key) {
            Some(data) => Ok(RawTransaction {
                hash: format!("0x{key}"),
                data: data.clone(),
            }),
            None => {
                self.cancel.cancel();
                std::future::pending().await
            }
        }
    }

    async fn transactions_from(
        &self,
        _address: &str,
    ) -> Result<Vec<RawTransaction>, TransportError> {
        self.cancel.cancel();
        std::future::pending().await
    }
}

#[derive(Default)]
struct MockStore {
    docs: HashMap<String, Value>,
    tags: HashMap<String, Vec<Tag>>,
}

#[async_trait]
impl BlobStore for MockStore {
    async fn get_document(&self, id: &str) -> Result<Value, TransportError> {
        self.docs.get(id).cloned().ok_or(TransportError::NotFound)
    }

    async fn get_document_tags(&self, id: &str) -> Result<Vec<Tag>, TransportError> {
        self.tags.get(id).cloned().ok_or(TransportError::NotFound)
    }
}

fn hash(n: u8) -> String {
    format!("{n:02x}").repeat(32)
}

fn delegate(n: u8) -> String {
    format!("0x{}", format!("{n:02x}").repeat(20))
}

fn arweave_id(c: char) -> String {
    c.to_string().repeat(43)
}

fn payload(genesis: &str, previous: &str, arweave: Option<&str>, signer: &str) -> Vec<u8> {
    encode(&PayloadFields {
        genesis_hash: genesis.to_string(),
        previous_hash: previous.to_string(),
        arweave_id: arweave.map(str::to_string),
        delegate: signer.to_string(),
    })
    .unwrap()
    .to_vec()
}

fn genesis_payload(signer: &str) -> Vec<u8> {
    payload(ZERO_HASH_HEX, ZERO_HASH_HEX, None, signer)
}

fn blob_doc(genesis: &str, supports: Value) -> Value {
    json!({
        "genesis": genesis,
        "eventType": "creation",
        "timestamp": "2026-01-01T00:00:00Z",
        "summary": {},
        "supports": supports,
    })
}

fn genesis_tag(genesis: &str) -> Vec<Tag> {
    vec![Tag {
        name: "ChainRoute-Genesis".to_string(),
        value: genesis.to_string(),
    }]
}

/// Three-anchor fixture: genesis g, event e1 (with document), event e2.
fn three_anchor_chain() -> (MockLedger, MockStore, String, String) {
    let g = hash(0xaa);
    let e1 = hash(0x01);
    let e2 = hash(0x02);

    let mut ledger = MockLedger::default();
    ledger.add_tx(&g, genesis_payload(&delegate(1)));
    ledger.add_tx(&e1, payload(&g, &g, Some(&arweave_id('A')), &delegate(2)));
    ledger.add_tx(&e2, payload(&g, &e1, None, &delegate(3)));

    let mut store = MockStore::default();
    store.docs.insert(arweave_id('A'), blob_doc(&g, json!([])));

    (ledger, store, g, e2)
}

#[tokio::test]
async fn test_backward_walk_reconstructs_chain() {
    let (ledger, store, g, e2) = three_anchor_chain();
    let verifier = Verifier::new(ledger, store);

    let report = verifier.verify_from_tx(&format!("0x{e2}")).await;

    assert!(report.valid, "errors: {:?}", report.ledger.errors);
    assert!(report.complete);
    assert_eq!(report.genesis_hash, g);
    assert_eq!(report.anchors.len(), 3);
    assert_eq!(report.anchors[0].step, AnchorStep::Genesis);
    assert_eq!(report.anchors[1].step, AnchorStep::Event(1));
    assert_eq!(report.anchors[2].step, AnchorStep::Event(2));
    assert_eq!(report.anchors[0].tx_hash, format!("0x{g}"));
    assert!(report.ledger.results.iter().all(|r| r.ok));
}

#[tokio::test]
async fn test_backward_walk_spec_scenario() {
    // Genesis g plus a single event e1 with a valid attached document.
    let g = hash(0xaa);
    let e1 = hash(0x01);

    let mut ledger = MockLedger::default();
    ledger.add_tx(&g, genesis_payload(&delegate(1)));
    ledger.add_tx(&e1, payload(&g, &g, Some(&arweave_id('A')), &delegate(2)));

    let mut store = MockStore::default();
    store.docs.insert(arweave_id('A'), blob_doc(&g, json!([])));

    let verifier = Verifier::new(ledger, store);
    let report = verifier.verify_from_tx(&format!("0x{e1}")).await;

    assert_eq!(report.ledger.results.len(), 2);
    assert!(report.ledger.results.iter().all(|r| r.ok));
    assert_eq!(report.blob.results.len(), 1);
    assert!(report.blob.results[0].ok);
    assert_eq!(report.support_tags_ok, None);
    assert!(report.valid);
}

#[tokio::test]
async fn test_backward_walk_zero_previous_links_to_genesis() {
    // e1 written with an all-zero previous hash: "directly after genesis".
    let g = hash(0xaa);
    let e1 = hash(0x01);

    let mut ledger = MockLedger::default();
    ledger.add_tx(&g, genesis_payload(&delegate(1)));
    ledger.add_tx(&e1, payload(&g, ZERO_HASH_HEX, None, &delegate(2)));

    let verifier = Verifier::new(ledger, MockStore::default());
    let report = verifier.verify_from_tx(&format!("0x{e1}")).await;

    assert!(report.valid);
    assert_eq!(report.anchors.len(), 2);
}

#[tokio::test]
async fn test_backward_walk_detects_genesis_mismatch() {
    // e2 belongs to chain g, but e1 names a different genesis.
    let g = hash(0xaa);
    let other = hash(0xbb);
    let e1 = hash(0x01);
    let e2 = hash(0x02);

    let mut ledger = MockLedger::default();
    ledger.add_tx(&g, genesis_payload(&delegate(1)));
    ledger.add_tx(&e1, payload(&other, &g, None, &delegate(2)));
    ledger.add_tx(&e2, payload(&g, &e1, None, &delegate(3)));

    let verifier = Verifier::new(ledger, MockStore::default());
    let report = verifier.verify_from_tx(&format!("0x{e2}")).await;

    assert!(!report.valid);
    assert!(report.ledger.errors[0].contains("linkage mismatch"));
    // The anchor visited before the mismatch stays valid.
    let e2_row = report
        .ledger
        .results
        .iter()
        .find(|r| r.tx_hash == format!("0x{e2}"))
        .unwrap();
    assert!(e2_row.ok);
    let e1_row = report
        .ledger
        .results
        .iter()
        .find(|r| r.tx_hash == format!("0x{e1}"))
        .unwrap();
    assert!(!e1_row.ok);
}

#[tokio::test]
async fn test_backward_walk_broken_link_is_fatal() {
    let g = hash(0xaa);
    let e1 = hash(0x01);
    let missing = hash(0x99);

    let mut ledger = MockLedger::default();
    ledger.add_tx(&g, genesis_payload(&delegate(1)));
    ledger.add_tx(&e1, payload(&g, &missing, None, &delegate(2)));

    let verifier = Verifier::new(ledger, MockStore::default());
    let report = verifier.verify_from_tx(&format!("0x{e1}")).await;

    assert!(!report.valid);
    assert!(report.ledger.errors[0].contains("not found"));
}

#[tokio::test]
async fn test_backward_walk_rejects_short_payload() {
    let e1 = hash(0x01);
    let mut ledger = MockLedger::default();
    ledger.add_tx(&e1, vec![0u8; 60]);

    let verifier = Verifier::new(ledger, MockStore::default());
    let report = verifier.verify_from_tx(&format!("0x{e1}")).await;

    assert!(!report.valid);
    assert!(report.ledger.errors[0].contains("malformed payload"));
}

#[tokio::test]
async fn test_backward_walk_rejects_bad_input_hash() {
    let verifier = Verifier::new(MockLedger::default(), MockStore::default());
    let report = verifier.verify_from_tx("not-a-hash").await;

    assert!(!report.valid);
    assert!(report.ledger.errors[0].contains("invalid transaction hash"));
}

#[tokio::test]
async fn test_backward_walk_detects_cycle() {
    let e1 = hash(0x01);
    let e2 = hash(0x02);
    let g = hash(0xaa);

    let mut ledger = MockLedger::default();
    ledger.add_tx(&e1, payload(&g, &e2, None, &delegate(2)));
    ledger.add_tx(&e2, payload(&g, &e1, None, &delegate(3)));

    let cancel = CancellationToken::new();
    let outcome = walk_backward(
        &ledger,
        &cr_client::RetryPolicy::default(),
        &cancel,
        &format!("0x{e1}"),
    )
    .await;

    assert!(outcome.ledger.errors.iter().any(|e| e.contains("cycle")));
}

#[tokio::test]
async fn test_forward_walk_discovers_events_across_delegates() {
    let g = hash(0xaa);
    let e1 = hash(0x01);
    let e2 = hash(0x02);
    let d1 = delegate(1);
    let d2 = delegate(2);

    let mut ledger = MockLedger::default();
    ledger.add_tx(&g, genesis_payload(&d1));
    // e1 signed by d1, naming d2 as the next signer; zero previous hash
    // exercises the genesis substitution in candidate ordering.
    let e1_payload = payload(&g, ZERO_HASH_HEX, None, &d2);
    ledger.add_tx(&e1, e1_payload.clone());
    ledger.add_history(&d1, &e1, e1_payload);
    // Noise in d1's history: wrong length, wrong genesis.
    ledger.add_history(&d1, &hash(0x70), vec![1, 2, 3]);
    ledger.add_history(&d1, &hash(0x71), payload(&hash(0xbb), &g, None, &d1));
    // e2 signed by d2, keeping d2 as signer (walk stops there).
    let e2_payload = payload(&g, &e1, Some(&arweave_id('A')), &d2);
    ledger.add_tx(&e2, e2_payload.clone());
    ledger.add_history(&d2, &e2, e2_payload);

    let mut store = MockStore::default();
    store.docs.insert(arweave_id('A'), blob_doc(&g, json!([])));

    let verifier = Verifier::new(ledger, store);
    let report = verifier.verify_from_genesis(&g).await;

    assert!(report.valid, "errors: {:?}", report.ledger.errors);
    assert_eq!(report.anchors.len(), 3);
    assert_eq!(report.anchors[1].tx_hash, format!("0x{e1}"));
    assert_eq!(report.anchors[2].tx_hash, format!("0x{e2}"));
    assert_eq!(report.anchors[2].blob_ok, Some(true));
}

#[tokio::test]
async fn test_forward_walk_stops_on_delegate_cycle() {
    let g = hash(0xaa);
    let e1 = hash(0x01);
    let e2 = hash(0x02);
    let d1 = delegate(1);
    let d2 = delegate(2);

    let mut ledger = MockLedger::default();
    ledger.add_tx(&g, genesis_payload(&d1));
    let e1_payload = payload(&g, &g, None, &d2);
    ledger.add_history(&d1, &e1, e1_payload);
    // e2 hands back to d1, which was already seen.
    let e2_payload = payload(&g, &e1, None, &d1);
    ledger.add_history(&d2, &e2, e2_payload);

    let verifier = Verifier::new(ledger, MockStore::default());
    let report = verifier.verify_from_genesis(&g).await;

    assert!(report.valid);
    assert_eq!(report.anchors.len(), 3);
}

#[tokio::test]
async fn test_forward_walk_empty_history_is_not_an_error() {
    let g = hash(0xaa);
    let mut ledger = MockLedger::default();
    ledger.add_tx(&g, genesis_payload(&delegate(1)));

    let verifier = Verifier::new(ledger, MockStore::default());
    let report = verifier.verify_from_genesis(&g).await;

    assert!(report.valid);
    assert_eq!(report.anchors.len(), 1);
    assert_eq!(report.support_tags_ok, None);
}

#[tokio::test]
async fn test_forward_walk_requires_genesis_payload() {
    let g = hash(0xaa);
    let mut ledger = MockLedger::default();
    // A transaction exists at g but is an event payload, not a genesis.
    ledger.add_tx(&g, payload(&hash(0xbb), &hash(0xcc), None, &delegate(1)));

    let verifier = Verifier::new(ledger, MockStore::default());
    let report = verifier.verify_from_genesis(&g).await;

    assert!(!report.valid);
    assert!(report.ledger.errors[0].contains("not a genesis anchor"));
}

#[tokio::test]
async fn test_forward_walk_missing_genesis_is_fatal() {
    let verifier = Verifier::new(MockLedger::default(), MockStore::default());
    let report = verifier.verify_from_genesis(&hash(0xaa)).await;

    assert!(!report.valid);
    assert!(report.ledger.errors[0].contains("not found"));
}

#[tokio::test]
async fn test_blob_genesis_mismatch_fails_blob_layer_only() {
    let (ledger, mut store, g, _) = three_anchor_chain();
    // Replace e1's document with one naming a foreign genesis.
    store
        .docs
        .insert(arweave_id('A'), blob_doc(&hash(0xbb), json!([])));

    let e1 = hash(0x01);
    let verifier = Verifier::new(ledger, store);
    let report = verifier.verify_from_tx(&format!("0x{e1}")).await;

    assert!(!report.valid);
    assert!(report.ledger.errors.is_empty(), "ledger layer must stay clean");
    assert!(report.blob.errors[0].contains("genesis"));
    let event = report
        .anchors
        .iter()
        .find(|a| a.tx_hash == format!("0x{e1}"))
        .unwrap();
    assert_eq!(event.blob_ok, Some(false));
    assert_eq!(report.genesis_hash, g);
}

#[tokio::test]
async fn test_blob_genesis_match_is_case_insensitive() {
    let g = hash(0xaa);
    let e1 = hash(0x01);

    let mut ledger = MockLedger::default();
    ledger.add_tx(&g, genesis_payload(&delegate(1)));
    ledger.add_tx(&e1, payload(&g, &g, Some(&arweave_id('A')), &delegate(2)));

    let mut store = MockStore::default();
    store
        .docs
        .insert(arweave_id('A'), blob_doc(&g.to_uppercase(), json!([])));

    let verifier = Verifier::new(ledger, store);
    let report = verifier.verify_from_tx(&format!("0x{e1}")).await;

    assert!(report.valid, "errors: {:?}", report.blob.errors);
}

#[tokio::test]
async fn test_blob_schema_violations_reported() {
    let (ledger, mut store, _, _) = three_anchor_chain();
    store.docs.insert(
        arweave_id('A'),
        json!({ "genesis": "nope", "summary": [] }),
    );

    let verifier = Verifier::new(ledger, store);
    let report = verifier.verify_from_tx(&format!("0x{}", hash(0x01))).await;

    assert!(!report.valid);
    assert!(report.blob.errors[0].contains("schema"));
}

#[tokio::test]
async fn test_missing_blob_does_not_block_siblings() {
    let g = hash(0xaa);
    let e1 = hash(0x01);
    let e2 = hash(0x02);

    let mut ledger = MockLedger::default();
    ledger.add_tx(&g, genesis_payload(&delegate(1)));
    ledger.add_tx(&e1, payload(&g, &g, Some(&arweave_id('A')), &delegate(2)));
    ledger.add_tx(&e2, payload(&g, &e1, Some(&arweave_id('B')), &delegate(3)));

    let mut store = MockStore::default();
    // Only e2's document exists.
    store.docs.insert(arweave_id('B'), blob_doc(&g, json!([])));

    let verifier = Verifier::new(ledger, store);
    let report = verifier.verify_from_tx(&format!("0x{e2}")).await;

    assert!(!report.valid);
    assert_eq!(report.blob.results.len(), 2);
    assert!(!report.blob.results[0].ok);
    assert!(report.blob.results[1].ok);
    // Blob rows come back in chain order despite concurrent fetching.
    assert_eq!(report.blob.results[0].blob_id, arweave_id('A'));
    assert_eq!(report.blob.results[1].blob_id, arweave_id('B'));
}

#[tokio::test]
async fn test_anchor_without_document_has_null_blob_status() {
    let (ledger, store, _, e2) = three_anchor_chain();
    let verifier = Verifier::new(ledger, store);
    let report = verifier.verify_from_tx(&format!("0x{e2}")).await;

    let last = report.anchors.last().unwrap();
    assert_eq!(last.blob_ok, None, "no document means no check, not a failure");
}

#[tokio::test]
async fn test_support_tags_all_match() {
    let g = hash(0xaa);
    let e1 = hash(0x01);

    let mut ledger = MockLedger::default();
    ledger.add_tx(&g, genesis_payload(&delegate(1)));
    ledger.add_tx(&e1, payload(&g, &g, Some(&arweave_id('A')), &delegate(2)));

    let mut store = MockStore::default();
    store.docs.insert(
        arweave_id('A'),
        blob_doc(
            &g,
            json!([{ "id": arweave_id('S') }, { "id": arweave_id('T'), "label": "receipt" }]),
        ),
    );
    store.tags.insert(arweave_id('S'), genesis_tag(&g));
    store.tags.insert(arweave_id('T'), genesis_tag(&g));

    let verifier = Verifier::new(ledger, store);
    let report = verifier.verify_from_tx(&format!("0x{e1}")).await;

    assert!(report.valid);
    assert_eq!(report.support_tags_ok, Some(true));
    assert!(report.support_errors.is_empty());
}

#[tokio::test]
async fn test_support_tag_failures_named_exhaustively() {
    let g = hash(0xaa);
    let e1 = hash(0x01);

    let mut ledger = MockLedger::default();
    ledger.add_tx(&g, genesis_payload(&delegate(1)));
    ledger.add_tx(&e1, payload(&g, &g, Some(&arweave_id('A')), &delegate(2)));

    let mut store = MockStore::default();
    store.docs.insert(
        arweave_id('A'),
        blob_doc(
            &g,
            json!([{ "id": arweave_id('S') }, { "id": arweave_id('T') }, { "id": arweave_id('U') }]),
        ),
    );
    // S is fine, T has a tag for the wrong chain, U has no tags at all.
    store.tags.insert(arweave_id('S'), genesis_tag(&g));
    store.tags.insert(arweave_id('T'), genesis_tag(&hash(0xbb)));

    let verifier = Verifier::new(ledger, store);
    let report = verifier.verify_from_tx(&format!("0x{e1}")).await;

    assert_eq!(report.support_tags_ok, Some(false));
    assert_eq!(report.support_errors.len(), 2);
    assert!(report.support_errors[0].contains(&arweave_id('T')));
    assert!(report.support_errors[1].contains(&arweave_id('U')));
    // Ledger and blob layers are untouched by support failures.
    assert!(report.valid);
}

#[tokio::test]
async fn test_support_tag_fail_fast_stops_at_first_failure() {
    let g = hash(0xaa);
    let e1 = hash(0x01);

    let mut ledger = MockLedger::default();
    ledger.add_tx(&g, genesis_payload(&delegate(1)));
    ledger.add_tx(&e1, payload(&g, &g, Some(&arweave_id('A')), &delegate(2)));

    let mut store = MockStore::default();
    store.docs.insert(
        arweave_id('A'),
        blob_doc(&g, json!([{ "id": arweave_id('T') }, { "id": arweave_id('U') }])),
    );

    let options = VerifyOptions {
        tag_check: TagCheckMode::FailFast,
        ..VerifyOptions::default()
    };
    let verifier = Verifier::with_options(ledger, store, options);
    let report = verifier.verify_from_tx(&format!("0x{e1}")).await;

    assert_eq!(report.support_tags_ok, Some(false));
    assert_eq!(report.support_errors.len(), 1);
}

#[tokio::test]
async fn test_cancelled_verification_reports_incomplete() {
    let (ledger, store, _, e2) = three_anchor_chain();
    let options = VerifyOptions::default();
    options.cancel.cancel();

    let verifier = Verifier::with_options(ledger, store, options);
    let report = verifier.verify_from_tx(&format!("0x{e2}")).await;

    assert!(!report.complete);
}

#[tokio::test]
async fn test_cancel_aborts_inflight_backward_fetch() {
    // The token fires while the fetch is in flight; the walk must return
    // right away instead of waiting out the timeout and retry.
    let cancel = CancellationToken::new();
    let ledger = StallingLedger {
        cancel: cancel.clone(),
        txs: HashMap::new(),
    };

    let outcome = walk_backward(
        &ledger,
        &cr_client::RetryPolicy::default(),
        &cancel,
        &format!("0x{}", hash(0x01)),
    )
    .await;

    assert!(!outcome.complete);
    assert!(outcome.ledger.errors.is_empty());
    assert!(outcome.anchors.is_empty());
}

#[tokio::test]
async fn test_cancel_aborts_inflight_history_fetch() {
    let g = hash(0xaa);
    let cancel = CancellationToken::new();
    let mut txs = HashMap::new();
    txs.insert(g.clone(), genesis_payload(&delegate(1)));
    let ledger = StallingLedger {
        cancel: cancel.clone(),
        txs,
    };

    let outcome = walk_forward(&ledger, &cr_client::RetryPolicy::default(), &cancel, &g).await;

    assert!(!outcome.complete);
    assert_eq!(outcome.anchors.len(), 1, "genesis anchor is kept");
    assert!(outcome.ledger.errors.is_empty());
}

struct PanickingStore;

#[async_trait]
impl BlobStore for PanickingStore {
    async fn get_document(&self, _id: &str) -> Result<Value, TransportError> {
        panic!("document backend fell over");
    }

    async fn get_document_tags(&self, _id: &str) -> Result<Vec<Tag>, TransportError> {
        Err(TransportError::NotFound)
    }
}

#[tokio::test]
async fn test_crashed_document_check_fails_the_row() {
    let g = hash(0xaa);
    let e1 = hash(0x01);

    let mut ledger = MockLedger::default();
    ledger.add_tx(&g, genesis_payload(&delegate(1)));
    ledger.add_tx(&e1, payload(&g, &g, Some(&arweave_id('A')), &delegate(2)));

    let verifier = Verifier::new(ledger, PanickingStore);
    let report = verifier.verify_from_tx(&format!("0x{e1}")).await;

    // The anchor's document check crashed; that is a failed check, not
    // "no document to check".
    assert!(!report.valid);
    assert!(report.complete);
    assert_eq!(report.blob.results.len(), 1);
    assert!(!report.blob.results[0].ok);
    assert_eq!(report.blob.results[0].blob_id, arweave_id('A'));
    assert!(report.blob.errors[0].contains(&arweave_id('A')));
    let event = report.anchors.last().unwrap();
    assert_eq!(event.blob_ok, Some(false));
}

#[tokio::test]
async fn test_resolve_tx_hash_goes_backward() {
    let store = MockStore::default();
    let retry = cr_client::RetryPolicy::default();
    let input = format!("0x{}", hash(0x01));

    let resolved = resolve_input(&store, &retry, &input).await.unwrap();
    assert_eq!(resolved, Resolved::Backward { tx_hash: input });
}

#[tokio::test]
async fn test_resolve_bare_hex_goes_forward() {
    let store = MockStore::default();
    let retry = cr_client::RetryPolicy::default();
    let input = hash(0xaa).to_uppercase();

    let resolved = resolve_input(&store, &retry, &input).await.unwrap();
    assert_eq!(
        resolved,
        Resolved::Forward {
            genesis_hash: hash(0xaa)
        }
    );
}

#[tokio::test]
async fn test_resolve_arweave_id_via_document_genesis() {
    let g = hash(0xaa);
    let mut store = MockStore::default();
    store.docs.insert(arweave_id('A'), blob_doc(&g, json!([])));

    let retry = cr_client::RetryPolicy::default();
    let resolved = resolve_input(&store, &retry, &arweave_id('A')).await.unwrap();
    assert_eq!(resolved, Resolved::Forward { genesis_hash: g });
}

#[tokio::test]
async fn test_resolve_arweave_id_via_genesis_tag() {
    let g = hash(0xaa);
    let mut store = MockStore::default();
    // A support file: no document body with a genesis, but a tag.
    store.tags.insert(arweave_id('S'), genesis_tag(&g));

    let retry = cr_client::RetryPolicy::default();
    let resolved = resolve_input(&store, &retry, &arweave_id('S')).await.unwrap();
    assert_eq!(resolved, Resolved::Forward { genesis_hash: g });
}

#[tokio::test]
async fn test_resolve_arweave_id_without_genesis_fails() {
    let mut store = MockStore::default();
    store.docs.insert(arweave_id('X'), json!({ "other": true }));

    let retry = cr_client::RetryPolicy::default();
    let err = resolve_input(&store, &retry, &arweave_id('X'))
        .await
        .unwrap_err();
    assert_eq!(err, ResolveError::NoGenesis(arweave_id('X')));
}

#[tokio::test]
async fn test_resolve_rejects_garbage() {
    let store = MockStore::default();
    let retry = cr_client::RetryPolicy::default();

    assert_eq!(
        resolve_input(&store, &retry, "hello world").await.unwrap_err(),
        ResolveError::Unrecognized
    );
    assert_eq!(
        resolve_input(&store, &retry, "0x1234").await.unwrap_err(),
        ResolveError::Unrecognized
    );
}

#[tokio::test]
async fn test_verify_input_dispatches_to_forward_walk() {
    let (ledger, store, g, _) = three_anchor_chain();
    let verifier = Verifier::new(ledger, store);

    let report = verifier.verify_input(&g).await.unwrap();
    assert_eq!(report.genesis_hash, g);
    assert_eq!(report.anchors[0].step, AnchorStep::Genesis);
}

#[tokio::test]
async fn test_report_serializes_to_json() {
    let (ledger, store, _, e2) = three_anchor_chain();
    let verifier = Verifier::new(ledger, store);
    let report = verifier.verify_from_tx(&format!("0x{e2}")).await;

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["valid"], json!(true));
    assert_eq!(json["supportTagsOk"], json!(null));
    assert_eq!(json["anchors"][0]["step"], json!("genesis"));
    assert_eq!(json["ledger"]["results"][1]["step"], json!("event-1"));
}
