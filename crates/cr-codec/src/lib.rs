//! Encoding and decoding of the fixed 127-byte ChainRoute anchor payload.
//!
//! Wire layout, big-endian concatenation:
//!
//! | Offset | Length | Field          |
//! |--------|--------|----------------|
//! | 0      | 32     | genesis hash   |
//! | 32     | 32     | previous hash  |
//! | 64     | 43     | arweave id     |
//! | 107    | 20     | delegate       |
//!
//! The genesis anchor carries all-zero hash fields and an all-zero arweave
//! span. An all-zero arweave span in any anchor means "no off-chain document".

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Total payload length in bytes.
pub const PAYLOAD_LEN: usize = 127;

/// Length of each hash field in bytes.
pub const HASH_LEN: usize = 32;

/// Length of the arweave document id field in bytes (and characters).
pub const ARWEAVE_ID_LEN: usize = 43;

/// Length of the delegate account field in bytes.
pub const DELEGATE_LEN: usize = 20;

/// 32 zero bytes rendered as hex; the hash value of the genesis payload.
pub const ZERO_HASH_HEX: &str =
    "0000000000000000000000000000000000000000000000000000000000000000";

/// Errors produced by payload encoding and decoding.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("genesisHash must be 64 hex characters")]
    InvalidGenesisHash,

    #[error("previousHash must be 64 hex characters")]
    InvalidPreviousHash,

    #[error("delegate must be 0x followed by 40 hex characters")]
    InvalidDelegate,

    #[error("arweaveId must be a 43-character string encoding to exactly 43 UTF-8 bytes")]
    InvalidArweaveId,

    #[error("payload must be {PAYLOAD_LEN} bytes, got {0}")]
    BadLength(usize),

    #[error("payload is not valid hex: {0}")]
    BadHex(String),

    #[error("arweaveId bytes are not valid UTF-8")]
    BadArweaveUtf8,
}

/// Input fields for building a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadFields {
    /// 64-hex genesis transaction hash (all zeros for the genesis anchor).
    pub genesis_hash: String,
    /// 64-hex previous transaction hash (all zeros for the genesis anchor).
    pub previous_hash: String,
    /// 43-character off-chain document id, or `None` for no document.
    pub arweave_id: Option<String>,
    /// `0x` + 40 hex delegate account.
    pub delegate: String,
}

/// A payload decoded back into human-readable form.
///
/// Hash fields are lowercase hex without a `0x` prefix; the delegate keeps
/// its `0x` prefix; an absent document id decodes to the empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedPayload {
    pub genesis_hash: String,
    pub previous_hash: String,
    pub arweave_id: String,
    pub delegate: String,
}

impl DecodedPayload {
    /// True iff this is a genesis payload: both hash fields all-zero and no
    /// arweave id.
    pub fn is_genesis(&self) -> bool {
        self.genesis_hash == ZERO_HASH_HEX
            && self.previous_hash == ZERO_HASH_HEX
            && self.arweave_id.is_empty()
    }
}

/// Strip an optional `0x`/`0X` prefix.
pub fn strip_0x(s: &str) -> &str {
    s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s)
}

/// Lowercase a hash and drop its `0x` prefix for comparisons and map keys.
pub fn normalize_hash(s: &str) -> String {
    strip_0x(s).to_ascii_lowercase()
}

fn is_hex_of_len(s: &str, len: usize) -> bool {
    s.len() == len && s.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Encode the four payload fields into the 127-byte wire form.
///
/// Hash inputs tolerate a `0x` prefix. An absent or empty arweave id encodes
/// as 43 zero bytes; an explicit id must be 43 characters whose UTF-8
/// encoding is exactly 43 bytes and must not itself encode to all zeros
/// (that span is reserved for "no document").
pub fn encode(fields: &PayloadFields) -> Result<[u8; PAYLOAD_LEN], CodecError> {
    let genesis = strip_0x(&fields.genesis_hash);
    let previous = strip_0x(&fields.previous_hash);
    if !is_hex_of_len(genesis, HASH_LEN * 2) {
        return Err(CodecError::InvalidGenesisHash);
    }
    if !is_hex_of_len(previous, HASH_LEN * 2) {
        return Err(CodecError::InvalidPreviousHash);
    }
    let delegate = fields
        .delegate
        .strip_prefix("0x")
        .filter(|rest| is_hex_of_len(rest, DELEGATE_LEN * 2))
        .ok_or(CodecError::InvalidDelegate)?;

    let mut arweave = [0u8; ARWEAVE_ID_LEN];
    if let Some(id) = fields.arweave_id.as_deref().filter(|id| !id.is_empty()) {
        if id.chars().count() != ARWEAVE_ID_LEN || id.len() != ARWEAVE_ID_LEN {
            return Err(CodecError::InvalidArweaveId);
        }
        arweave.copy_from_slice(id.as_bytes());
        // The all-zero span is the "no document" sentinel.
        if arweave.iter().all(|b| *b == 0) {
            return Err(CodecError::InvalidArweaveId);
        }
    }

    let mut out = [0u8; PAYLOAD_LEN];
    hex::decode_to_slice(genesis.to_ascii_lowercase(), &mut out[..32])
        .map_err(|_| CodecError::InvalidGenesisHash)?;
    hex::decode_to_slice(previous.to_ascii_lowercase(), &mut out[32..64])
        .map_err(|_| CodecError::InvalidPreviousHash)?;
    out[64..107].copy_from_slice(&arweave);
    hex::decode_to_slice(delegate.to_ascii_lowercase(), &mut out[107..])
        .map_err(|_| CodecError::InvalidDelegate)?;
    Ok(out)
}

/// Encode to the `0x` + 254-hex-character transaction data form.
pub fn encode_hex(fields: &PayloadFields) -> Result<String, CodecError> {
    Ok(format!("0x{}", hex::encode(encode(fields)?)))
}

/// Decode a raw 127-byte payload.
pub fn decode(bytes: &[u8]) -> Result<DecodedPayload, CodecError> {
    if bytes.len() != PAYLOAD_LEN {
        return Err(CodecError::BadLength(bytes.len()));
    }
    let arweave_span = &bytes[64..107];
    let arweave_id = if arweave_span.iter().all(|b| *b == 0) {
        String::new()
    } else {
        std::str::from_utf8(arweave_span)
            .map_err(|_| CodecError::BadArweaveUtf8)?
            .to_string()
    };
    Ok(DecodedPayload {
        genesis_hash: hex::encode(&bytes[..32]),
        previous_hash: hex::encode(&bytes[32..64]),
        arweave_id,
        delegate: format!("0x{}", hex::encode(&bytes[107..])),
    })
}

/// Decode from transaction data hex (optional `0x` prefix).
pub fn decode_hex(data: &str) -> Result<DecodedPayload, CodecError> {
    let bytes = hex::decode(strip_0x(data)).map_err(|e| CodecError::BadHex(e.to_string()))?;
    decode(&bytes)
}
