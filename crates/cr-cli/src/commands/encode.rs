//! Build an anchor payload from its fields.

use anyhow::Result;
use clap::Args;
use cr_codec::{encode_hex, PayloadFields};

#[derive(Debug, Args)]
pub struct EncodeArgs {
    /// Genesis transaction hash (64 hex characters, `0x` optional)
    #[arg(long)]
    pub genesis: String,
    /// Previous anchor transaction hash (64 hex characters, `0x` optional)
    #[arg(long)]
    pub previous: String,
    /// Arweave document id (43 characters); omit when the anchor carries no
    /// document
    #[arg(long)]
    pub arweave_id: Option<String>,
    /// Delegate address (`0x` + 40 hex characters)
    #[arg(long)]
    pub delegate: String,
}

/// Print the `0x`-prefixed transaction data for the given fields.
pub fn cmd_encode(args: EncodeArgs) -> Result<()> {
    let data = encode_hex(&PayloadFields {
        genesis_hash: args.genesis,
        previous_hash: args.previous,
        arweave_id: args.arweave_id,
        delegate: args.delegate,
    })?;
    println!("{data}");
    Ok(())
}
