//! Decode an anchor payload from its transaction-data hex form.

use std::fs;
use std::path::Path;

use anyhow::Result;
use colored::Colorize;
use cr_codec::decode_hex;

/// Accepts the hex either inline or as a path to a file containing it.
pub fn cmd_decode(data: &str, json: bool) -> Result<()> {
    let contents;
    let data = if Path::new(data).is_file() {
        contents = fs::read_to_string(data)?;
        contents.trim()
    } else {
        data
    };
    let decoded = decode_hex(data)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&decoded)?);
        return Ok(());
    }

    println!("{}", "Anchor Payload".bold().underline());
    println!("{}: {}", "Genesis".bold(), decoded.genesis_hash);
    println!("{}: {}", "Previous".bold(), decoded.previous_hash);
    if decoded.arweave_id.is_empty() {
        println!("{}: {}", "Arweave ID".bold(), "none".yellow());
    } else {
        println!("{}: {}", "Arweave ID".bold(), decoded.arweave_id);
    }
    println!("{}: {}", "Delegate".bold(), decoded.delegate);
    if decoded.is_genesis() {
        println!();
        println!("{}", "This is a genesis anchor.".green());
    }
    Ok(())
}
