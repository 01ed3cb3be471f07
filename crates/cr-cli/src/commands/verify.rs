//! Verify a provenance chain end to end and print the report.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use cr_client::{ArweaveConfig, ArweaveGateway, EvmRpc, EvmRpcConfig};
use cr_verify::{TagCheckMode, Verifier, VerifyOptions, VerifyReport};
use tracing::info;

#[derive(Debug, Args)]
pub struct VerifyArgs {
    /// Transaction hash (`0x` + 64 hex), genesis hash (64 hex) or arweave
    /// document id (43 characters)
    pub input: String,
    /// Ledger JSON-RPC endpoint
    #[arg(long)]
    pub rpc_url: Option<String>,
    /// Etherscan-compatible explorer API endpoint (address history)
    #[arg(long)]
    pub explorer_url: Option<String>,
    /// Explorer API key
    #[arg(long)]
    pub explorer_api_key: Option<String>,
    /// Arweave gateway base URL
    #[arg(long)]
    pub gateway_url: Option<String>,
    /// Stop support-tag checking at the first failure
    #[arg(long)]
    pub fail_fast: bool,
    /// Concurrent blob and tag fetches
    #[arg(long, default_value_t = 4)]
    pub concurrency: usize,
    /// Print the full report as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn cmd_verify(args: VerifyArgs) -> Result<ExitCode> {
    let mut rpc_config = EvmRpcConfig::default();
    if let Some(url) = args.rpc_url {
        rpc_config.rpc_url = url;
    }
    if let Some(url) = args.explorer_url {
        rpc_config.explorer_url = url;
    }
    rpc_config.explorer_api_key = args.explorer_api_key;

    let mut arweave_config = ArweaveConfig::default();
    if let Some(url) = args.gateway_url {
        arweave_config.gateway_url = url;
    }

    let options = VerifyOptions {
        max_concurrency: args.concurrency,
        tag_check: if args.fail_fast {
            TagCheckMode::FailFast
        } else {
            TagCheckMode::Exhaustive
        },
        ..VerifyOptions::default()
    };
    let verifier = Verifier::with_options(
        EvmRpc::new(rpc_config),
        ArweaveGateway::new(arweave_config),
        options,
    );

    info!(input = %args.input, "verifying provenance chain");
    let report = verifier.verify_input(&args.input).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(if report.valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn print_report(report: &VerifyReport) {
    println!("{}", "Provenance Chain".bold().underline());
    if report.genesis_hash.is_empty() {
        println!("{}: {}", "Genesis".bold(), "unknown".yellow());
    } else {
        println!("{}: {}", "Genesis".bold(), report.genesis_hash);
    }
    println!("{}: {}", "Anchors".bold(), report.anchors.len());
    println!();

    for anchor in &report.anchors {
        println!(
            "{} {}",
            anchor.step.to_string().cyan().bold(),
            anchor.tx_hash
        );
        if !anchor.decoded.arweave_id.is_empty() {
            let status = match anchor.blob_ok {
                Some(true) => "ok".green(),
                Some(false) => "invalid".red(),
                None => "unchecked".yellow(),
            };
            println!(
                "  {}: {} ({status})",
                "Document".bold(),
                anchor.decoded.arweave_id
            );
        }
        if let Some(summary) = &anchor.blob_summary {
            println!("  {}: {}", "Event".bold(), summary.event_type);
            println!("  {}: {}", "Timestamp".bold(), summary.timestamp);
            for support in &summary.supports {
                match &support.label {
                    Some(label) => {
                        println!("  {}: {} ({label})", "Support".bold(), support.id)
                    }
                    None => println!("  {}: {}", "Support".bold(), support.id),
                }
            }
        }
    }

    let has_errors = !report.ledger.errors.is_empty()
        || !report.blob.errors.is_empty()
        || !report.support_errors.is_empty();
    if has_errors {
        println!();
        for error in &report.ledger.errors {
            println!("{} {error}", "ledger:".red().bold());
        }
        for error in &report.blob.errors {
            println!("{} {error}", "blob:".red().bold());
        }
        for error in &report.support_errors {
            println!("{} {error}", "support:".red().bold());
        }
    }

    println!();
    match report.support_tags_ok {
        Some(true) => println!("{} support tags verified", "✓".green().bold()),
        Some(false) => println!("{} support tag check failed", "✗".red().bold()),
        None => {}
    }
    if !report.complete {
        println!(
            "{}",
            "verification was cancelled before completion".yellow()
        );
    }
    println!("{}", "Summary:".bold().underline());
    println!("  {}: {}", "Anchors".bold(), report.anchors.len());
    let status = if report.valid {
        "VALID".green().bold()
    } else {
        "INVALID".red().bold()
    };
    println!("  {}: {status}", "Status".bold());
}
