use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use cr_cli::commands;

/// ChainRoute CLI entry point.
#[derive(Parser, Debug)]
#[command(
    name = "chainroute",
    version,
    about = "Reconstruct and verify ChainRoute provenance chains"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode a 127-byte anchor payload from its transaction-data hex
    Decode {
        /// `0x` + 254 hex characters, as stored in the transaction data
        data: String,
        /// Print the decoded fields as JSON
        #[arg(long)]
        json: bool,
    },
    /// Build an anchor payload from its fields
    Encode(commands::encode::EncodeArgs),
    /// Validate an event blob JSON document against the schema
    ValidateBlob {
        /// Path to the blob JSON file
        file: PathBuf,
        /// Print the validation report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Verify a provenance chain from a tx hash, genesis hash or arweave id
    Verify(commands::verify::VerifyArgs),
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    match cli.command {
        Commands::Decode { data, json } => {
            commands::decode::cmd_decode(&data, json)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Encode(args) => {
            commands::encode::cmd_encode(args)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::ValidateBlob { file, json } => commands::blob::cmd_validate(file, json),
        Commands::Verify(args) => commands::verify::cmd_verify(args).await,
    }
}
