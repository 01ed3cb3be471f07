//! Validate an event blob document against the schema.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use colored::Colorize;
use cr_blob::BlobReport;
use serde_json::Value;

/// Read and validate a blob file, reporting every violation at once.
pub fn validate_file(file: &Path) -> Result<BlobReport> {
    let raw = fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let value: Value = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not valid JSON", file.display()))?;
    Ok(cr_blob::validate(&value))
}

pub fn cmd_validate(file: PathBuf, json: bool) -> Result<ExitCode> {
    let report = validate_file(&file)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if report.valid {
        println!("{} blob is valid", "✓".green().bold());
    } else {
        println!("{} blob failed validation:", "✗".red().bold());
        for error in &report.errors {
            println!("  - {error}");
        }
    }

    Ok(if report.valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
