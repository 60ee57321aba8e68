//! # Validate Subcommand
//!
//! Validates a project metadata document against the protocol rules and
//! prints every violation and anomaly in one pass.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use pidx_document::validate::{validate_document, ValidationReport};

/// Arguments for the validate subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to a project metadata document (JSON).
    pub path: PathBuf,

    /// Emit the validation report as JSON instead of human-readable text.
    #[arg(long)]
    pub json: bool,
}

/// Execute the validate subcommand. Exit code 0 when the document
/// conforms, 1 when it does not.
pub fn run_validate(args: &ValidateArgs) -> Result<u8> {
    let report = validate_file(&args.path)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&args.path, &report);
    }

    Ok(if report.is_valid() { 0 } else { 1 })
}

/// Read, parse, and validate one document file.
fn validate_file(path: &Path) -> Result<ValidationReport> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let doc: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;

    tracing::debug!(path = %path.display(), "validating document");
    Ok(validate_document(&doc))
}

fn print_report(path: &Path, report: &ValidationReport) {
    if report.is_valid() {
        println!("{}: OK", path.display());
    } else {
        println!(
            "{}: {} violation(s)",
            path.display(),
            report.violations().len()
        );
    }
    if !report.violations().is_empty() || !report.anomalies().is_empty() {
        println!("{report}");
    }
}
