//! `samm-context-check`: Validates JSON-LD context files produced by `samm-context`.
//!
//! Runs the context conformance checks (layout, header, prefixes, terms,
//! datatypes, scoped contexts) on every file given.
//!
//! **Usage:**
//! ```
//! samm-context-check [--json] <FILE>...
//! ```
//!
//! With `--json`, prints `[{"file": ..., "results": [...]}, ...]` instead of
//! the text report. Exits non-zero if any conformance check fails.

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use samm_context_conformance::{validate_file, ConformanceReport};
use serde_json::json;

/// Check generated JSON-LD contexts.
#[derive(Parser)]
#[command(
    name = "samm-context-check",
    about = "Validate generated SAMM JSON-LD contexts"
)]
struct Args {
    /// Context files (bare context or `{"@context": ...}` documents).
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Print the reports as JSON.
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    if args.json {
        return print_json(&args.files);
    }

    println!("SAMM Context Conformance Report");
    println!("===============================");

    let mut report = ConformanceReport::new();
    for file in &args.files {
        println!();
        println!("{}", file.display());
        let file_report = validate_file(file)?;
        for result in &file_report.results {
            println!("{result}");
        }
        report.extend(file_report);
    }

    println!();
    println!("Summary: {}", report.summary());

    if !report.all_passed() {
        eprintln!(
            "Conformance FAILED: {} check(s) did not pass.",
            report.failure_count()
        );
        process::exit(1);
    }

    println!("Conformance PASSED.");
    Ok(())
}

fn print_json(files: &[PathBuf]) -> Result<()> {
    let mut reports = Vec::with_capacity(files.len());
    let mut failed = false;
    for file in files {
        let report = validate_file(file)?;
        failed |= !report.all_passed();
        let results =
            serde_json::to_value(&report.results).context("Failed to serialize results")?;
        reports.push(json!({
            "file": file.display().to_string(),
            "results": results,
        }));
    }
    let rendered = serde_json::to_string_pretty(&reports)
        .context("Failed to serialize report")?;
    println!("{rendered}");
    if failed {
        process::exit(1);
    }
    Ok(())
}
