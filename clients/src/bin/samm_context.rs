//! `samm-context`: Generates the JSON-LD 1.1 context of a SAMM aspect.
//!
//! Reads the aspect's JSON Schema either from a file (`--schema`) or from a
//! local checkout of a semantic models repository (`--repository`, laid out
//! as `<namespace>/<version>/gen/<Aspect>-schema.json`), and writes
//! `{"@context": ...}` to stdout or `--out`.
//!
//! **Usage:**
//! ```
//! samm-context <SEMANTIC_ID> [--schema <file> | --repository <dir>] [--nested]
//!              [--prefix <p>] [--max-depth <n>] [--best-effort] [--coerce-all]
//!              [--config <file.toml>] [--out <file>] [--check] [-v...]
//! ```
//!
//! With `--check`, exits non-zero if the generated context fails conformance.

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser};
use samm_context::{
    translate_flat, translate_nested, ErrorPolicy, FileSystemResolver, SchemaDocument,
    SchemaSource, TranslateOptions, TypeCoercion,
};
use samm_context_conformance::validate_value;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Generate a JSON-LD context for a SAMM aspect schema.
#[derive(Parser)]
#[command(
    name = "samm-context",
    version,
    about = "Generate a JSON-LD 1.1 context from a SAMM aspect JSON Schema"
)]
struct Args {
    /// Semantic identifier, e.g. urn:samm:io.catenax.pcf:7.0.0#Pcf.
    semantic_id: String,

    /// Aspect JSON Schema file.
    #[arg(long, conflicts_with = "repository")]
    schema: Option<PathBuf>,

    /// Root of a local semantic models repository checkout.
    #[arg(long)]
    repository: Option<PathBuf>,

    /// Emit the nested form (scoped contexts per object property).
    #[arg(long)]
    nested: bool,

    /// Prefix bound to the aspect namespace (default: cx).
    #[arg(long)]
    prefix: Option<String>,

    /// Maximum nesting of object terms (default: 2).
    #[arg(long)]
    max_depth: Option<usize>,

    /// Replace failing properties with link-only terms instead of aborting.
    #[arg(long)]
    best_effort: bool,

    /// Put an explicit @type on every scalar term.
    #[arg(long)]
    coerce_all: bool,

    /// TOML file with translation options; flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output file (default: stdout).
    #[arg(long)]
    out: Option<PathBuf>,

    /// Run the conformance checks on the generated context.
    #[arg(long)]
    check: bool,

    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let options = load_options(&args)?;

    let document = match &args.schema {
        Some(path) => Some(read_schema(path)?),
        None => None,
    };
    let resolver = args
        .repository
        .as_ref()
        .map(|root| FileSystemResolver::new(root));
    let source = match (&document, &resolver) {
        (Some(document), _) => SchemaSource::Document(document),
        (None, Some(resolver)) => SchemaSource::Resolver {
            resolver,
            repository: None,
        },
        (None, None) => bail!("either --schema or --repository is required"),
    };

    let context = if args.nested {
        translate_nested(&args.semantic_id, source, &options)
    } else {
        translate_flat(&args.semantic_id, source, &options)
    }
    .with_context(|| format!("Failed to translate {}", args.semantic_id))?;

    for demotion in context.demotions() {
        warn!(path = %demotion.path, reason = %demotion.reason, "term demoted to a link");
    }

    let json_ld = context.to_json_ld();
    let rendered = serde_json::to_string_pretty(&json_ld).context("Failed to serialize context")?;
    match &args.out {
        Some(out) => {
            fs::write(out, format!("{rendered}\n"))
                .with_context(|| format!("Failed to write {}", out.display()))?;
            info!(path = %out.display(), terms = context.terms().len(), "context written");
        }
        None => println!("{rendered}"),
    }

    if args.check {
        let report = validate_value(&json_ld)?;
        for result in &report.results {
            eprintln!("{result}");
        }
        eprintln!("Summary: {}", report.summary());
        if !report.all_passed() {
            eprintln!(
                "Conformance FAILED: {} check(s) did not pass.",
                report.failure_count()
            );
            process::exit(1);
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Config file values first, then explicit flags on top.
fn load_options(args: &Args) -> Result<TranslateOptions> {
    let mut options = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            toml::from_str(&text)
                .with_context(|| format!("Failed to parse config {}", path.display()))?
        }
        None => TranslateOptions::default(),
    };

    if let Some(prefix) = &args.prefix {
        options.prefix.clone_from(prefix);
    }
    if let Some(max_depth) = args.max_depth {
        options.max_depth = max_depth;
    }
    if args.best_effort {
        options.policy = ErrorPolicy::BestEffort;
    }
    if args.coerce_all {
        options.coercion = TypeCoercion::Always;
    }
    Ok(options)
}

fn read_schema(path: &Path) -> Result<SchemaDocument> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read schema {}", path.display()))?;
    SchemaDocument::from_json(&text, &path.display().to_string())
        .with_context(|| format!("Failed to load schema {}", path.display()))
}
