//! Conformance suite for generated SAMM JSON-LD contexts.
//!
//! Checks a context produced by `samm-context` (flattened or nested) against
//! the JSON-LD 1.1 rules the translator promises to uphold and collects the
//! outcome in a [`ConformanceReport`].
//!
//! # Conformance Scope
//!
//! | Check | Standard |
//! |-------|----------|
//! | `context/layout` | flattened header, or one aspect entry with a scoped `@context` |
//! | `context/header` | JSON-LD 1.1 `@version`, `id`/`type` keyword aliases |
//! | `context/prefixes` | aspect prefix bound to `urn:samm:<ns>:<ver>#`, declared prefixes only |
//! | `context/terms` | term definitions are IRIs or `@id` objects |
//! | `context/datatypes` | `@type` coercions are declared compact IRIs |
//! | `context/scoped` | scoped contexts follow the term rules |
//! | `context/extensions` | warns on keyword-like keys JSON-LD 1.1 does not define |
//!
//! # Entry Point
//!
//! ```no_run
//! use samm_context_conformance::validate_file;
//! use std::path::Path;
//!
//! let report = validate_file(Path::new("Pcf-context.jsonld")).expect("Failed to run conformance");
//! assert!(report.all_passed());
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

pub mod report;
pub mod validators;

pub use report::{ConformanceReport, Severity, TestResult};
pub use validators::context::{validate_file, validate_value};
