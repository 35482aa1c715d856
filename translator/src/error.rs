//! Error types for identifier parsing, schema resolution and translation.
//!
//! Every failure is a typed value so callers can branch on kind. The
//! translation-level [`TranslationError`] wraps the lower layers through
//! `#[from]` conversions, which keeps `?` usable across module boundaries.

use std::path::PathBuf;

use thiserror::Error;

/// A semantic identifier did not match `urn:samm:<namespace>:<version>#<AspectName>`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed semantic identifier `{input}`: {reason}")]
pub struct IdentifierError {
    /// The raw input that failed to parse.
    pub input: String,
    /// Which part of the grammar was violated.
    pub reason: String,
}

impl IdentifierError {
    pub(crate) fn new(input: &str, reason: impl Into<String>) -> Self {
        Self {
            input: input.to_owned(),
            reason: reason.into(),
        }
    }
}

/// The parsed JSON value cannot serve as a schema document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// The document root is not a JSON object.
    #[error("schema document root must be a JSON object, found {found}")]
    NotAnObject {
        /// JSON kind of the root value (`array`, `string`, ...).
        found: &'static str,
    },
}

/// A [`SchemaResolver`](crate::resolver::SchemaResolver) could not produce a document.
#[derive(Debug, Error)]
pub enum ResolutionError {
    /// No schema is known for the identifier at the given location.
    #[error("no schema found for `{identifier}` at {location}")]
    NotFound {
        /// Canonical form of the requested identifier.
        identifier: String,
        /// Where the resolver looked.
        location: String,
    },
    /// Reading the schema file failed.
    #[error("failed to read schema {}", path.display())]
    Io {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The schema source was not valid JSON.
    #[error("schema at {location} is not valid JSON")]
    Json {
        /// File or URL of the schema.
        location: String,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },
    /// The JSON was valid but not a schema document.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Any failure of [`translate_flat`](crate::translate_flat) or
/// [`translate_nested`](crate::translate_nested).
#[derive(Debug, Error)]
pub enum TranslationError {
    /// The semantic identifier is not a SAMM URN.
    #[error(transparent)]
    MalformedIdentifier(#[from] IdentifierError),

    /// The resolver could not provide the schema.
    #[error("schema resolution failed: {0}")]
    Resolution(#[from] ResolutionError),

    /// A node required for the output is structurally invalid.
    #[error("malformed schema at `{path}`: {reason}")]
    MalformedSchema {
        /// Dotted property path from the aspect root (`<root>` for the root itself).
        path: String,
        /// What is wrong with the node.
        reason: String,
    },

    /// A `$ref` names a definition that does not exist.
    #[error("unresolved reference `{reference}` at `{path}`")]
    UnresolvedReference {
        /// Dotted property path from the aspect root.
        path: String,
        /// The `$ref` value as written in the schema.
        reference: String,
    },

    /// A scalar node has a type with no linked-data datatype mapping.
    #[error("unsupported datatype `{datatype}` at `{path}`")]
    UnsupportedDatatype {
        /// Dotted property path from the aspect root.
        path: String,
        /// The schema type as written (or a placeholder for untyped nodes).
        datatype: String,
    },

    /// The caller supplied options that cannot produce a valid context.
    #[error("invalid translation options: {reason}")]
    InvalidOptions {
        /// Which option is invalid and why.
        reason: String,
    },
}

impl TranslationError {
    /// Returns true for failures that stay local to one schema branch.
    ///
    /// These are the errors that [`ErrorPolicy::BestEffort`](crate::ErrorPolicy)
    /// demotes to a link-only term instead of propagating.
    #[must_use]
    pub fn is_branch_local(&self) -> bool {
        matches!(
            self,
            TranslationError::MalformedSchema { .. }
                | TranslationError::UnresolvedReference { .. }
                | TranslationError::UnsupportedDatatype { .. }
        )
    }
}
