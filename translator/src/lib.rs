//! SAMM aspect schemas translated into JSON-LD contexts.
//!
//! The `samm-context` crate reads the JSON Schema generated for a SAMM aspect
//! model and produces a JSON-LD 1.1 `@context` for it, either flattened (one
//! level of terms) or nested (scoped contexts per object property). Schema
//! references are followed with a path-sensitive cycle guard and a
//! configurable depth limit.
//!
//! # Entry Point
//!
//! ```
//! use samm_context::{translate_flat, SchemaDocument, TranslateOptions};
//!
//! let schema = serde_json::json!({
//!     "type": "object",
//!     "properties": {"productId": {"type": "string"}}
//! });
//! let document = SchemaDocument::from_value(&schema).expect("object schema");
//! let context = translate_flat(
//!     "urn:samm:io.catenax.pcf:7.0.0#Pcf",
//!     (&document).into(),
//!     &TranslateOptions::default(),
//! )
//! .expect("translates");
//! assert_eq!(context.context()["productId"], "cx:productId");
//! ```
//!
//! # Resolution
//!
//! Schemas can also come from a [`SchemaResolver`]: [`FileSystemResolver`]
//! reads a local checkout of a models repository, [`StaticResolver`] serves
//! pre-loaded documents, and [`CachingResolver`] memoises either.

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

pub mod builder;
pub mod datatype;
pub mod error;
pub mod identifier;
pub mod resolver;
pub mod schema;
pub mod translate;
pub mod walker;

pub use builder::TypeCoercion;
pub use datatype::{Datatype, ScalarType};
pub use error::{IdentifierError, ResolutionError, SchemaError, TranslationError};
pub use identifier::SemanticIdentifier;
pub use resolver::{
    schema_location, CachingResolver, FileSystemResolver, SchemaResolver, StaticResolver,
    DEFAULT_REPOSITORY,
};
pub use schema::{NodeId, SchemaDocument, SchemaKind, SchemaNode};
pub use translate::{
    translate_flat, translate_nested, ContextDocument, ContextForm, Demotion, SchemaSource,
    TranslateOptions,
};
pub use walker::{
    ErrorPolicy, Expansion, SchemaGraphWalker, TermDescriptor, TranslationState, Truncation,
};
