//! Translation entry points.
//!
//! [`translate_flat`] and [`translate_nested`] run the full pipeline:
//! identifier parsing → schema resolution (when needed) → graph walk →
//! context building. Every call owns its [`TranslationState`]; the schema
//! document is only borrowed, so one resolved document can serve many
//! concurrent translations.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::builder::{flat, nested, AspectContext, TypeCoercion};
use crate::error::TranslationError;
use crate::identifier::SemanticIdentifier;
use crate::resolver::SchemaResolver;
use crate::schema::SchemaDocument;
use crate::walker::{
    ErrorPolicy, Expansion, SchemaGraphWalker, TermDescriptor, TranslationState,
    DEFAULT_MAX_DEPTH, DEFAULT_PREFIX,
};

/// Caller-settable translation parameters.
///
/// Deserialises from a config file with every field optional:
///
/// ```
/// let options: samm_context::TranslateOptions =
///     toml::from_str("prefix = \"pcf\"\nmax-depth = 3").expect("valid options");
/// assert_eq!(options.prefix, "pcf");
/// assert_eq!(options.max_depth, 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct TranslateOptions {
    /// Prefix bound to the aspect's base IRI (default `cx`).
    pub prefix: String,
    /// Maximum nesting of object terms (default 2).
    pub max_depth: usize,
    /// Strict or best-effort handling of branch failures.
    pub policy: ErrorPolicy,
    /// When scalar terms carry `@type`.
    pub coercion: TypeCoercion,
}

impl Default for TranslateOptions {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_owned(),
            max_depth: DEFAULT_MAX_DEPTH,
            policy: ErrorPolicy::default(),
            coercion: TypeCoercion::default(),
        }
    }
}

impl TranslateOptions {
    /// Returns these options with a different prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Returns these options with a different nesting limit.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Returns these options with a different error policy.
    #[must_use]
    pub fn with_policy(mut self, policy: ErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Checks that the prefix can be bound in a JSON-LD context.
    ///
    /// # Errors
    ///
    /// Returns [`TranslationError::InvalidOptions`] for an empty prefix, a
    /// keyword-like prefix, or one containing `:`, `#`, `/` or whitespace.
    pub fn validate(&self) -> Result<(), TranslationError> {
        let prefix = &self.prefix;
        let reason = if prefix.is_empty() {
            Some("prefix must not be empty".to_owned())
        } else if prefix.starts_with('@') {
            Some(format!("prefix `{prefix}` looks like a JSON-LD keyword"))
        } else if prefix
            .chars()
            .any(|c| c == ':' || c == '#' || c == '/' || c.is_whitespace())
        {
            Some(format!(
                "prefix `{prefix}` must not contain `:`, `#`, `/` or whitespace"
            ))
        } else {
            None
        };
        match reason {
            Some(reason) => Err(TranslationError::InvalidOptions { reason }),
            None => Ok(()),
        }
    }
}

/// Where the schema for a translation comes from.
#[derive(Clone, Copy)]
pub enum SchemaSource<'a> {
    /// An already-resolved document.
    Document(&'a SchemaDocument),
    /// Resolve through `resolver`, optionally against a specific repository.
    Resolver {
        /// Resolver to ask.
        resolver: &'a dyn SchemaResolver,
        /// Repository root or URL passed through to the resolver.
        repository: Option<&'a str>,
    },
}

impl<'a> From<&'a SchemaDocument> for SchemaSource<'a> {
    fn from(document: &'a SchemaDocument) -> Self {
        SchemaSource::Document(document)
    }
}

/// Shape of a [`ContextDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextForm {
    /// One level of terms; objects linked by IRI.
    Flattened,
    /// Objects carry scoped `@context`s, keyed by aspect name at the top.
    Nested,
}

/// A term replaced by a link under [`ErrorPolicy::BestEffort`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Demotion {
    /// Dotted term path from the aspect root.
    pub path: String,
    /// The error that was suppressed.
    pub reason: String,
}

/// A generated JSON-LD context.
///
/// Serialises as the bare context map, ready to be used as the value of an
/// `@context` key; [`to_json_ld`](Self::to_json_ld) wraps it.
#[derive(Debug, Clone)]
pub struct ContextDocument {
    form: ContextForm,
    identifier: SemanticIdentifier,
    context: Map<String, Value>,
    terms: Vec<TermDescriptor>,
}

impl ContextDocument {
    /// Flattened or nested.
    #[must_use]
    pub fn form(&self) -> ContextForm {
        self.form
    }

    /// The translated aspect.
    #[must_use]
    pub fn identifier(&self) -> &SemanticIdentifier {
        &self.identifier
    }

    /// The context map.
    #[must_use]
    pub fn context(&self) -> &Map<String, Value> {
        &self.context
    }

    /// Consumes the document, returning the context map.
    #[must_use]
    pub fn into_context(self) -> Map<String, Value> {
        self.context
    }

    /// Descriptors the context was built from.
    #[must_use]
    pub fn terms(&self) -> &[TermDescriptor] {
        &self.terms
    }

    /// `{"@context": <context>}`.
    #[must_use]
    pub fn to_json_ld(&self) -> Value {
        json!({ "@context": self.context })
    }

    /// Every best-effort demotion, in document order.
    #[must_use]
    pub fn demotions(&self) -> Vec<Demotion> {
        let mut found = Vec::new();
        collect_demotions(&self.terms, None, &mut found);
        found
    }

    /// True when no term was demoted. Cycle/depth truncation does not count.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.demotions().is_empty()
    }
}

impl Serialize for ContextDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.context.serialize(serializer)
    }
}

fn collect_demotions(
    terms: &[TermDescriptor],
    parent: Option<&str>,
    found: &mut Vec<Demotion>,
) {
    for term in terms {
        let path = match parent {
            Some(parent) => format!("{parent}.{}", term.name),
            None => term.name.clone(),
        };
        if let Expansion::Demoted { reason } = &term.expansion {
            found.push(Demotion {
                path: path.clone(),
                reason: reason.clone(),
            });
        }
        if let Some(children) = &term.nested {
            collect_demotions(children, Some(&path), found);
        }
    }
}

/// Translates an aspect schema into a flattened JSON-LD context.
///
/// # Errors
///
/// Returns [`TranslationError`] for a malformed identifier, invalid options,
/// a resolution failure, or (under [`ErrorPolicy::Strict`]) any schema
/// failure on the way to the output.
pub fn translate_flat(
    semantic_id: &str,
    source: SchemaSource<'_>,
    options: &TranslateOptions,
) -> Result<ContextDocument, TranslationError> {
    translate(semantic_id, source, options, ContextForm::Flattened)
}

/// Translates an aspect schema into a nested JSON-LD context.
///
/// # Errors
///
/// Same as [`translate_flat`].
pub fn translate_nested(
    semantic_id: &str,
    source: SchemaSource<'_>,
    options: &TranslateOptions,
) -> Result<ContextDocument, TranslationError> {
    translate(semantic_id, source, options, ContextForm::Nested)
}

fn translate(
    semantic_id: &str,
    source: SchemaSource<'_>,
    options: &TranslateOptions,
    form: ContextForm,
) -> Result<ContextDocument, TranslationError> {
    options.validate()?;
    let identifier = SemanticIdentifier::parse(semantic_id)?;

    let resolved;
    let document = match source {
        SchemaSource::Document(document) => document,
        SchemaSource::Resolver {
            resolver,
            repository,
        } => {
            resolved = resolver.resolve(&identifier, repository)?;
            resolved.as_ref()
        }
    };

    let mut state =
        TranslationState::new(options.prefix.as_str(), options.max_depth, options.policy);
    let terms = SchemaGraphWalker::new(document).walk(&mut state)?;

    let aspect = AspectContext {
        identifier: &identifier,
        prefix: &options.prefix,
        coercion: options.coercion,
        description: document.description(),
        samm_urn: document.samm_urn(),
    };
    let context = match form {
        ContextForm::Flattened => flat::build(&aspect, &terms),
        ContextForm::Nested => nested::build(&aspect, &terms),
    };
    debug!(%identifier, ?form, entries = context.len(), "context generated");

    Ok(ContextDocument {
        form,
        identifier,
        context,
        terms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options() {
        let options = TranslateOptions::default();
        assert_eq!(options.prefix, "cx");
        assert_eq!(options.max_depth, 2);
        assert_eq!(options.policy, ErrorPolicy::Strict);
        assert_eq!(options.coercion, TypeCoercion::Implicit);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn rejects_unbindable_prefixes() {
        for prefix in ["", "a:b", "has space", "@vocab", "x#", "a/b"] {
            let options = TranslateOptions::default().with_prefix(prefix);
            assert!(
                matches!(
                    options.validate(),
                    Err(TranslationError::InvalidOptions { .. })
                ),
                "prefix `{prefix}` should be rejected"
            );
        }
    }

    #[test]
    fn options_from_toml() {
        let options: TranslateOptions = toml::from_str(
            "prefix = \"pcf\"\nmax-depth = 4\npolicy = \"best-effort\"\ncoercion = \"always\"",
        )
        .expect("valid options");
        assert_eq!(
            options,
            TranslateOptions {
                prefix: "pcf".into(),
                max_depth: 4,
                policy: ErrorPolicy::BestEffort,
                coercion: TypeCoercion::Always,
            }
        );

        let err = toml::from_str::<TranslateOptions>("depth = 3");
        assert!(err.is_err(), "unknown keys are rejected");
    }
}
