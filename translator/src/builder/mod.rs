//! Context builders: term descriptors → JSON-LD `@context` maps.
//!
//! Two output shapes are supported:
//! - **flattened** ([`flat`]): one level of terms, object properties linked by IRI only
//! - **nested** ([`nested`]): object properties carry their own scoped `@context`
//!
//! Both share the fixed context header and the rendering of leaf terms, which
//! live in this module.

pub mod flat;
pub mod nested;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::datatype::iris;
use crate::identifier::SemanticIdentifier;
use crate::walker::TermDescriptor;

/// JSON-LD processing mode declared in every generated context.
pub const JSON_LD_VERSION: f64 = 1.1;

/// Key under which the aspect description is emitted.
pub const DEFINITION_KEY: &str = "@definition";

/// Key under which the root `x-samm-aspect-model-urn` is echoed.
pub const SAMM_URN_KEY: &str = "@samm-urn";

/// When scalar terms get an explicit `@type`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TypeCoercion {
    /// Only datatypes JSON cannot express natively (`xsd:dateTime`, `xsd:date`).
    #[default]
    Implicit,
    /// Every scalar term with a datatype.
    Always,
}

/// Aspect-level inputs shared by both builders.
#[derive(Debug, Clone, Copy)]
pub struct AspectContext<'a> {
    /// Identifier of the aspect being translated.
    pub identifier: &'a SemanticIdentifier,
    /// Prefix bound to the aspect's base IRI.
    pub prefix: &'a str,
    /// `@type` policy for scalar terms.
    pub coercion: TypeCoercion,
    /// Root schema `description`.
    pub description: Option<&'a str>,
    /// Root schema `x-samm-aspect-model-urn`.
    pub samm_urn: Option<&'a str>,
}

impl AspectContext<'_> {
    /// Compact IRI of the aspect itself, e.g. `cx:Pcf`.
    #[must_use]
    pub fn aspect_iri(&self) -> String {
        format!("{}:{}", self.prefix, self.identifier.aspect_name())
    }
}

/// `@version`, the `id`/`type` aliases, and the prefix bindings.
fn header(aspect: &AspectContext<'_>, bind_xsd: bool) -> Map<String, Value> {
    let mut ctx = Map::new();
    ctx.insert("@version".to_owned(), json!(JSON_LD_VERSION));
    ctx.insert("id".to_owned(), json!("@id"));
    ctx.insert("type".to_owned(), json!("@type"));
    ctx.insert(aspect.prefix.to_owned(), json!(aspect.identifier.base_iri()));
    if bind_xsd {
        ctx.insert(iris::XSD_PREFIX.to_owned(), json!(iris::XSD));
    }
    ctx
}

/// Whether `term` would be rendered with an `@type`.
fn is_coerced(term: &TermDescriptor, coercion: TypeCoercion) -> bool {
    match term.datatype {
        Some(datatype) => coercion == TypeCoercion::Always || !datatype.is_json_native(),
        None => false,
    }
}

/// Bare IRI, or `{"@id", "@type"}` for coerced scalars.
fn leaf_value(term: &TermDescriptor, coercion: TypeCoercion) -> Value {
    match term.datatype {
        Some(datatype) if is_coerced(term, coercion) => json!({
            "@id": term.iri,
            "@type": datatype.compact_iri()
        }),
        _ => json!(term.iri),
    }
}

/// Key for `term` in a context that already defines `reserved`.
///
/// A property called `id` or `type` (or named like a bound prefix) would
/// overwrite the header entry of the same name, so it is keyed by its compact
/// IRI instead, e.g. `cx:id`.
fn term_key(term: &TermDescriptor, reserved: &[&str]) -> String {
    if reserved.contains(&term.name.as_str()) {
        term.iri.clone()
    } else {
        term.name.clone()
    }
}

/// Inserts a term unless its key is already taken; the first term wins.
///
/// The walker rejects colliding names, so a taken key only occurs for a
/// best-effort demotion, which stays listed among the demotions.
fn insert_term(ctx: &mut Map<String, Value>, key: String, value: Value) {
    ctx.entry(key).or_insert(value);
}

/// Appends `@samm-urn` and `@definition` when present.
fn append_metadata(
    ctx: &mut Map<String, Value>,
    samm_urn: Option<&str>,
    description: Option<&str>,
) {
    if let Some(urn) = samm_urn {
        ctx.insert(SAMM_URN_KEY.to_owned(), json!(urn));
    }
    if let Some(description) = description {
        ctx.insert(DEFINITION_KEY.to_owned(), json!(description));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatype::Datatype;
    use crate::walker::Expansion;

    fn scalar(name: &str, datatype: Datatype) -> TermDescriptor {
        TermDescriptor {
            name: name.to_owned(),
            iri: format!("cx:{name}"),
            datatype: Some(datatype),
            array: false,
            nested: None,
            description: None,
            samm_urn: None,
            expansion: Expansion::Expanded,
        }
    }

    #[test]
    fn native_scalars_stay_bare() {
        let term = scalar("amount", Datatype::Float);
        assert_eq!(leaf_value(&term, TypeCoercion::Implicit), json!("cx:amount"));
        assert_eq!(
            leaf_value(&term, TypeCoercion::Always),
            json!({"@id": "cx:amount", "@type": "xsd:float"})
        );
    }

    #[test]
    fn dates_are_always_coerced() {
        let term = scalar("created", Datatype::DateTime);
        assert_eq!(
            leaf_value(&term, TypeCoercion::Implicit),
            json!({"@id": "cx:created", "@type": "xsd:dateTime"})
        );
    }

    #[test]
    fn reserved_names_use_compact_iri_keys() {
        let term = scalar("id", Datatype::String);
        assert_eq!(term_key(&term, &["id", "type", "cx"]), "cx:id");
        let term = scalar("identifier", Datatype::String);
        assert_eq!(term_key(&term, &["id", "type", "cx"]), "identifier");
    }

    #[test]
    fn first_term_keeps_its_key() {
        let mut ctx = Map::new();
        insert_term(&mut ctx, "name".into(), json!({"@id": "cx:name", "@type": "xsd:date"}));
        insert_term(&mut ctx, "name".into(), json!("cx:name"));
        assert_eq!(ctx["name"], json!({"@id": "cx:name", "@type": "xsd:date"}));
    }
}
