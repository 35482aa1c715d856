//! Nested context builder.
//!
//! Produces a single entry keyed by the aspect name whose value holds the
//! aspect's own `@context`. Every expanded object property is rendered as a
//! term with a scoped `@context` of its children, recursively, so
//! hierarchical consumers get the whole tree in one document. A scoped
//! context ends with the object's `@samm-urn` and `@definition`, when the
//! schema has them. Scalars and truncated links render exactly as in the
//! flattened form.

use serde_json::{json, Map, Value};

use super::{
    append_metadata, header, insert_term, is_coerced, leaf_value, term_key, AspectContext,
    TypeCoercion,
};
use crate::datatype::iris;
use crate::walker::TermDescriptor;

/// Builds the nested context map for `terms`.
#[must_use]
pub fn build(aspect: &AspectContext<'_>, terms: &[TermDescriptor]) -> Map<String, Value> {
    let reserved = ["id", "type", aspect.prefix, iris::XSD_PREFIX];
    let mut ctx = header(aspect, any_coerced(terms, aspect.coercion));
    render_terms(&mut ctx, terms, &reserved, aspect.coercion);

    let mut entry = Map::new();
    entry.insert("@id".to_owned(), json!(aspect.aspect_iri()));
    entry.insert("@context".to_owned(), Value::Object(ctx));
    append_metadata(&mut entry, aspect.samm_urn, aspect.description);

    let mut root = Map::new();
    root.insert(
        aspect.identifier.aspect_name().to_owned(),
        Value::Object(entry),
    );
    root
}

fn render_terms(
    ctx: &mut Map<String, Value>,
    terms: &[TermDescriptor],
    reserved: &[&str],
    coercion: TypeCoercion,
) {
    for term in terms {
        let value = match term.children() {
            Some(children) => {
                let mut scoped = Map::new();
                render_terms(&mut scoped, children, reserved, coercion);
                append_metadata(
                    &mut scoped,
                    term.samm_urn.as_deref(),
                    term.description.as_deref(),
                );
                json!({
                    "@id": term.iri,
                    "@context": scoped
                })
            }
            None => leaf_value(term, coercion),
        };
        insert_term(ctx, term_key(term, reserved), value);
    }
}

/// The `xsd` prefix is bound once at the top and inherited by scoped contexts.
fn any_coerced(terms: &[TermDescriptor], coercion: TypeCoercion) -> bool {
    terms.iter().any(|term| {
        is_coerced(term, coercion)
            || term
                .children()
                .is_some_and(|children| any_coerced(children, coercion))
    })
}
