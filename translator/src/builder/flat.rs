//! Flattened context builder.
//!
//! Produces a single-level `@context`. Expanded object properties appear as
//! `{"@id": ...}` links; their own terms are deliberately *not* hoisted into
//! the parent map, where they could silently collide with same-named terms
//! from other levels. Consumers that need the inner terms ask for the nested
//! form instead.

use serde_json::{json, Map, Value};

use super::{
    append_metadata, header, insert_term, is_coerced, leaf_value, term_key, AspectContext,
};
use crate::datatype::iris;
use crate::walker::TermDescriptor;

/// Builds the flattened context map for `terms`.
#[must_use]
pub fn build(aspect: &AspectContext<'_>, terms: &[TermDescriptor]) -> Map<String, Value> {
    let bind_xsd = terms.iter().any(|t| is_coerced(t, aspect.coercion));
    let mut ctx = header(aspect, bind_xsd);

    let aspect_name = aspect.identifier.aspect_name();
    let reserved = ["id", "type", aspect.prefix, iris::XSD_PREFIX, aspect_name];
    ctx.insert(aspect_name.to_owned(), json!({ "@id": aspect.aspect_iri() }));

    for term in terms {
        let value = match term.children() {
            Some(_) => link_value(term),
            None => leaf_value(term, aspect.coercion),
        };
        insert_term(&mut ctx, term_key(term, &reserved), value);
    }

    append_metadata(&mut ctx, aspect.samm_urn, aspect.description);
    ctx
}

fn link_value(term: &TermDescriptor) -> Value {
    let mut link = Map::new();
    link.insert("@id".to_owned(), json!(term.iri));
    if let Some(datatype) = term.datatype {
        link.insert("@type".to_owned(), json!(datatype.compact_iri()));
    }
    Value::Object(link)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::builder::TypeCoercion;
    use crate::identifier::SemanticIdentifier;
    use crate::schema::SchemaDocument;
    use crate::walker::{SchemaGraphWalker, TranslationState};

    fn build_for(schema: Value, prefix: &str) -> Map<String, Value> {
        let id = SemanticIdentifier::parse("urn:samm:io.catenax.pcf:7.0.0#Pcf").expect("valid id");
        let doc = SchemaDocument::from_value(&schema).expect("object root");
        let mut state = TranslationState::new(prefix, 2, Default::default());
        let terms = SchemaGraphWalker::new(&doc).walk(&mut state).expect("walk");
        let aspect = AspectContext {
            identifier: &id,
            prefix,
            coercion: TypeCoercion::Implicit,
            description: doc.description(),
            samm_urn: doc.samm_urn(),
        };
        build(&aspect, &terms)
    }

    #[test]
    fn header_comes_first_and_definition_last() {
        let ctx = build_for(
            json!({
                "description": "Product carbon footprint",
                "properties": {"productId": {"type": "string"}}
            }),
            "pcf",
        );
        let keys: Vec<&str> = ctx.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            ["@version", "id", "type", "pcf", "Pcf", "productId", "@definition"]
        );
        assert_eq!(ctx["pcf"], json!("urn:samm:io.catenax.pcf:7.0.0#"));
        assert_eq!(ctx["Pcf"], json!({"@id": "pcf:Pcf"}));
        assert_eq!(ctx["@definition"], json!("Product carbon footprint"));
    }

    #[test]
    fn objects_are_links_without_inlined_terms() {
        let ctx = build_for(
            json!({"properties": {"pcfValue": {
                "type": "object",
                "properties": {"value": {"type": "number"}, "unit": {"type": "string"}}
            }}}),
            "pcf",
        );
        assert_eq!(ctx["pcfValue"], json!({"@id": "pcf:pcfValue"}));
        assert!(!ctx.contains_key("value"));
        assert!(!ctx.contains_key("unit"));
    }

    #[test]
    fn colliding_names_are_prefixed() {
        let ctx = build_for(
            json!({"properties": {
                "id": {"type": "string"},
                "type": {"type": "string"},
                "normalProp": {"type": "string"}
            }}),
            "cx",
        );
        assert_eq!(ctx["id"], json!("@id"));
        assert_eq!(ctx["type"], json!("@type"));
        assert_eq!(ctx["cx:id"], json!("cx:id"));
        assert_eq!(ctx["cx:type"], json!("cx:type"));
        assert_eq!(ctx["normalProp"], json!("cx:normalProp"));
    }

    #[test]
    fn binds_xsd_only_when_coercing() {
        let plain = build_for(json!({"properties": {"n": {"type": "number"}}}), "cx");
        assert!(!plain.contains_key("xsd"));

        let dated = build_for(
            json!({"properties": {"at": {"type": "string", "format": "date-time"}}}),
            "cx",
        );
        assert_eq!(dated["xsd"], json!("http://www.w3.org/2001/XMLSchema#"));
        assert_eq!(dated["at"], json!({"@id": "cx:at", "@type": "xsd:dateTime"}));
    }

    #[test]
    fn samm_urn_is_echoed() {
        let ctx = build_for(
            json!({
                "x-samm-aspect-model-urn": "urn:samm:io.catenax.pcf:7.0.0#Pcf",
                "properties": {"productId": {"type": "string"}}
            }),
            "cx",
        );
        assert_eq!(ctx["@samm-urn"], json!("urn:samm:io.catenax.pcf:7.0.0#Pcf"));
    }
}
