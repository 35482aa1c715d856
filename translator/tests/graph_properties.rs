//! Property-based tests for the schema graph walker and both context forms.
//!
//! Uses proptest to check termination and depth bounds on self-referential,
//! mutually recursive and chained schemas, agreement between the flattened and nested forms on
//! acyclic schemas, and byte-identical output across repeated translations.

use std::collections::{BTreeMap, BTreeSet};

use proptest::prelude::*;
use serde_json::{json, Map, Value};

use samm_context::{
    translate_flat, translate_nested, Expansion, SchemaDocument, SemanticIdentifier,
    TermDescriptor, TranslateOptions, Truncation,
};

const PCF_ID: &str = "urn:samm:io.catenax.pcf:7.0.0#Pcf";
const HEADER_KEYS: [&str; 5] = ["@version", "id", "type", "cx", "xsd"];

fn document(schema: &Value) -> SchemaDocument {
    SchemaDocument::from_value(schema).expect("object root")
}

/// `Node { value: string, child: Node }` reached from the aspect's `child`.
fn self_referential() -> Value {
    json!({
        "type": "object",
        "properties": {"child": {"$ref": "#/components/schemas/Node"}},
        "components": {"schemas": {"Node": {
            "type": "object",
            "properties": {
                "value": {"type": "string"},
                "child": {"$ref": "#/components/schemas/Node"}
            }
        }}}
    })
}

/// `A.b: B` and `B.a: A`, entered through the aspect's `a`.
fn mutually_recursive() -> Value {
    json!({
        "type": "object",
        "properties": {"a": {"$ref": "#/components/schemas/A"}},
        "components": {"schemas": {
            "A": {
                "type": "object",
                "properties": {
                    "value": {"type": "string"},
                    "b": {"$ref": "#/components/schemas/B"}
                }
            },
            "B": {
                "type": "object",
                "properties": {
                    "value": {"type": "integer"},
                    "a": {"$ref": "#/components/schemas/A"}
                }
            }
        }}
    })
}

/// `L0 → L1 → … → L{len-1}`, each a distinct definition.
fn chain(len: usize) -> Value {
    let mut schemas = Map::new();
    for level in 0..len {
        let mut properties = Map::new();
        properties.insert("value".into(), json!({"type": "integer"}));
        if level + 1 < len {
            properties.insert(
                "next".into(),
                json!({"$ref": format!("#/components/schemas/L{}", level + 1)}),
            );
        }
        schemas.insert(
            format!("L{level}"),
            json!({"type": "object", "properties": properties}),
        );
    }
    json!({
        "type": "object",
        "properties": {"next": {"$ref": "#/components/schemas/L0"}},
        "components": {"schemas": schemas}
    })
}

fn max_nesting(terms: &[TermDescriptor]) -> usize {
    terms.iter().map(TermDescriptor::depth).max().unwrap_or(0)
}

fn term_keys(ctx: &Map<String, Value>, skip: &[&str]) -> BTreeSet<String> {
    ctx.keys()
        .filter(|k| {
            !HEADER_KEYS.contains(&k.as_str()) && !skip.contains(&k.as_str())
        })
        .cloned()
        .collect()
}

// =============================================================================
// Cycle example
// =============================================================================

#[test]
fn cycle_yields_two_levels_of_child() {
    let doc = document(&self_referential());
    let context = translate_nested(PCF_ID, (&doc).into(), &TranslateOptions::default())
        .expect("terminates");

    let outer = &context.terms()[0];
    assert_eq!(outer.name, "child");
    assert_eq!(outer.expansion, Expansion::Expanded);
    let inner = outer
        .children()
        .and_then(|c| c.iter().find(|t| t.name == "child"))
        .expect("second level");
    assert_eq!(
        inner.expansion,
        Expansion::Truncated {
            reason: Truncation::Cycle
        }
    );
    assert!(inner.nested.is_none());

    assert_eq!(
        context.context()["Pcf"]["@context"]["child"],
        json!({
            "@id": "cx:child",
            "@context": {"value": "cx:value", "child": "cx:child"}
        })
    );
}

// =============================================================================
// Termination and depth bounds
// =============================================================================

proptest! {
    /// Self-referential schemas terminate and never nest past max_depth.
    #[test]
    fn prop_cycles_terminate(max_depth in 0usize..12) {
        let doc = document(&self_referential());
        let options = TranslateOptions::default().with_max_depth(max_depth);
        let context = translate_nested(PCF_ID, (&doc).into(), &options).expect("terminates");
        prop_assert!(max_nesting(context.terms()) <= max_depth);
        prop_assert!(
            max_nesting(context.terms()) <= 1,
            "cycle guard fires after one expansion"
        );
    }

    /// Mutual recursion closes after one pass through each type.
    #[test]
    fn prop_mutual_recursion_terminates(max_depth in 0usize..12) {
        let doc = document(&mutually_recursive());
        let options = TranslateOptions::default().with_max_depth(max_depth);
        let context = translate_nested(PCF_ID, (&doc).into(), &options).expect("terminates");
        prop_assert_eq!(max_nesting(context.terms()), max_depth.min(2));

        if max_depth >= 2 {
            let inner_a = context.terms()[0]
                .children()
                .and_then(|a| a.iter().find(|t| t.name == "b"))
                .and_then(TermDescriptor::children)
                .and_then(|b| b.iter().find(|t| t.name == "a"))
                .expect("a inside b");
            prop_assert_eq!(
                &inner_a.expansion,
                &Expansion::Truncated { reason: Truncation::Cycle }
            );
            prop_assert!(inner_a.nested.is_none());
        }
    }

    /// A chain of distinct definitions is expanded exactly up to the limit.
    #[test]
    fn prop_chain_depth_is_bounded(len in 1usize..10, max_depth in 0usize..12) {
        let doc = document(&chain(len));
        let options = TranslateOptions::default().with_max_depth(max_depth);
        let context = translate_nested(PCF_ID, (&doc).into(), &options).expect("terminates");
        prop_assert_eq!(max_nesting(context.terms()), len.min(max_depth));
    }
}

// =============================================================================
// Acyclic schemas: both forms agree
// =============================================================================

fn scalar_schema() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(json!({"type": "string"})),
        Just(json!({"type": "number"})),
        Just(json!({"type": "integer"})),
        Just(json!({"type": "boolean"})),
        Just(json!({"type": "string", "format": "date-time"})),
        Just(json!({"type": "string", "format": "date"})),
        Just(json!({"type": "string", "enum": ["a", "b"]})),
    ]
}

fn property_name() -> impl Strategy<Value = String> {
    "[a-z][a-zA-Z]{0,8}".prop_filter("header names are keyed by IRI", |name| {
        !HEADER_KEYS.contains(&name.as_str())
    })
}

fn property_schema() -> impl Strategy<Value = Value> {
    let leaf = scalar_schema();
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::btree_map(property_name(), inner.clone(), 1..4)
                .prop_map(|props: BTreeMap<String, Value>| json!({
                    "type": "object",
                    "properties": props
                })),
            inner.prop_map(|items| json!({"type": "array", "items": items})),
        ]
    })
}

fn aspect_schema() -> impl Strategy<Value = Value> {
    prop::collection::btree_map(property_name(), property_schema(), 1..6).prop_map(|props| {
        json!({
            "type": "object",
            "description": "generated aspect",
            "properties": props
        })
    })
}

proptest! {
    /// Flattened and nested contexts declare the same top-level terms.
    #[test]
    fn prop_forms_share_term_names(schema in aspect_schema()) {
        let doc = document(&schema);
        let options = TranslateOptions::default();
        let flat = translate_flat(PCF_ID, (&doc).into(), &options).expect("flat");
        let nested = translate_nested(PCF_ID, (&doc).into(), &options).expect("nested");

        let flat_terms = term_keys(flat.context(), &["Pcf", "@definition"]);
        let inner = nested.context()["Pcf"]["@context"]
            .as_object()
            .expect("scoped context");
        prop_assert_eq!(flat_terms, term_keys(inner, &[]));
        prop_assert_eq!(flat.terms(), nested.terms());
    }

    /// Repeated translations serialise to identical bytes.
    #[test]
    fn prop_translation_is_idempotent(schema in aspect_schema(), nested in any::<bool>()) {
        let doc = document(&schema);
        let options = TranslateOptions::default();
        let run = || {
            let context = if nested {
                translate_nested(PCF_ID, (&doc).into(), &options)
            } else {
                translate_flat(PCF_ID, (&doc).into(), &options)
            };
            serde_json::to_string(&context.expect("translates")).expect("serialises")
        };
        prop_assert_eq!(run(), run());
    }
}

// =============================================================================
// Identifiers
// =============================================================================

fn identifier_text() -> impl Strategy<Value = String> {
    (
        prop::collection::vec("[a-z][a-z0-9]{0,6}", 1..4),
        prop::collection::vec(0u32..100, 2..4),
        "[A-Z][A-Za-z0-9]{0,12}",
    )
        .prop_map(|(namespace, version, aspect)| {
            let version: Vec<String> = version.iter().map(u32::to_string).collect();
            format!(
                "urn:samm:{}:{}#{aspect}",
                namespace.join("."),
                version.join(".")
            )
        })
}

proptest! {
    /// parse(display(parse(s))) == parse(s)
    #[test]
    fn prop_identifier_display_round_trips(text in identifier_text()) {
        let parsed = SemanticIdentifier::parse(&text).expect("well-formed");
        prop_assert_eq!(parsed.to_string(), text.clone());
        prop_assert_eq!(
            SemanticIdentifier::parse(&parsed.to_string()).expect("reparses"),
            parsed
        );
    }
}
