//! Contexts produced by the translator pass every conformance check.

use samm_context::{
    translate_flat, translate_nested, SchemaDocument, TranslateOptions, TypeCoercion,
};
use samm_context_conformance::{validate_file, validate_value, ConformanceReport};

const PCF_ID: &str = "urn:samm:io.catenax.pcf:7.0.0#Pcf";
const PCF_SCHEMA: &str = include_str!("../../translator/tests/fixtures/Pcf-schema.json");

fn pcf_document() -> SchemaDocument {
    SchemaDocument::from_json(PCF_SCHEMA, "Pcf-schema.json").expect("fixture parses")
}

fn assert_conformant(report: &ConformanceReport) {
    let failures: Vec<_> = report.failures().collect();
    assert!(failures.is_empty(), "conformance failures: {failures:#?}");
}

#[test]
fn flattened_pcf_context_conforms() {
    let doc = pcf_document();
    let context = translate_flat(PCF_ID, (&doc).into(), &TranslateOptions::default())
        .expect("translates");
    let report = validate_value(&context.to_json_ld()).expect("validator runs");
    assert_conformant(&report);
}

#[test]
fn nested_pcf_context_conforms() {
    let doc = pcf_document();
    let options = TranslateOptions {
        coercion: TypeCoercion::Always,
        ..TranslateOptions::default().with_prefix("pcf").with_max_depth(4)
    };
    let context = translate_nested(PCF_ID, (&doc).into(), &options).expect("translates");
    let report = validate_value(&context.to_json_ld()).expect("validator runs");
    assert_conformant(&report);
    assert!(report
        .results
        .iter()
        .any(|r| r.validator == "context/scoped"));
}

#[test]
fn validates_written_files() {
    let doc = pcf_document();
    let context = translate_flat(PCF_ID, (&doc).into(), &TranslateOptions::default())
        .expect("translates");
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("Pcf-context.jsonld");
    std::fs::write(
        &path,
        serde_json::to_string_pretty(&context.to_json_ld()).expect("serialises"),
    )
    .expect("write");

    assert_conformant(&validate_file(&path).expect("validator runs"));
    assert!(validate_file(&dir.path().join("missing.jsonld")).is_err());
}
