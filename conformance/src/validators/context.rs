//! JSON-LD 1.1 context validator.
//!
//! Verifies that a generated aspect context is well formed, in either layout:
//! - Header: `@version` 1.1, `id`/`type` aliased to `@id`/`@type`, and a SAMM
//!   aspect prefix bound to a `urn:samm:...#` IRI
//! - Every term value is a compact IRI string or an object with `@id`
//! - Every compact IRI uses a declared prefix, `@type` included
//! - Scoped `@context`s (nested layout) obey the same term rules
//! - Keyword-like keys outside the JSON-LD 1.1 keyword set (`@definition`,
//!   `@samm-urn`) are reported as warnings: processors ignore them

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result};
use regex::Regex;
use serde_json::{Map, Value};

use crate::report::{ConformanceReport, TestResult};

const COMPACT_IRI: &str = r"^([A-Za-z_][A-Za-z0-9_.\-]*):(\S+)$";
const PREFIX_IRI: &str = r"^(?:urn:|https?://)\S*[#/]$";

/// JSON-LD 1.1 keywords.
const KEYWORDS: &[&str] = &[
    "@base",
    "@container",
    "@context",
    "@direction",
    "@graph",
    "@id",
    "@import",
    "@included",
    "@index",
    "@json",
    "@language",
    "@list",
    "@nest",
    "@none",
    "@prefix",
    "@propagate",
    "@protected",
    "@reverse",
    "@set",
    "@type",
    "@value",
    "@version",
    "@vocab",
];

/// Validates the context stored in a JSON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not JSON.
pub fn validate_file(path: &Path) -> Result<ConformanceReport> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let value: Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {} as JSON", path.display()))?;
    validate_value(&value)
}

/// Validates a context value: either the bare context map or a document
/// wrapping it under `@context`.
///
/// # Errors
///
/// Returns an error only if the built-in IRI patterns fail to compile.
pub fn validate_value(value: &Value) -> Result<ConformanceReport> {
    let rules = Rules {
        compact: Regex::new(COMPACT_IRI)?,
        prefix: Regex::new(PREFIX_IRI)?,
    };
    let mut report = ConformanceReport::new();

    let context = value.get("@context").unwrap_or(value);
    let Some(context) = context.as_object() else {
        report.push(TestResult::fail(
            "context/layout",
            "@context is not a JSON object",
        ));
        return Ok(report);
    };

    let mut aspect_entry = None;
    let header = match layout(context) {
        Some(Layout::Flattened) => {
            report.push(TestResult::pass("context/layout", "flattened context"));
            context
        }
        Some(Layout::Nested { aspect, entry, scoped }) => {
            report.push(TestResult::pass(
                "context/layout",
                format!("nested context for aspect `{aspect}`"),
            ));
            if entry.get("@id").and_then(Value::as_str).is_none() {
                report.push(TestResult::fail(
                    "context/layout",
                    format!("aspect entry `{aspect}` has no @id"),
                ));
            }
            aspect_entry = Some((aspect, entry));
            scoped
        }
        None => {
            report.push(TestResult::fail(
                "context/layout",
                "context has neither a @version header nor a single aspect entry with a scoped @context",
            ));
            return Ok(report);
        }
    };

    check_header(header, &rules, &mut report);

    let mut prefixes = declared_prefixes(header, &rules);
    let mut findings = Findings::default();
    check_terms(header, "", &rules, &mut prefixes, &mut findings);
    if let Some((aspect, entry)) = aspect_entry {
        check_iri(entry.get("@id"), aspect, &rules, &prefixes, &mut findings);
        findings.note_extensions(entry, aspect);
    }
    findings.report(&mut report);

    Ok(report)
}

struct Rules {
    compact: Regex,
    prefix: Regex,
}

enum Layout<'a> {
    Flattened,
    Nested {
        aspect: &'a str,
        entry: &'a Map<String, Value>,
        scoped: &'a Map<String, Value>,
    },
}

fn layout(context: &Map<String, Value>) -> Option<Layout<'_>> {
    if context.contains_key("@version") {
        return Some(Layout::Flattened);
    }
    let mut entries = context.iter();
    let (aspect, entry) = entries.next()?;
    if entries.next().is_some() {
        return None;
    }
    let entry = entry.as_object()?;
    let scoped = entry.get("@context")?.as_object()?;
    Some(Layout::Nested {
        aspect,
        entry,
        scoped,
    })
}

/// Verifies `@version`, the keyword aliases, and the aspect prefix binding.
fn check_header(
    header: &Map<String, Value>,
    rules: &Rules,
    report: &mut ConformanceReport,
) {
    match header.get("@version") {
        Some(version) if version.as_f64().is_some_and(|v| (v - 1.1).abs() < f64::EPSILON) => {
            report.push(TestResult::pass(
                "context/header",
                "JSON-LD @version is 1.1",
            ));
        }
        Some(version) => report.push(TestResult::fail(
            "context/header",
            format!("JSON-LD @version should be 1.1, got: {version}"),
        )),
        None => report.push(TestResult::fail(
            "context/header",
            "context has no @version",
        )),
    }

    let mut bad_aliases = Vec::new();
    for (alias, keyword) in [("id", "@id"), ("type", "@type")] {
        if header.get(alias).and_then(Value::as_str) != Some(keyword) {
            bad_aliases.push(format!("`{alias}` should map to `{keyword}`"));
        }
    }
    if bad_aliases.is_empty() {
        report.push(TestResult::pass(
            "context/header",
            "id/type alias @id/@type",
        ));
    } else {
        report.push(TestResult::fail_with_details(
            "context/header",
            "Keyword aliases missing or wrong",
            bad_aliases,
        ));
    }

    let aspect_prefixes: Vec<String> = header
        .iter()
        .filter_map(|(key, value)| {
            let iri = value.as_str()?;
            (iri.starts_with("urn:samm:") && iri.ends_with('#') && rules.prefix.is_match(iri))
                .then(|| format!("{key} = {iri}"))
        })
        .collect();
    if aspect_prefixes.is_empty() {
        report.push(TestResult::fail(
            "context/prefixes",
            "No prefix is bound to a urn:samm:...# aspect IRI",
        ));
    } else {
        report.push(TestResult::pass(
            "context/prefixes",
            format!("Aspect prefix bound ({})", aspect_prefixes.join(", ")),
        ));
    }
}

/// Keys bound directly to a namespace IRI.
fn declared_prefixes(context: &Map<String, Value>, rules: &Rules) -> BTreeSet<String> {
    context
        .iter()
        .filter(|(key, _)| !key.starts_with('@'))
        .filter_map(|(key, value)| {
            let iri = value.as_str()?;
            rules.prefix.is_match(iri).then(|| key.clone())
        })
        .collect()
}

#[derive(Default)]
struct Findings {
    terms: usize,
    scoped: usize,
    malformed: Vec<String>,
    undeclared: Vec<String>,
    datatypes: Vec<String>,
    extensions: Vec<String>,
}

impl Findings {
    fn note_extensions(&mut self, context: &Map<String, Value>, parent: &str) {
        for key in context.keys() {
            if key.starts_with('@') && !KEYWORDS.contains(&key.as_str()) {
                self.extensions.push(if parent.is_empty() {
                    key.clone()
                } else {
                    format!("{parent}.{key}")
                });
            }
        }
    }

    fn report(self, report: &mut ConformanceReport) {
        if self.malformed.is_empty() {
            report.push(TestResult::pass(
                "context/terms",
                format!("{} terms map to an IRI or an @id object", self.terms),
            ));
        } else {
            report.push(TestResult::fail_with_details(
                "context/terms",
                "Terms with values that are neither an IRI nor an @id object",
                self.malformed,
            ));
        }

        if self.undeclared.is_empty() {
            report.push(TestResult::pass(
                "context/prefixes",
                "All compact IRIs use declared prefixes",
            ));
        } else {
            report.push(TestResult::fail_with_details(
                "context/prefixes",
                "Compact IRIs with undeclared prefixes",
                self.undeclared,
            ));
        }

        if self.datatypes.is_empty() {
            report.push(TestResult::pass(
                "context/datatypes",
                "All @type coercions use declared prefixes",
            ));
        } else {
            report.push(TestResult::fail_with_details(
                "context/datatypes",
                "@type coercions that are not declared compact IRIs",
                self.datatypes,
            ));
        }

        if self.scoped > 0 {
            report.push(TestResult::pass(
                "context/scoped",
                format!("{} scoped contexts checked", self.scoped),
            ));
        }

        if !self.extensions.is_empty() {
            report.push(TestResult::warn_with_details(
                "context/extensions",
                "Keyword-like keys that JSON-LD processors ignore",
                self.extensions,
            ));
        }
    }
}

fn check_terms(
    context: &Map<String, Value>,
    parent: &str,
    rules: &Rules,
    prefixes: &mut BTreeSet<String>,
    findings: &mut Findings,
) {
    findings.note_extensions(context, parent);
    for (key, value) in context {
        if key.starts_with('@') || prefixes.contains(key) {
            continue;
        }
        let path = if parent.is_empty() {
            key.clone()
        } else {
            format!("{parent}.{key}")
        };
        match value {
            Value::String(iri) if iri.starts_with('@') => {
                let alias = (key.as_str(), iri.as_str());
                if !matches!(alias, ("id", "@id") | ("type", "@type")) {
                    findings
                        .malformed
                        .push(format!("{path}: unexpected keyword alias {iri}"));
                }
            }
            Value::String(_) => {
                findings.terms += 1;
                check_iri(Some(value), &path, rules, prefixes, findings);
            }
            Value::Object(definition) => {
                findings.terms += 1;
                if definition.get("@id").and_then(Value::as_str).is_none() {
                    findings.malformed.push(format!("{path}: object without @id"));
                    continue;
                }
                check_iri(definition.get("@id"), &path, rules, prefixes, findings);
                if let Some(datatype) = definition.get("@type") {
                    match datatype.as_str().and_then(|d| rules.compact.captures(d)) {
                        Some(caps) if prefixes.contains(&caps[1]) => {}
                        _ => findings.datatypes.push(format!("{path}: {datatype}")),
                    }
                }
                if let Some(scoped) = definition.get("@context") {
                    match scoped.as_object() {
                        Some(scoped) => {
                            findings.scoped += 1;
                            let inherited = prefixes.clone();
                            prefixes.extend(declared_prefixes(scoped, rules));
                            check_terms(scoped, &path, rules, prefixes, findings);
                            *prefixes = inherited;
                        }
                        None => findings
                            .malformed
                            .push(format!("{path}: @context is not an object")),
                    }
                }
            }
            other => findings.malformed.push(format!("{path}: {other}")),
        }
    }
}

fn check_iri(
    value: Option<&Value>,
    path: &str,
    rules: &Rules,
    prefixes: &BTreeSet<String>,
    findings: &mut Findings,
) {
    let Some(iri) = value.and_then(Value::as_str) else {
        return;
    };
    if iri.contains("://") {
        return;
    }
    match rules.compact.captures(iri) {
        Some(caps) if prefixes.contains(&caps[1]) => {}
        Some(caps) => findings.undeclared.push(format!("{path}: {iri} (prefix `{}`)", &caps[1])),
        None => findings.malformed.push(format!("{path}: `{iri}` is not a compact IRI")),
    }
}
