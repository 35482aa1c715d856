//! SAMM semantic identifiers.
//!
//! A semantic identifier names one aspect model version:
//!
//! ```text
//! urn:samm:io.catenax.pcf:7.0.0#Pcf
//!          └─namespace──┘ └ver┘ └aspect┘
//! ```
//!
//! The part up to and including `#` doubles as the base IRI of every term the
//! translator derives for that aspect.

use std::fmt;
use std::str::FromStr;

use crate::error::IdentifierError;

const URN_SCHEME: &str = "urn";
const SAMM_NID: &str = "samm";

/// A parsed `urn:samm:<namespace>:<version>#<AspectName>` identifier.
///
/// Values are immutable; the only constructor is [`SemanticIdentifier::parse`]
/// (or [`FromStr`]), so every instance satisfies the URN grammar.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SemanticIdentifier {
    namespace: String,
    version: String,
    aspect_name: String,
}

impl SemanticIdentifier {
    /// Parses a raw semantic identifier.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError`] when the input is not exactly one
    /// `<urn-part>#<aspect>` pair, when the URN does not start with
    /// `urn:samm:`, or when namespace, version or aspect name violate the
    /// grammar.
    pub fn parse(input: &str) -> Result<Self, IdentifierError> {
        let (urn, aspect_name) = match input.split('#').collect::<Vec<_>>().as_slice() {
            [urn, aspect] if !urn.is_empty() && !aspect.is_empty() => (*urn, *aspect),
            [_] => return Err(IdentifierError::new(input, "missing `#` separator")),
            [_, _] => {
                return Err(IdentifierError::new(
                    input,
                    "both sides of `#` must be non-empty",
                ))
            }
            _ => return Err(IdentifierError::new(input, "more than one `#` separator")),
        };

        let segments: Vec<&str> = urn.split(':').collect();
        if segments.len() < 4 {
            return Err(IdentifierError::new(
                input,
                "expected `urn:samm:<namespace>:<version>`",
            ));
        }
        if segments[0] != URN_SCHEME || segments[1] != SAMM_NID {
            return Err(IdentifierError::new(
                input,
                "identifier must start with `urn:samm:`",
            ));
        }

        let (version, namespace_parts) = match segments[2..].split_last() {
            Some((version, namespace)) => (*version, namespace),
            None => return Err(IdentifierError::new(input, "missing version")),
        };

        for part in namespace_parts {
            if part.split('.').any(str::is_empty) {
                return Err(IdentifierError::new(
                    input,
                    format!("namespace segment `{part}` has an empty dot-separated part"),
                ));
            }
        }
        validate_version(input, version)?;
        validate_aspect_name(input, aspect_name)?;

        Ok(Self {
            namespace: namespace_parts.join(":"),
            version: version.to_owned(),
            aspect_name: aspect_name.to_owned(),
        })
    }

    /// Namespace, e.g. `io.catenax.pcf`.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Version, e.g. `7.0.0`.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Aspect name, e.g. `Pcf`.
    #[must_use]
    pub fn aspect_name(&self) -> &str {
        &self.aspect_name
    }

    /// Base IRI shared by all terms of this aspect: `urn:samm:<namespace>:<version>#`.
    #[must_use]
    pub fn base_iri(&self) -> String {
        format!(
            "{URN_SCHEME}:{SAMM_NID}:{}:{}#",
            self.namespace, self.version
        )
    }
}

fn validate_version(input: &str, version: &str) -> Result<(), IdentifierError> {
    let parts: Vec<&str> = version.split('.').collect();
    if parts.len() < 2 {
        return Err(IdentifierError::new(
            input,
            format!("version `{version}` needs at least two dot-separated segments"),
        ));
    }
    let numeric_ish = |part: &str| {
        !part.is_empty()
            && part
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-')
    };
    let leads_with_digit = parts[0].chars().next().is_some_and(|c| c.is_ascii_digit());
    if !leads_with_digit || !parts.iter().all(|p| numeric_ish(p)) {
        return Err(IdentifierError::new(
            input,
            format!("version `{version}` is not numeric"),
        ));
    }
    Ok(())
}

fn validate_aspect_name(input: &str, aspect: &str) -> Result<(), IdentifierError> {
    if aspect.chars().any(|c| c.is_whitespace() || c == ':' || c == '/') {
        return Err(IdentifierError::new(
            input,
            format!("aspect name `{aspect}` contains whitespace, `:` or `/`"),
        ));
    }
    Ok(())
}

impl FromStr for SemanticIdentifier {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Canonical form; re-parsing it yields an equal identifier.
impl fmt::Display for SemanticIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.base_iri(), self.aspect_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_catena_x_identifier() {
        let id = SemanticIdentifier::parse("urn:samm:io.catenax.pcf:7.0.0#Pcf")
            .expect("valid identifier");
        assert_eq!(id.namespace(), "io.catenax.pcf");
        assert_eq!(id.version(), "7.0.0");
        assert_eq!(id.aspect_name(), "Pcf");
        assert_eq!(id.base_iri(), "urn:samm:io.catenax.pcf:7.0.0#");
    }

    #[test]
    fn single_segment_namespace() {
        let id = SemanticIdentifier::parse("urn:samm:example:1.0.0#TestAspect")
            .expect("valid identifier");
        assert_eq!(id.namespace(), "example");
        assert_eq!(id.base_iri(), "urn:samm:example:1.0.0#");
    }

    #[test]
    fn colon_separated_namespace_is_kept() {
        let id = SemanticIdentifier::parse("urn:samm:org.eclipse.esmf.samm:meta-model:2.1.0#Aspect")
            .expect("valid identifier");
        assert_eq!(id.namespace(), "org.eclipse.esmf.samm:meta-model");
        assert_eq!(id.version(), "2.1.0");
    }

    #[test]
    fn display_is_canonical() {
        let raw = "urn:samm:io.catenax.battery.battery_pass:6.0.0#BatteryPass";
        let id = SemanticIdentifier::parse(raw).expect("valid identifier");
        assert_eq!(id.to_string(), raw);
    }

    #[test]
    fn rejects_malformed_inputs() {
        for raw in [
            "",
            "invalid_semantic_id",
            "urn:samm:bad",
            "urn:samm:example:1.0.0",
            "urn:samm:example:1.0.0#",
            "#Aspect",
            "urn:samm:example#Aspect",
            "urn:x:example:1.0.0#Aspect",
            "urx:samm:example:1.0.0#Aspect",
            "urn:samm:example:1#Aspect",
            "urn:samm:example:v1.0#Aspect",
            "urn:samm:example:1..0#Aspect",
            "urn:samm:ex..ample:1.0.0#Aspect",
            "urn:samm::1.0.0#Aspect",
            "urn:samm:example:1.0.0#A#B",
            "urn:samm:example:1.0.0#My Aspect",
        ] {
            assert!(
                SemanticIdentifier::parse(raw).is_err(),
                "`{raw}` should be rejected"
            );
        }
    }

    #[test]
    fn missing_hash_reason() {
        let err = SemanticIdentifier::parse("urn:samm:bad").expect_err("must fail");
        assert_eq!(err.input, "urn:samm:bad");
        assert!(err.reason.contains('#'));
    }
}
