//! Conformance report types: results, severity levels, and report aggregation.

use std::fmt;

use serde::Serialize;

/// Severity level of a conformance check result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The check passed.
    Pass,
    /// The check identified a warning (non-blocking).
    Warning,
    /// The check failed (blocks conformance).
    Failure,
}

impl Severity {
    /// Four-letter tag used in console output.
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Severity::Pass => "PASS",
            Severity::Warning => "WARN",
            Severity::Failure => "FAIL",
        }
    }
}

/// A single conformance check result.
#[derive(Debug, Clone, Serialize)]
pub struct TestResult {
    /// Short identifier of the check that produced this result.
    pub validator: String,
    /// Human-readable message describing the outcome.
    pub message: String,
    /// Severity of the result.
    pub severity: Severity,
    /// Offending terms or keys, one per line.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

impl TestResult {
    fn with(
        severity: Severity,
        validator: impl Into<String>,
        message: impl Into<String>,
        details: Vec<String>,
    ) -> Self {
        Self {
            validator: validator.into(),
            message: message.into(),
            severity,
            details,
        }
    }

    /// Creates a passing result.
    pub fn pass(validator: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with(Severity::Pass, validator, message, Vec::new())
    }

    /// Creates a failure result.
    pub fn fail(validator: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with(Severity::Failure, validator, message, Vec::new())
    }

    /// Creates a failure result listing the offending items.
    pub fn fail_with_details(
        validator: impl Into<String>,
        message: impl Into<String>,
        details: Vec<String>,
    ) -> Self {
        Self::with(Severity::Failure, validator, message, details)
    }

    /// Creates a warning result listing the items it concerns.
    pub fn warn_with_details(
        validator: impl Into<String>,
        message: impl Into<String>,
        details: Vec<String>,
    ) -> Self {
        Self::with(Severity::Warning, validator, message, details)
    }

    /// Returns true if this result represents a failure.
    pub fn is_failure(&self) -> bool {
        self.severity == Severity::Failure
    }
}

impl fmt::Display for TestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.severity.tag(),
            self.validator,
            self.message
        )?;
        for detail in &self.details {
            write!(f, "\n       {detail}")?;
        }
        Ok(())
    }
}

/// Aggregated results of every check run against one context.
#[derive(Debug, Default, Serialize)]
pub struct ConformanceReport {
    /// All individual results, in the order the checks ran.
    pub results: Vec<TestResult>,
}

impl ConformanceReport {
    /// Creates a new empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a result to this report.
    pub fn push(&mut self, result: TestResult) {
        self.results.push(result);
    }

    /// Extends this report with results from another report.
    pub fn extend(&mut self, other: ConformanceReport) {
        self.results.extend(other.results);
    }

    /// Number of results with `severity`.
    pub fn count(&self, severity: Severity) -> usize {
        self.results.iter().filter(|r| r.severity == severity).count()
    }

    /// Returns the count of failed checks.
    pub fn failure_count(&self) -> usize {
        self.count(Severity::Failure)
    }

    /// Failed results only.
    pub fn failures(&self) -> impl Iterator<Item = &TestResult> {
        self.results.iter().filter(|r| r.is_failure())
    }

    /// Returns true if all checks passed (no failures).
    pub fn all_passed(&self) -> bool {
        self.failure_count() == 0
    }

    /// One-line tally, e.g. `7 passed, 0 warnings, 1 failed`.
    pub fn summary(&self) -> String {
        format!(
            "{} passed, {} warnings, {} failed",
            self.count(Severity::Pass),
            self.count(Severity::Warning),
            self.failure_count()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tallies_by_severity() {
        let mut report = ConformanceReport::new();
        report.push(TestResult::pass("context/header", "ok"));
        report.push(TestResult::warn_with_details(
            "context/terms",
            "odd",
            vec!["x".into()],
        ));
        report.push(TestResult::fail("context/prefixes", "missing"));
        assert_eq!(report.summary(), "1 passed, 1 warnings, 1 failed");
        assert!(!report.all_passed());
        assert_eq!(report.failures().count(), 1);
    }

    #[test]
    fn serialises_for_machine_readers() {
        let pass = serde_json::to_value(TestResult::pass("context/header", "ok")).expect("json");
        assert_eq!(
            pass,
            serde_json::json!({
                "validator": "context/header",
                "message": "ok",
                "severity": "pass"
            })
        );
        let warning =
            TestResult::warn_with_details("context/extensions", "ignored", vec!["@x".into()]);
        let warning = serde_json::to_value(warning).expect("json");
        assert_eq!(warning["severity"], "warning");
        assert_eq!(warning["details"], serde_json::json!(["@x"]));
    }

    #[test]
    fn display_lists_details() {
        let result = TestResult::fail_with_details("context/terms", "bad terms", vec!["a".into()]);
        assert_eq!(
            result.to_string(),
            "[FAIL] context/terms: bad terms\n       a"
        );
    }
}
