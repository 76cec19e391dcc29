//! Policy Report
//!
//! The structured result of a run: one [`RuleOutcome`] per rule in
//! declaration order plus summary counts. Reports render as:
//! - JSON for CI integration
//! - Human-readable text for terminal output

use std::fmt::Write as _;

use serde::{Serialize, Serializer};

use crate::error::{Error, Result};
use crate::violation::RuleViolation;

/// Result of evaluating one rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleOutcome {
    /// Rule name as declared
    pub name: String,
    /// Whether every predicate of the rule held
    pub passed: bool,
    /// Every violation found, grouped by predicate in evaluation order
    #[serde(serialize_with = "serialize_coded")]
    pub violations: Vec<RuleViolation>,
}

/// A violation serialized with its stable code next to its kind
#[derive(Serialize)]
struct CodedViolation<'a> {
    code: &'static str,
    #[serde(flatten)]
    violation: &'a RuleViolation,
}

fn serialize_coded<S: Serializer>(
    violations: &[RuleViolation],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_seq(violations.iter().map(|violation| CodedViolation {
        code: violation.code(),
        violation,
    }))
}

impl RuleOutcome {
    pub fn new(name: impl Into<String>, violations: Vec<RuleViolation>) -> Self {
        Self {
            name: name.into(),
            passed: violations.is_empty(),
            violations,
        }
    }
}

/// Summary of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub total_rules: usize,
    pub passed_rules: usize,
    pub failed_rules: usize,
    pub total_violations: usize,
    /// Whether every rule passed
    pub passed: bool,
}

/// Report of a full policy run
#[derive(Debug, Clone, Serialize)]
pub struct PolicyReport {
    /// Timestamp of the run (RFC 3339)
    pub timestamp: String,
    pub summary: ReportSummary,
    /// Per-rule outcomes, in declaration order
    pub rules: Vec<RuleOutcome>,
}

impl PolicyReport {
    pub fn new(rules: Vec<RuleOutcome>) -> Self {
        let failed_rules = rules.iter().filter(|rule| !rule.passed).count();
        let summary = ReportSummary {
            total_rules: rules.len(),
            passed_rules: rules.len() - failed_rules,
            failed_rules,
            total_violations: rules.iter().map(|rule| rule.violations.len()).sum(),
            passed: failed_rules == 0,
        };
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            summary,
            rules,
        }
    }

    pub fn passed(&self) -> bool {
        self.summary.passed
    }

    /// Failing rules, in declaration order
    pub fn failed(&self) -> impl Iterator<Item = &RuleOutcome> {
        self.rules.iter().filter(|rule| !rule.passed)
    }

    /// Convert into the aggregate failure if any rule failed
    pub fn into_result(self) -> Result<Self> {
        if self.passed() {
            return Ok(self);
        }
        let total = self.rules.len();
        let failed = self.rules.into_iter().filter(|rule| !rule.passed).collect();
        Err(Error::RulesFailed { failed, total })
    }
}

/// Styling hooks for the human-readable report
///
/// Every hook receives the plain text of one report fragment. The defaults
/// return it unchanged.
pub trait HumanStyle {
    fn passed(&self, text: &str) -> String {
        text.to_string()
    }

    fn failed(&self, text: &str) -> String {
        text.to_string()
    }

    fn code(&self, text: &str) -> String {
        text.to_string()
    }

    fn message(&self, text: &str) -> String {
        text.to_string()
    }
}

/// Unstyled text
pub struct PlainStyle;

impl HumanStyle for PlainStyle {}

/// Report generator
pub struct Reporter;

impl Reporter {
    /// Generate JSON report
    pub fn to_json(report: &PolicyReport) -> String {
        serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
    }

    /// Generate human-readable report
    pub fn to_human_readable(report: &PolicyReport) -> String {
        Self::to_styled(report, &PlainStyle)
    }

    /// `Checking rule <name> ... PASSED|FAILED` per rule, the violations of
    /// failed rules, then a summary line
    pub fn to_styled(report: &PolicyReport, style: &impl HumanStyle) -> String {
        let mut output = String::new();
        for rule in &report.rules {
            let status = if rule.passed {
                style.passed("PASSED")
            } else {
                style.failed("FAILED")
            };
            let _ = writeln!(output, "Checking rule {} ... {status}", rule.name);
            for violation in &rule.violations {
                let _ = writeln!(
                    output,
                    "  {} {}",
                    style.code(violation.code()),
                    style.message(&violation.to_string())
                );
            }
        }

        let summary = &report.summary;
        let status = if summary.passed {
            style.passed("OK")
        } else {
            style.failed("FAILED")
        };
        let _ = writeln!(
            output,
            "\n{status}: {} rules checked, {} passed, {} failed, {} violations",
            summary.total_rules, summary.passed_rules, summary.failed_rules, summary.total_violations
        );
        output
    }
}
