//! Policy Engine
//!
//! Orchestrates a run in two phases with no loop-back:
//!
//! 1. **Config validation**: the document is schema-checked and compiled
//!    into a [`RuleSet`]. Any error aborts the run before a rule runs.
//! 2. **Semantic check**: the version is verified, then every rule selects
//!    its subjects and runs its predicates. A failing rule is recorded and
//!    the run continues; outcomes are reported in declaration order.
//!
//! Rule evaluations are independent pure computations over one read-only
//! [`SubjectSelector`], so they may run in parallel.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::{Rule, RuleSet};
use crate::error::Result;
use crate::graph::Graph;
use crate::report::{PolicyReport, RuleOutcome};
use crate::subject::SubjectSelector;

/// Engine tuning
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineOptions {
    /// Evaluate rules on the rayon thread pool
    #[serde(default)]
    pub parallel: bool,
}

impl EngineOptions {
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// Evaluates rule documents against graphs
#[derive(Debug, Clone, Default)]
pub struct PolicyEngine {
    options: EngineOptions,
}

impl PolicyEngine {
    pub fn new(options: EngineOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> EngineOptions {
        self.options
    }

    /// Validate a document and evaluate every rule
    ///
    /// Returns `Err` only for configuration errors; failing rules are
    /// reported in the returned [`PolicyReport`].
    pub fn evaluate(&self, config: &Value, graph: &Graph) -> Result<PolicyReport> {
        let rules = RuleSet::compile(config)?;
        self.evaluate_rules(&rules, graph)
    }

    /// Evaluate an already compiled rule set
    pub fn evaluate_rules(&self, rules: &RuleSet, graph: &Graph) -> Result<PolicyReport> {
        rules.check_version()?;

        let selector = SubjectSelector::new(graph);
        info!(
            rules = rules.len(),
            nodes = selector.index().len(),
            parallel = self.options.parallel,
            "Evaluating dagrules"
        );

        let outcomes: Vec<RuleOutcome> = if self.options.parallel {
            rules
                .rules
                .par_iter()
                .map(|rule| evaluate_rule(&selector, rule))
                .collect()
        } else {
            rules
                .rules
                .iter()
                .map(|rule| evaluate_rule(&selector, rule))
                .collect()
        };

        let report = PolicyReport::new(outcomes);
        info!(
            passed = report.summary.passed_rules,
            failed = report.summary.failed_rules,
            "dagrules evaluation finished"
        );
        Ok(report)
    }

    /// Like [`evaluate`](Self::evaluate), but failing rules become
    /// [`Error::RulesFailed`](crate::Error::RulesFailed)
    pub fn check(&self, config: &Value, graph: &Graph) -> Result<PolicyReport> {
        self.evaluate(config, graph)?.into_result()
    }
}

/// Select a rule's subjects and run all of its predicates
pub fn evaluate_rule(selector: &SubjectSelector<'_>, rule: &Rule) -> RuleOutcome {
    let subjects = selector.select(&rule.subject);
    debug!(
        rule = %rule.name,
        node_type = %rule.subject.node_type,
        subjects = subjects.len(),
        "Checking rule"
    );

    let violations: Vec<_> = rule
        .must
        .iter()
        .flat_map(|predicate| predicate.evaluate(&subjects))
        .collect();

    if !violations.is_empty() {
        warn!(rule = %rule.name, violations = violations.len(), "Rule failed");
    }
    RuleOutcome::new(rule.name.as_str(), violations)
}
