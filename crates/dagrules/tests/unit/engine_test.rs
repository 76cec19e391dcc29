//! Tests for the policy engine orchestration

use crate::test_utils::warehouse_graph;
use dagrules::{ConfigError, EngineOptions, Error, PolicyEngine, RuleViolation};
use serde_json::{Value, json};

fn layering_rules() -> Value {
    json!({
        "version": "1",
        "rules": [
            {
                "name": "staging models are named stg_",
                "subject": {"tags": "staging"},
                "must": {
                    "match-name": "/stg_.*/",
                    "have-parent-relationship": {"require-node-type": "source"},
                },
            },
            {
                "name": "marts only read base models",
                "subject": {"tags": "mart"},
                "must": {"have-parent-relationship": {"require_tags_any": "base"}},
            },
            {
                "name": "base models have one staging parent",
                "subject": {"tags": "base"},
                "must": {
                    "have-parent-relationship": {"cardinality": "one_to_one", "require-tags-any": "staging"},
                },
            },
        ],
    })
}

#[test]
fn test_failures_do_not_stop_later_rules() {
    let graph = warehouse_graph();
    let report = PolicyEngine::default()
        .evaluate(&layering_rules(), &graph)
        .unwrap();

    let outcomes: Vec<(&str, bool)> = report
        .rules
        .iter()
        .map(|rule| (rule.name.as_str(), rule.passed))
        .collect();
    assert_eq!(
        outcomes,
        [
            ("staging models are named stg_", true),
            ("marts only read base models", false),
            ("base models have one staging parent", true),
        ]
    );
    assert!(!report.passed());
    assert!(matches!(
        &report.rules[1].violations[..],
        [RuleViolation::DependencyTagsMismatch { dependency, .. }] if dependency == "model.shop.stg_customers"
    ));
}

#[test]
fn test_parallel_evaluation_keeps_declaration_order() {
    let graph = warehouse_graph();
    let sequential = PolicyEngine::default()
        .evaluate(&layering_rules(), &graph)
        .unwrap();
    let parallel = PolicyEngine::new(EngineOptions::default().parallel(true))
        .evaluate(&layering_rules(), &graph)
        .unwrap();
    assert_eq!(sequential.rules, parallel.rules);
    assert_eq!(sequential.summary, parallel.summary);
}

#[test]
fn test_check_raises_aggregate_failure() {
    let graph = warehouse_graph();
    let err = PolicyEngine::default()
        .check(&layering_rules(), &graph)
        .unwrap_err();
    assert!(err.is_rule_failure());
    match err {
        Error::RulesFailed { failed, total } => {
            assert_eq!(total, 3);
            assert_eq!(failed.len(), 1);
            assert_eq!(failed[0].name, "marts only read base models");
        }
        Error::Config(other) => panic!("unexpected config error: {other}"),
    }
}

#[test]
fn test_config_errors_abort_before_evaluation() {
    let graph = warehouse_graph();
    let config = json!({
        "version": "1",
        "rules": [
            {"name": "fine", "must": {"match-name": "/.*/"}},
            {"name": "broken", "must": {"match-name": "stg_"}},
        ],
    });
    let err = PolicyEngine::default().evaluate(&config, &graph).unwrap_err();
    assert!(matches!(
        err.as_config(),
        Some(ConfigError::UnsupportedMatcher { rule, .. }) if rule == "broken"
    ));
}

#[test]
fn test_unsupported_version_runs_no_rules() {
    let graph = warehouse_graph();
    let err = PolicyEngine::default()
        .evaluate(&json!({"version": "2", "rules": []}), &graph)
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "dagrules.yml config version must be '1', found \"2\""
    );
}

#[test]
fn test_empty_document_passes() {
    let report = PolicyEngine::default()
        .check(&json!({"version": "1", "rules": []}), &warehouse_graph())
        .unwrap();
    assert_eq!(report.summary.total_rules, 0);
    assert!(report.passed());
}
