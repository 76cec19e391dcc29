//! Tests for rule document validation and compilation

use std::collections::BTreeSet;

use dagrules::config::schema::validate;
use dagrules::{ConfigError, Predicate, ResourceType, RuleSet, SchemaScope, TagSpec};
use serde_json::json;

fn keys(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|key| (*key).to_string()).collect()
}

#[test]
fn test_minimal_document_is_valid() {
    assert!(validate(&json!({"version": "1", "rules": []})).is_ok());
}

#[test]
fn test_missing_version_is_required_key_error() {
    let err = validate(&json!({"rules": []})).unwrap_err();
    assert_eq!(
        err,
        ConfigError::RequiredKey {
            scope: SchemaScope::Root,
            keys: keys(&["version"]),
        }
    );
}

#[test]
fn test_extra_root_key_is_allowed_key_error() {
    let err = validate(&json!({"version": "1", "rules": [], "extra": "x"})).unwrap_err();
    assert_eq!(
        err,
        ConfigError::AllowedKey {
            scope: SchemaScope::Root,
            keys: keys(&["extra"]),
        }
    );
}

#[test]
fn test_rule_requires_must() {
    let err = validate(&json!({"version": "1", "rules": [{"name": "bob"}]})).unwrap_err();
    assert_eq!(
        err,
        ConfigError::RequiredKey {
            scope: SchemaScope::Rule {
                name: "bob".to_string()
            },
            keys: keys(&["must"]),
        }
    );
}

#[test]
fn test_unknown_subject_and_must_keys_are_reported() {
    let err = validate(&json!({
        "version": "1",
        "rules": [{"name": "r", "subject": {"type": "model", "tag": "x"}, "must": {}}],
    }))
    .unwrap_err();
    assert_eq!(err.keys(), Some(&keys(&["tag"])));
    assert!(err.to_string().contains("subject of rule \"r\""));

    let err = validate(&json!({
        "version": "1",
        "rules": [{"name": "r", "must": {"have-tags": "x", "match-names": "/x/"}}],
    }))
    .unwrap_err();
    assert_eq!(err.keys(), Some(&keys(&["have-tags", "match-names"])));
}

#[test]
fn test_later_rules_are_validated_before_anything_runs() {
    let err = RuleSet::compile(&json!({
        "version": "1",
        "rules": [
            {"name": "good", "must": {"match-name": "/x/"}},
            {"name": "bad", "must": {"have-child-relationship": {"bogus": 1}}},
        ],
    }))
    .unwrap_err();
    assert!(matches!(
        err,
        ConfigError::UnknownPredicateOption { ref rule, .. } if rule == "bad"
    ));
}

#[test]
fn test_wrong_shapes_are_malformed() {
    for config in [
        json!("rules"),
        json!({"version": "1", "rules": {"name": "x"}}),
        json!({"version": "1", "rules": ["x"]}),
        json!({"version": "1", "rules": [{"name": 3, "must": {}}]}),
        json!({"version": ["1"], "rules": []}),
    ] {
        let err = RuleSet::compile(&config).unwrap_err();
        assert!(matches!(err, ConfigError::Malformed { .. }), "{config}: {err}");
    }
}

#[test]
fn test_non_regex_matcher_is_unsupported() {
    let err = RuleSet::compile(&json!({
        "version": "1",
        "rules": [{"name": "r", "must": {"match-name": "stg_*"}}],
    }))
    .unwrap_err();
    assert_eq!(
        err,
        ConfigError::UnsupportedMatcher {
            rule: "r".to_string(),
            pattern: "stg_*".to_string(),
        }
    );
}

#[test]
fn test_compiled_rule_shape() {
    let rules = RuleSet::compile(&json!({
        "version": "1",
        "rules": [
            {"name": "defaulted", "must": {}},
            {
                "name": "snapshots",
                "subject": {"type": "snapshot", "tags": ["a", {"include": "b"}]},
                "must": {"have-tags-any": null, "have-child-relationship": {"required": false}},
            },
        ],
    }))
    .unwrap();
    assert_eq!(rules.len(), 2);

    let defaulted = &rules.rules[0];
    assert_eq!(defaulted.subject.node_type, ResourceType::Model);
    assert_eq!(defaulted.subject.tags, None);
    assert!(defaulted.must.is_empty());

    let snapshots = &rules.rules[1];
    assert_eq!(snapshots.subject.node_type, ResourceType::Snapshot);
    assert!(matches!(snapshots.subject.tags, Some(TagSpec::Any(ref matchers)) if matchers.len() == 2));
    match &snapshots.must[..] {
        [Predicate::HaveTagsAny { tags: None }, Predicate::HaveRelationship(check)] => {
            assert!(!check.options.required);
        }
        other => panic!("unexpected predicates: {other:?}"),
    }
}

#[test]
fn test_null_subject_and_must_are_empty() {
    let rules = RuleSet::compile(&json!({
        "version": "1",
        "rules": [{"name": "r", "subject": null, "must": null}],
    }))
    .unwrap();
    assert_eq!(rules.rules[0].subject.node_type, ResourceType::Model);
    assert!(rules.rules[0].must.is_empty());
}
