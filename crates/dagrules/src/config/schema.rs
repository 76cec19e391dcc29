//! Structural validation of a rule document
//!
//! Checks the allowed and required keys at every nesting level (root, each
//! rule, each declared subject and `must` block). Unknown keys are reported
//! before missing ones, and the whole document is walked before any rule is
//! compiled or evaluated.

use std::collections::BTreeSet;

use serde_json::{Map, Value};

use crate::constants::{MUST_KEYS, ROOT_KEYS, RULE_KEYS, RULE_REQUIRED_KEYS, SUBJECT_KEYS};
use crate::error::{ConfigError, SchemaScope};

/// Validate the structure of a whole rule document
pub fn validate(config: &Value) -> Result<(), ConfigError> {
    let root = expect_mapping(config, &SchemaScope::Root)?;
    validate_root(root)?;

    let rules = match root.get("rules") {
        Some(Value::Array(rules)) => rules,
        _ => {
            return Err(ConfigError::malformed(
                "rules",
                "expected a list of rules",
            ));
        }
    };

    for (index, rule) in rules.iter().enumerate() {
        let rule = expect_mapping(rule, &SchemaScope::RuleAt { index })?;
        let name = validate_rule_name(index, rule)?;
        validate_rule(name, rule)?;

        if let Some(subject) = rule.get("subject").filter(|value| !value.is_null()) {
            let scope = SchemaScope::Subject {
                rule: name.to_string(),
            };
            validate_subject(name, expect_mapping(subject, &scope)?)?;
        }
        if let Some(must) = rule.get("must").filter(|value| !value.is_null()) {
            let scope = SchemaScope::Must {
                rule: name.to_string(),
            };
            validate_must(name, expect_mapping(must, &scope)?)?;
        }
    }
    Ok(())
}

pub fn validate_root(root: &Map<String, Value>) -> Result<(), ConfigError> {
    validate_keys(root, ROOT_KEYS, ROOT_KEYS, SchemaScope::Root)
}

/// Every rule needs a string name before anything else can be reported about it
pub fn validate_rule_name(index: usize, rule: &Map<String, Value>) -> Result<&str, ConfigError> {
    match rule.get("name") {
        Some(Value::String(name)) => Ok(name),
        None => Err(ConfigError::required_keys(
            SchemaScope::RuleAt { index },
            ["name"],
        )),
        Some(_) => Err(ConfigError::malformed(
            SchemaScope::RuleAt { index }.to_string(),
            "`name` must be a string",
        )),
    }
}

pub fn validate_rule(name: &str, rule: &Map<String, Value>) -> Result<(), ConfigError> {
    validate_keys(
        rule,
        RULE_KEYS,
        RULE_REQUIRED_KEYS,
        SchemaScope::Rule {
            name: name.to_string(),
        },
    )
}

pub fn validate_subject(rule: &str, subject: &Map<String, Value>) -> Result<(), ConfigError> {
    validate_keys(
        subject,
        SUBJECT_KEYS,
        &[],
        SchemaScope::Subject {
            rule: rule.to_string(),
        },
    )
}

pub fn validate_must(rule: &str, must: &Map<String, Value>) -> Result<(), ConfigError> {
    validate_keys(
        must,
        MUST_KEYS,
        &[],
        SchemaScope::Must {
            rule: rule.to_string(),
        },
    )
}

fn validate_keys(
    values: &Map<String, Value>,
    allowed: &[&str],
    required: &[&str],
    scope: SchemaScope,
) -> Result<(), ConfigError> {
    let unknown: BTreeSet<&str> = values
        .keys()
        .map(String::as_str)
        .filter(|key| !allowed.contains(key))
        .collect();
    if !unknown.is_empty() {
        return Err(ConfigError::allowed_keys(scope, unknown));
    }

    let missing: BTreeSet<&str> = required
        .iter()
        .copied()
        .filter(|key| !values.contains_key(*key))
        .collect();
    if !missing.is_empty() {
        return Err(ConfigError::required_keys(scope, missing));
    }
    Ok(())
}

fn expect_mapping<'v>(
    value: &'v Value,
    scope: &SchemaScope,
) -> Result<&'v Map<String, Value>, ConfigError> {
    value
        .as_object()
        .ok_or_else(|| ConfigError::malformed(scope.to_string(), "expected a mapping"))
}
