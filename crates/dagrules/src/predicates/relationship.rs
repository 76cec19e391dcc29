//! `have-child-relationship` / `have-parent-relationship`
//!
//! Both predicates share one algorithm parametrised by [`Relationship`].
//! For each subject the dependencies in that direction are narrowed by the
//! `select_*` filters; the survivors are then checked for presence
//! (`required`), count (`cardinality`) and per-dependency requirements
//! (`require_tags_any`, `require_node_type`). Every finding is collected.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants::RELATIONSHIP_OPTIONS;
use crate::error::ConfigError;
use crate::graph::{NodeRecord, ResourceType};
use crate::subject::{Relationship, Subject, SubjectMap};
use crate::tags::{self, TagSpec};
use crate::violation::RuleViolation;

/// How many selected dependencies a subject may have
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    #[default]
    OneToMany,
    OneToOne,
}

/// Options of a relationship predicate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipOptions {
    #[serde(default)]
    pub cardinality: Cardinality,
    #[serde(default = "default_required")]
    pub required: bool,
    #[serde(default)]
    pub select_node_type: Option<ResourceType>,
    #[serde(default)]
    pub require_node_type: Option<ResourceType>,
    #[serde(default)]
    pub select_tags_any: Option<TagSpec>,
    #[serde(default)]
    pub require_tags_any: Option<TagSpec>,
}

fn default_required() -> bool {
    true
}

impl Default for RelationshipOptions {
    fn default() -> Self {
        Self {
            cardinality: Cardinality::default(),
            required: default_required(),
            select_node_type: None,
            require_node_type: None,
            select_tags_any: None,
            require_tags_any: None,
        }
    }
}

impl RelationshipOptions {
    /// Parse the raw options of `predicate` declared by `rule`
    ///
    /// Keys may use hyphens or underscores. Unknown keys are rejected and
    /// reported in hyphenated form.
    pub fn parse(rule: &str, predicate: &str, value: &Value) -> Result<Self, ConfigError> {
        let location = format!("{predicate} of rule \"{rule}\"");
        let raw = match value {
            Value::Null => return Ok(Self::default()),
            Value::Object(raw) => raw,
            _ => {
                return Err(ConfigError::malformed(
                    location,
                    "expected a mapping of options",
                ));
            }
        };

        let normalized: Map<String, Value> = raw
            .iter()
            .map(|(key, value)| (key.replace('-', "_"), value.clone()))
            .collect();

        let unknown: BTreeSet<String> = normalized
            .keys()
            .filter(|key| !RELATIONSHIP_OPTIONS.contains(&key.as_str()))
            .map(|key| key.replace('_', "-"))
            .collect();
        if !unknown.is_empty() {
            return Err(ConfigError::UnknownPredicateOption {
                rule: rule.to_string(),
                predicate: predicate.to_string(),
                keys: unknown,
            });
        }

        serde_json::from_value(Value::Object(normalized))
            .map_err(|err| ConfigError::malformed(location, err.to_string()))
    }

    pub fn one_to_one(mut self) -> Self {
        self.cardinality = Cardinality::OneToOne;
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn select_node_type(mut self, node_type: impl Into<ResourceType>) -> Self {
        self.select_node_type = Some(node_type.into());
        self
    }

    pub fn require_node_type(mut self, node_type: impl Into<ResourceType>) -> Self {
        self.require_node_type = Some(node_type.into());
        self
    }

    pub fn select_tags_any(mut self, spec: impl Into<TagSpec>) -> Self {
        self.select_tags_any = Some(spec.into());
        self
    }

    pub fn require_tags_any(mut self, spec: impl Into<TagSpec>) -> Self {
        self.require_tags_any = Some(spec.into());
        self
    }

    fn selects(&self, record: &NodeRecord) -> bool {
        tags::matches_any(&record.tags, self.select_tags_any.as_ref())
            && self
                .select_node_type
                .as_ref()
                .is_none_or(|node_type| *node_type == record.resource_type)
    }
}

/// A relationship predicate with its direction and options
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationshipCheck {
    pub relationship: Relationship,
    pub options: RelationshipOptions,
}

impl RelationshipCheck {
    pub fn new(relationship: Relationship, options: RelationshipOptions) -> Self {
        Self {
            relationship,
            options,
        }
    }

    pub fn evaluate(&self, subjects: &SubjectMap<'_>) -> Vec<RuleViolation> {
        have_relationship(subjects, self.relationship, &self.options)
    }
}

pub fn have_relationship(
    subjects: &SubjectMap<'_>,
    relationship: Relationship,
    options: &RelationshipOptions,
) -> Vec<RuleViolation> {
    subjects
        .values()
        .flat_map(|subject| check_subject(subject, relationship, options))
        .collect()
}

fn check_subject(
    subject: &Subject<'_>,
    relationship: Relationship,
    options: &RelationshipOptions,
) -> Vec<RuleViolation> {
    let selected: BTreeMap<&str, &NodeRecord> = subject
        .dependencies(relationship)
        .iter()
        .filter(|(_, record)| options.selects(record))
        .map(|(id, record)| (*id, *record))
        .collect();

    // Dangling edges count as no relationship but still face the requirements
    let resolved = selected
        .keys()
        .filter(|dependency| !subject.is_dangling(dependency))
        .count();

    let mut violations = Vec::new();
    if options.required && resolved == 0 {
        violations.push(RuleViolation::RelationshipNotFound {
            node_id: subject.id.to_string(),
            relationship,
        });
    }
    if options.cardinality == Cardinality::OneToOne && resolved > 1 {
        violations.push(RuleViolation::CardinalityExceeded {
            node_id: subject.id.to_string(),
            relationship,
            found: resolved,
        });
    }

    for (dependency, record) in selected {
        if !tags::matches_any(&record.tags, options.require_tags_any.as_ref()) {
            violations.push(RuleViolation::DependencyTagsMismatch {
                node_id: subject.id.to_string(),
                relationship,
                dependency: dependency.to_string(),
                tags: record.tags.clone(),
                expected: options.require_tags_any.clone(),
            });
        }
        if let Some(expected) = &options.require_node_type
            && *expected != record.resource_type
        {
            violations.push(RuleViolation::DependencyTypeMismatch {
                node_id: subject.id.to_string(),
                relationship,
                dependency: dependency.to_string(),
                actual: record.resource_type.clone(),
                expected: expected.clone(),
            });
        }
    }
    violations
}
