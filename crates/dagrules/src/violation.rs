//! Rule Violations
//!
//! A violation means the graph fails a correctly specified rule. Violations
//! are collected per rule and never abort a run.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use crate::graph::ResourceType;
use crate::predicates::NamePattern;
use crate::subject::Relationship;
use crate::tags::{TagSpec, format_tags};

/// A single finding of a predicate against one subject
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleViolation {
    /// The subject's name does not fully match the rule's pattern
    NameMismatch {
        node_id: String,
        name: String,
        pattern: String,
    },
    /// The subject's tags do not satisfy the expected tag spec
    TagsMismatch {
        node_id: String,
        tags: BTreeSet<String>,
        expected: Option<TagSpec>,
    },
    /// No selected dependency in the required direction
    RelationshipNotFound {
        node_id: String,
        relationship: Relationship,
    },
    /// More than one selected dependency under `one_to_one`
    CardinalityExceeded {
        node_id: String,
        relationship: Relationship,
        found: usize,
    },
    /// A selected dependency fails `require_tags_any`
    DependencyTagsMismatch {
        node_id: String,
        relationship: Relationship,
        dependency: String,
        tags: BTreeSet<String>,
        expected: Option<TagSpec>,
    },
    /// A selected dependency fails `require_node_type`
    DependencyTypeMismatch {
        node_id: String,
        relationship: Relationship,
        dependency: String,
        actual: ResourceType,
        expected: ResourceType,
    },
}

impl RuleViolation {
    pub fn name_mismatch(node_id: &str, name: &str, pattern: &NamePattern) -> Self {
        Self::NameMismatch {
            node_id: node_id.to_string(),
            name: name.to_string(),
            pattern: pattern.as_str().to_string(),
        }
    }

    /// Stable code for this kind of violation
    pub fn code(&self) -> &'static str {
        match self {
            Self::NameMismatch { .. } => "DAG001",
            Self::TagsMismatch { .. } => "DAG002",
            Self::RelationshipNotFound { .. } => "DAG003",
            Self::CardinalityExceeded { .. } => "DAG004",
            Self::DependencyTagsMismatch { .. } => "DAG005",
            Self::DependencyTypeMismatch { .. } => "DAG006",
        }
    }

    /// Id of the subject the violation was found on
    pub fn node_id(&self) -> &str {
        match self {
            Self::NameMismatch { node_id, .. }
            | Self::TagsMismatch { node_id, .. }
            | Self::RelationshipNotFound { node_id, .. }
            | Self::CardinalityExceeded { node_id, .. }
            | Self::DependencyTagsMismatch { node_id, .. }
            | Self::DependencyTypeMismatch { node_id, .. } => node_id,
        }
    }

    pub fn message(&self) -> String {
        self.to_string()
    }
}

fn format_expected(spec: Option<&TagSpec>) -> String {
    spec.map_or_else(|| "None".to_string(), ToString::to_string)
}

impl fmt::Display for RuleViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NameMismatch {
                node_id,
                name,
                pattern,
            } => write!(
                f,
                "For node \"{node_id}\", \"{name}\" does not match pattern {pattern}"
            ),
            Self::TagsMismatch {
                node_id,
                tags,
                expected,
            } => write!(
                f,
                "For node \"{node_id}\", tags {} do not match expected tags {}",
                format_tags(tags),
                format_expected(expected.as_ref())
            ),
            Self::RelationshipNotFound {
                node_id,
                relationship,
            } => write!(
                f,
                "{relationship} relationship required, not found for node \"{node_id}\""
            ),
            Self::CardinalityExceeded {
                node_id,
                relationship,
                found,
            } => write!(
                f,
                "Expecting only one {relationship}, found {found} for node \"{node_id}\""
            ),
            Self::DependencyTagsMismatch {
                node_id,
                relationship,
                dependency,
                tags,
                expected,
            } => write!(
                f,
                "Expecting all {relationship} relations of \"{node_id}\" to have tags {}, \
                 however {relationship} \"{dependency}\" had tags {}",
                format_expected(expected.as_ref()),
                format_tags(tags)
            ),
            Self::DependencyTypeMismatch {
                node_id,
                relationship,
                dependency,
                actual,
                expected,
            } => write!(
                f,
                "Expecting all {relationship} relations of \"{node_id}\" to be of node type \
                 \"{expected}\", however {relationship} \"{dependency}\" had type \"{actual}\""
            ),
        }
    }
}
