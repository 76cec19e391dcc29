//! Rule Predicates
//!
//! The four built-in checks a rule's `must` block can declare. Each runs
//! over a whole [`SubjectMap`] and returns every violation it finds; an
//! empty result means the predicate holds.

mod match_name;
mod relationship;
mod tags_any;

use serde::Serialize;

pub use match_name::{NamePattern, match_name};
pub use relationship::{Cardinality, RelationshipCheck, RelationshipOptions, have_relationship};
pub use tags_any::have_tags_any;

use crate::constants::{HAVE_CHILD_RELATIONSHIP, HAVE_PARENT_RELATIONSHIP, HAVE_TAGS_ANY, MATCH_NAME};
use crate::subject::{Relationship, SubjectMap};
use crate::tags::TagSpec;
use crate::violation::RuleViolation;

/// A compiled predicate of a rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "predicate", rename_all = "kebab-case")]
pub enum Predicate {
    MatchName { pattern: NamePattern },
    HaveTagsAny { tags: Option<TagSpec> },
    HaveRelationship(RelationshipCheck),
}

impl Predicate {
    /// The `must` key this predicate is declared under
    pub fn name(&self) -> &'static str {
        match self {
            Self::MatchName { .. } => MATCH_NAME,
            Self::HaveTagsAny { .. } => HAVE_TAGS_ANY,
            Self::HaveRelationship(check) => match check.relationship {
                Relationship::Child => HAVE_CHILD_RELATIONSHIP,
                Relationship::Parent => HAVE_PARENT_RELATIONSHIP,
            },
        }
    }

    pub fn evaluate(&self, subjects: &SubjectMap<'_>) -> Vec<RuleViolation> {
        match self {
            Self::MatchName { pattern } => match_name(subjects, pattern),
            Self::HaveTagsAny { tags } => have_tags_any(subjects, tags.as_ref()),
            Self::HaveRelationship(check) => check.evaluate(subjects),
        }
    }
}
