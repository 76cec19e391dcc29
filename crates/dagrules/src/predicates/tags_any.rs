//! `have-tags-any`: every subject's tags must satisfy a tag spec.

use crate::subject::SubjectMap;
use crate::tags::{self, TagSpec};
use crate::violation::RuleViolation;

pub fn have_tags_any(subjects: &SubjectMap<'_>, spec: Option<&TagSpec>) -> Vec<RuleViolation> {
    subjects
        .values()
        .filter(|subject| !tags::matches_any(&subject.record.tags, spec))
        .map(|subject| RuleViolation::TagsMismatch {
            node_id: subject.id.to_string(),
            tags: subject.record.tags.clone(),
            expected: spec.cloned(),
        })
        .collect()
}
