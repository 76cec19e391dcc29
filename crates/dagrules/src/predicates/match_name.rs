//! `match-name`: every subject's name must fully match a `/<regex>/` pattern.

use std::fmt;

use regex::Regex;
use serde::{Serialize, Serializer};

use crate::error::ConfigError;
use crate::subject::SubjectMap;
use crate::violation::RuleViolation;

/// A compiled `/<regex>/` name pattern
#[derive(Debug, Clone)]
pub struct NamePattern {
    raw: String,
    regex: Regex,
}

impl NamePattern {
    /// Compile a delimited pattern declared by `rule`
    ///
    /// The inner regex is anchored at both ends so it must match the whole
    /// name.
    pub fn parse(rule: &str, pattern: &str) -> Result<Self, ConfigError> {
        let inner = pattern
            .strip_prefix('/')
            .and_then(|rest| rest.strip_suffix('/'))
            .ok_or_else(|| ConfigError::UnsupportedMatcher {
                rule: rule.to_string(),
                pattern: pattern.to_string(),
            })?;
        let regex = Regex::new(&format!("^(?:{inner})$")).map_err(|err| {
            ConfigError::InvalidPattern {
                rule: rule.to_string(),
                pattern: pattern.to_string(),
                message: err.to_string(),
            }
        })?;
        Ok(Self {
            raw: pattern.to_string(),
            regex,
        })
    }

    /// The pattern as written, delimiters included
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn is_match(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }
}

impl PartialEq for NamePattern {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for NamePattern {}

impl fmt::Display for NamePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for NamePattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

pub fn match_name(subjects: &SubjectMap<'_>, pattern: &NamePattern) -> Vec<RuleViolation> {
    subjects
        .values()
        .filter(|subject| !pattern.is_match(subject.name()))
        .map(|subject| RuleViolation::name_mismatch(subject.id, subject.name(), pattern))
        .collect()
}
