//! Tag Matching
//!
//! Include/exclude predicates over a node's tag set. A rule document may
//! spell a tag spec in several ways:
//!
//! - a bare string, `base`, meaning "tagged `base`"
//! - a mapping, `{include: [core, dim], exclude: dim_cv}`
//! - a list mixing both forms, matched with OR semantics
//!
//! All of them are normalised once into [`TagSpec`] when the document is
//! compiled, so predicates never re-inspect the raw shape.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::constants::TAG_MATCHER_KEYS;
use crate::error::ConfigError;

/// A single include/exclude matcher
///
/// Matches a tag set iff every `include` tag is present and no `exclude`
/// tag is. An empty `include` is vacuously satisfied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TagMatcher {
    pub include: BTreeSet<String>,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub exclude: BTreeSet<String>,
}

impl TagMatcher {
    /// Create a matcher from include and exclude tag lists
    pub fn new<I, E>(include: I, exclude: E) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
        E: IntoIterator,
        E::Item: Into<String>,
    {
        Self {
            include: include.into_iter().map(Into::into).collect(),
            exclude: exclude.into_iter().map(Into::into).collect(),
        }
    }

    /// Matcher requiring a single tag
    pub fn tag(tag: impl Into<String>) -> Self {
        Self {
            include: BTreeSet::from([tag.into()]),
            exclude: BTreeSet::new(),
        }
    }

    /// Add tags that must not be present
    pub fn excluding<E>(mut self, exclude: E) -> Self
    where
        E: IntoIterator,
        E::Item: Into<String>,
    {
        self.exclude.extend(exclude.into_iter().map(Into::into));
        self
    }

    pub fn matches(&self, tags: &BTreeSet<String>) -> bool {
        self.include.is_subset(tags) && self.exclude.is_disjoint(tags)
    }

    fn parse(value: &Value) -> Result<Self, String> {
        match value {
            Value::String(tag) => Ok(Self::tag(tag.as_str())),
            Value::Object(map) => {
                let unknown: Vec<&str> = map
                    .keys()
                    .map(String::as_str)
                    .filter(|key| !TAG_MATCHER_KEYS.contains(key))
                    .collect();
                if !unknown.is_empty() {
                    return Err(format!("unknown tag matcher keys {unknown:?}"));
                }
                Ok(Self {
                    include: parse_tag_list(map.get("include"), "include")?,
                    exclude: parse_tag_list(map.get("exclude"), "exclude")?,
                })
            }
            other => Err(format!(
                "expected a tag or an include/exclude mapping, found {}",
                describe(other)
            )),
        }
    }
}

fn parse_tag_list(value: Option<&Value>, field: &str) -> Result<BTreeSet<String>, String> {
    match value {
        None | Some(Value::Null) => Ok(BTreeSet::new()),
        Some(Value::String(tag)) => Ok(BTreeSet::from([tag.clone()])),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(tag) => Ok(tag.clone()),
                other => Err(format!(
                    "`{field}` entries must be strings, found {}",
                    describe(other)
                )),
            })
            .collect(),
        Some(other) => Err(format!(
            "`{field}` must be a tag or a list of tags, found {}",
            describe(other)
        )),
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}

impl fmt::Display for TagMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.exclude.is_empty() && self.include.len() == 1 {
            if let Some(tag) = self.include.first() {
                return write!(f, "'{tag}'");
            }
        }
        write!(f, "{{include: {}", format_tags(&self.include))?;
        if !self.exclude.is_empty() {
            write!(f, ", exclude: {}", format_tags(&self.exclude))?;
        }
        write!(f, "}}")
    }
}

/// A normalised tag predicate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TagSpec {
    /// One matcher
    Single(TagMatcher),
    /// Any of several matchers (OR)
    Any(Vec<TagMatcher>),
}

impl TagSpec {
    /// Normalise a raw document value
    ///
    /// `null` yields `None`, which matches every tag set.
    pub fn parse(value: &Value, location: &str) -> Result<Option<Self>, ConfigError> {
        if value.is_null() {
            return Ok(None);
        }
        Self::try_from(value.clone())
            .map(Some)
            .map_err(|message| ConfigError::malformed(location, message))
    }

    pub fn matches(&self, tags: &BTreeSet<String>) -> bool {
        match self {
            Self::Single(matcher) => matcher.matches(tags),
            Self::Any(matchers) => matchers.iter().any(|matcher| matcher.matches(tags)),
        }
    }

    /// The matchers making up this spec
    pub fn matchers(&self) -> &[TagMatcher] {
        match self {
            Self::Single(matcher) => std::slice::from_ref(matcher),
            Self::Any(matchers) => matchers,
        }
    }
}

impl From<TagMatcher> for TagSpec {
    fn from(matcher: TagMatcher) -> Self {
        Self::Single(matcher)
    }
}

impl From<&str> for TagSpec {
    fn from(tag: &str) -> Self {
        Self::Single(TagMatcher::tag(tag))
    }
}

impl TryFrom<Value> for TagSpec {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Array(items) => items
                .iter()
                .map(TagMatcher::parse)
                .collect::<Result<Vec<_>, _>>()
                .map(Self::Any),
            other => TagMatcher::parse(&other).map(Self::Single),
        }
    }
}

impl<'de> Deserialize<'de> for TagSpec {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Self::try_from(value).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for TagSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(matcher) => write!(f, "{matcher}"),
            Self::Any(matchers) => {
                let parts: Vec<String> = matchers.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

/// Evaluate an optional spec; an absent spec matches everything
pub fn matches_any(tags: &BTreeSet<String>, spec: Option<&TagSpec>) -> bool {
    spec.is_none_or(|spec| spec.matches(tags))
}

/// Render a tag set the way violation messages quote it
pub fn format_tags(tags: &BTreeSet<String>) -> String {
    let quoted: Vec<String> = tags.iter().map(|tag| format!("'{tag}'")).collect();
    format!("[{}]", quoted.join(", "))
}
