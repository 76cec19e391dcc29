//! Error handling types
//!
//! Two disjoint families: [`ConfigError`] says the rule document itself is
//! malformed and always aborts the run before any rule is evaluated;
//! [`Error::RulesFailed`] is the aggregate raised after every rule has been
//! attempted and at least one of them found violations in the graph.

use std::collections::BTreeSet;
use std::fmt;

use thiserror::Error;

use crate::report::RuleOutcome;

/// Result type alias for policy engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error of a dagrules run
#[derive(Error, Debug)]
pub enum Error {
    /// The rule document is malformed
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// At least one rule found violations in the graph
    #[error("There were dagrules rule errors: {}", failed_summary(.failed, .total))]
    RulesFailed {
        /// Every failing rule with its violations, in declaration order
        failed: Vec<RuleOutcome>,
        /// Number of rules that were evaluated
        total: usize,
    },
}

impl Error {
    /// Returns the configuration error, if this is one
    pub fn as_config(&self) -> Option<&ConfigError> {
        match self {
            Self::Config(err) => Some(err),
            Self::RulesFailed { .. } => None,
        }
    }

    /// Whether this error reports graph violations rather than a bad document
    pub fn is_rule_failure(&self) -> bool {
        matches!(self, Self::RulesFailed { .. })
    }
}

fn failed_summary(failed: &[RuleOutcome], total: &usize) -> String {
    let names: Vec<String> = failed
        .iter()
        .map(|outcome| format!("\"{}\"", outcome.name))
        .collect();
    format!("{} of {total} rules failed ({})", failed.len(), names.join(", "))
}

/// Where in the rule document a schema error was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaScope {
    /// The document root (`version`, `rules`)
    Root,
    /// A rule that has no usable name yet, identified by position
    RuleAt { index: usize },
    /// A named rule
    Rule { name: String },
    /// The `subject` block of a rule
    Subject { rule: String },
    /// The `must` block of a rule
    Must { rule: String },
}

impl fmt::Display for SchemaScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root => write!(f, "dagrules config"),
            Self::RuleAt { index } => write!(f, "rule at index {index}"),
            Self::Rule { name } => write!(f, "rule \"{name}\""),
            Self::Subject { rule } => write!(f, "subject of rule \"{rule}\""),
            Self::Must { rule } => write!(f, "must of rule \"{rule}\""),
        }
    }
}

/// The rule document is malformed
///
/// Every variant identifies the exact offending keys or values so the
/// operator can fix the document without guessing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Keys that are not allowed at this level of the document
    #[error("Unknown parameters for {scope}: {}", format_keys(.keys))]
    AllowedKey {
        scope: SchemaScope,
        keys: BTreeSet<String>,
    },

    /// Keys that are required at this level but missing
    #[error("Required parameters not found for {scope}: {}", format_keys(.keys))]
    RequiredKey {
        scope: SchemaScope,
        keys: BTreeSet<String>,
    },

    /// A `match-name` pattern that is not of the `/<regex>/` form
    #[error("Unsupported matcher {pattern:?} in rule \"{rule}\": only /<regex>/ patterns are supported")]
    UnsupportedMatcher { rule: String, pattern: String },

    /// A `/<regex>/` pattern whose regex does not compile
    #[error("Invalid pattern {pattern:?} in rule \"{rule}\": {message}")]
    InvalidPattern {
        rule: String,
        pattern: String,
        message: String,
    },

    /// Options a relationship predicate does not understand
    #[error("Unknown argument to {predicate} in rule \"{rule}\": {}", format_keys(.keys))]
    UnknownPredicateOption {
        rule: String,
        predicate: String,
        keys: BTreeSet<String>,
    },

    /// The document declares a version this engine does not implement
    #[error("dagrules.yml config version must be '1', found {found:?}")]
    UnsupportedVersion { found: String },

    /// A value has the wrong shape (e.g. `rules` is not a list)
    #[error("Malformed {location}: {message}")]
    Malformed { location: String, message: String },
}

impl ConfigError {
    /// Create an allowed-key error from any collection of key names
    pub fn allowed_keys<I, S>(scope: SchemaScope, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::AllowedKey {
            scope,
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    /// Create a required-key error from any collection of key names
    pub fn required_keys<I, S>(scope: SchemaScope, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::RequiredKey {
            scope,
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    /// Create a malformed-value error
    pub fn malformed(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Malformed {
            location: location.into(),
            message: message.into(),
        }
    }

    /// The offending key set, for the key-level variants
    pub fn keys(&self) -> Option<&BTreeSet<String>> {
        match self {
            Self::AllowedKey { keys, .. }
            | Self::RequiredKey { keys, .. }
            | Self::UnknownPredicateOption { keys, .. } => Some(keys),
            _ => None,
        }
    }
}

fn format_keys(keys: &BTreeSet<String>) -> String {
    let quoted: Vec<String> = keys.iter().map(|key| format!("'{key}'")).collect();
    format!("{{{}}}", quoted.join(", "))
}
