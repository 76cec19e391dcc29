//! Compiled rule document
//!
//! [`RuleSet::compile`] turns a structurally valid document into typed
//! rules: tag specs normalised, name patterns compiled, relationship
//! options parsed. Every configuration error surfaces here, before any
//! rule is evaluated.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use super::schema;
use crate::constants::{
    CONFIG_VERSION, HAVE_CHILD_RELATIONSHIP, HAVE_PARENT_RELATIONSHIP, HAVE_TAGS_ANY, MATCH_NAME,
};
use crate::error::ConfigError;
use crate::graph::ResourceType;
use crate::predicates::{NamePattern, Predicate, RelationshipCheck, RelationshipOptions};
use crate::subject::{Relationship, SubjectSpec};
use crate::tags::TagSpec;

/// A rule ready for evaluation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rule {
    pub name: String,
    pub subject: SubjectSpec,
    /// Predicates in evaluation order
    pub must: Vec<Predicate>,
}

impl Rule {
    pub fn new(name: impl Into<String>, subject: SubjectSpec) -> Self {
        Self {
            name: name.into(),
            subject,
            must: Vec::new(),
        }
    }

    pub fn with_predicate(mut self, predicate: Predicate) -> Self {
        self.must.push(predicate);
        self
    }

    fn compile(name: &str, rule: &Map<String, Value>) -> Result<Self, ConfigError> {
        let subject = match rule.get("subject") {
            None | Some(Value::Null) => SubjectSpec::default(),
            Some(subject) => compile_subject(name, subject)?,
        };
        let must = match rule.get("must") {
            Some(Value::Object(must)) => compile_must(name, must)?,
            _ => Vec::new(),
        };
        Ok(Self {
            name: name.to_string(),
            subject,
            must,
        })
    }
}

/// A compiled rule document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleSet {
    /// Declared document version, as written
    pub version: String,
    pub rules: Vec<Rule>,
}

impl RuleSet {
    /// Validate and compile a rule document
    pub fn compile(config: &Value) -> Result<Self, ConfigError> {
        schema::validate(config)?;

        let version = match config.get("version") {
            Some(Value::String(version)) => version.clone(),
            Some(Value::Number(version)) => version.to_string(),
            _ => {
                return Err(ConfigError::malformed(
                    "version",
                    "expected a string or a number",
                ));
            }
        };

        let rules = config
            .get("rules")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .filter_map(|rule| Some((rule.get("name")?.as_str()?, rule.as_object()?)))
            .map(|(name, rule)| Rule::compile(name, rule))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(version = %version, rules = rules.len(), "compiled rule document");
        Ok(Self { version, rules })
    }

    /// The document must declare version `1`
    pub fn check_version(&self) -> Result<(), ConfigError> {
        if self.version == CONFIG_VERSION {
            Ok(())
        } else {
            Err(ConfigError::UnsupportedVersion {
                found: self.version.clone(),
            })
        }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

fn compile_subject(rule: &str, subject: &Value) -> Result<SubjectSpec, ConfigError> {
    let location = format!("subject of rule \"{rule}\"");
    let node_type = match subject.get("type") {
        None | Some(Value::Null) => SubjectSpec::default().node_type,
        Some(Value::String(node_type)) => ResourceType::from(node_type.as_str()),
        Some(_) => {
            return Err(ConfigError::malformed(location, "`type` must be a string"));
        }
    };
    let tags = match subject.get("tags") {
        Some(tags) => TagSpec::parse(tags, &location)?,
        None => None,
    };
    Ok(SubjectSpec { node_type, tags })
}

fn compile_must(rule: &str, must: &Map<String, Value>) -> Result<Vec<Predicate>, ConfigError> {
    let mut predicates = Vec::with_capacity(must.len());

    if let Some(pattern) = must.get(MATCH_NAME) {
        let pattern = pattern.as_str().ok_or_else(|| {
            ConfigError::malformed(
                format!("{MATCH_NAME} of rule \"{rule}\""),
                "expected a /<regex>/ pattern string",
            )
        })?;
        predicates.push(Predicate::MatchName {
            pattern: NamePattern::parse(rule, pattern)?,
        });
    }

    if let Some(tags) = must.get(HAVE_TAGS_ANY) {
        let location = format!("{HAVE_TAGS_ANY} of rule \"{rule}\"");
        predicates.push(Predicate::HaveTagsAny {
            tags: TagSpec::parse(tags, &location)?,
        });
    }

    for (key, relationship) in [
        (HAVE_CHILD_RELATIONSHIP, Relationship::Child),
        (HAVE_PARENT_RELATIONSHIP, Relationship::Parent),
    ] {
        if let Some(options) = must.get(key) {
            let options = RelationshipOptions::parse(rule, key, options)?;
            predicates.push(Predicate::HaveRelationship(RelationshipCheck::new(
                relationship,
                options,
            )));
        }
    }

    Ok(predicates)
}
