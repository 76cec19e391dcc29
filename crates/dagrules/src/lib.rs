//! # dagrules
//!
//! A policy engine that checks a data pipeline's dependency graph (a dbt
//! manifest) against declarative architectural rules.
//!
//! A rule selects *subjects* by resource type and tags, then requires
//! predicates of them: a name pattern, a tag spec, or a parent/child
//! relationship with cardinality and type/tag constraints.
//!
//! ```
//! use dagrules::{Graph, NodeRecord, PolicyEngine};
//! use serde_json::json;
//!
//! let graph = Graph::new().with_node("model.shop.stg_orders", NodeRecord::new("model", "stg_orders"));
//! let config = json!({
//!     "version": "1",
//!     "rules": [{"name": "staging names", "must": {"match-name": "/stg_.*/"}}],
//! });
//!
//! let report = PolicyEngine::default().evaluate(&config, &graph).unwrap();
//! assert!(report.passed());
//! ```
//!
//! ## Modules
//!
//! - [`tags`]: include/exclude tag predicates
//! - [`graph`]: the graph model and [`GraphIndex`]
//! - [`subject`]: rule subject selection
//! - [`config`]: document validation and compilation
//! - [`predicates`]: the built-in rule checks
//! - [`engine`]: run orchestration
//! - [`report`]: structured results

pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod graph;
pub mod predicates;
pub mod report;
pub mod subject;
pub mod tags;
pub mod violation;

pub use config::{Rule, RuleSet};
pub use engine::{EngineOptions, PolicyEngine};
pub use error::{ConfigError, Error, Result, SchemaScope};
pub use graph::{Graph, GraphIndex, NodeRecord, ResourceType};
pub use predicates::{Cardinality, Predicate, RelationshipOptions};
pub use report::{HumanStyle, PlainStyle, PolicyReport, Reporter, RuleOutcome};
pub use subject::{Relationship, Subject, SubjectMap, SubjectSelector, SubjectSpec};
pub use tags::{TagMatcher, TagSpec};
pub use violation::RuleViolation;
