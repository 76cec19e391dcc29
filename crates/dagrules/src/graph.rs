//! Dependency Graph
//!
//! The materialized graph handed to the engine (a dbt `manifest.json`
//! subset) and [`GraphIndex`], which flattens its node collections into a
//! single id → record map and resolves parent/child edges.
//!
//! Lookups are total: an id referenced by an edge but absent from the graph
//! resolves to a placeholder record instead of failing, so dangling edges
//! surface as rule violations rather than engine errors.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::constants::UNKNOWN_RESOURCE_TYPE;

/// Kind of node in the graph
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ResourceType {
    Model,
    Snapshot,
    Source,
    /// Any other dbt resource type (`test`, `seed`, `exposure`, ...)
    Other(String),
}

impl ResourceType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Model => "model",
            Self::Snapshot => "snapshot",
            Self::Source => "source",
            Self::Other(name) => name,
        }
    }
}

impl From<&str> for ResourceType {
    fn from(name: &str) -> Self {
        match name {
            "model" => Self::Model,
            "snapshot" => Self::Snapshot,
            "source" => Self::Source,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for ResourceType {
    fn from(name: String) -> Self {
        match name.as_str() {
            "model" | "snapshot" | "source" => Self::from(name.as_str()),
            _ => Self::Other(name),
        }
    }
}

impl From<ResourceType> for String {
    fn from(resource_type: ResourceType) -> Self {
        match resource_type {
            ResourceType::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Upstream references of a node
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependsOn {
    #[serde(default)]
    pub nodes: Vec<String>,
}

/// One node of the graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub resource_type: ResourceType,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub depends_on: DependsOn,
}

impl NodeRecord {
    pub fn new(resource_type: impl Into<ResourceType>, name: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            name: name.into(),
            tags: BTreeSet::new(),
            depends_on: DependsOn::default(),
        }
    }

    /// Record standing in for an id that is referenced but not in the graph
    pub fn placeholder() -> Self {
        Self::new(ResourceType::Other(UNKNOWN_RESOURCE_TYPE.to_string()), "")
    }

    pub fn with_tags<I>(mut self, tags: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn with_parents<I>(mut self, parents: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.depends_on
            .nodes
            .extend(parents.into_iter().map(Into::into));
        self
    }

    /// Ids this node depends on, in declared order
    pub fn parent_ids(&self) -> &[String] {
        &self.depends_on.nodes
    }
}

/// A materialized dependency graph
///
/// Unknown manifest fields are ignored on deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Graph {
    pub nodes: BTreeMap<String, NodeRecord>,
    #[serde(default)]
    pub sources: BTreeMap<String, NodeRecord>,
    /// Precomputed id → children map; derived from `depends_on` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_map: Option<BTreeMap<String, Vec<String>>>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_node(mut self, id: impl Into<String>, record: NodeRecord) -> Self {
        self.nodes.insert(id.into(), record);
        self
    }

    pub fn with_source(mut self, id: impl Into<String>, record: NodeRecord) -> Self {
        self.sources.insert(id.into(), record);
        self
    }

    pub fn with_child_map(mut self, child_map: BTreeMap<String, Vec<String>>) -> Self {
        self.child_map = Some(child_map);
        self
    }

    /// Merge all node collections into one id → record map
    ///
    /// Sources are merged first, so a general node with the same id wins.
    pub fn flatten(&self) -> BTreeMap<&str, &NodeRecord> {
        self.sources
            .iter()
            .chain(self.nodes.iter())
            .map(|(id, record)| (id.as_str(), record))
            .collect()
    }
}

/// Read-only index over a [`Graph`]
#[derive(Debug)]
pub struct GraphIndex<'g> {
    nodes: BTreeMap<&'g str, &'g NodeRecord>,
    children: BTreeMap<&'g str, Vec<&'g str>>,
    placeholder: NodeRecord,
}

impl<'g> GraphIndex<'g> {
    pub fn new(graph: &'g Graph) -> Self {
        let nodes = graph.flatten();
        let children = match &graph.child_map {
            Some(child_map) => child_map
                .iter()
                .map(|(id, children)| {
                    (id.as_str(), children.iter().map(String::as_str).collect())
                })
                .collect(),
            None => invert_parents(&nodes),
        };
        Self {
            nodes,
            children,
            placeholder: NodeRecord::placeholder(),
        }
    }

    /// All records, keyed by id
    pub fn nodes(&self) -> impl Iterator<Item = (&'g str, &'g NodeRecord)> + '_ {
        self.nodes.iter().map(|(id, record)| (*id, *record))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Look up a record, falling back to the placeholder for unknown ids
    pub fn get(&self, id: &str) -> &NodeRecord {
        match self.nodes.get(id) {
            Some(record) => *record,
            None => {
                trace!(node_id = id, "dangling reference resolved to placeholder");
                &self.placeholder
            }
        }
    }

    /// Child ids of a node, in child-map order
    pub fn children_of(&self, id: &str) -> &[&'g str] {
        self.children
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Parent ids of a node, in `depends_on` order
    pub fn parents_of(&self, id: &str) -> &'g [String] {
        self.nodes
            .get(id)
            .copied()
            .map(NodeRecord::parent_ids)
            .unwrap_or_default()
    }

    /// Children of a node with their full records
    pub fn resolve_children(&self, id: &str) -> BTreeMap<&'g str, &NodeRecord> {
        self.children_of(id)
            .iter()
            .map(|child| (*child, self.get(child)))
            .collect()
    }

    /// Parents of a node with their full records
    pub fn resolve_parents(&self, id: &str) -> BTreeMap<&'g str, &NodeRecord> {
        self.parents_of(id)
            .iter()
            .map(|parent| (parent.as_str(), self.get(parent)))
            .collect()
    }
}

fn invert_parents<'g>(
    nodes: &BTreeMap<&'g str, &'g NodeRecord>,
) -> BTreeMap<&'g str, Vec<&'g str>> {
    let mut children: BTreeMap<&'g str, Vec<&'g str>> = BTreeMap::new();
    for (&id, &record) in nodes {
        for parent in record.parent_ids() {
            children.entry(parent.as_str()).or_default().push(id);
        }
    }
    children
}
