//! Subject Selection
//!
//! Picks the nodes a rule applies to (by resource type and tag spec) and
//! materializes each one's resolved children and parents, so predicates can
//! inspect relationships without touching the graph again.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_SUBJECT_TYPE;
use crate::graph::{Graph, GraphIndex, NodeRecord, ResourceType};
use crate::tags::{self, TagSpec};

/// Which nodes a rule applies to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectSpec {
    #[serde(rename = "type", default = "default_subject_type")]
    pub node_type: ResourceType,
    #[serde(default)]
    pub tags: Option<TagSpec>,
}

fn default_subject_type() -> ResourceType {
    ResourceType::from(DEFAULT_SUBJECT_TYPE)
}

impl Default for SubjectSpec {
    fn default() -> Self {
        Self {
            node_type: default_subject_type(),
            tags: None,
        }
    }
}

impl SubjectSpec {
    pub fn new(node_type: impl Into<ResourceType>) -> Self {
        Self {
            node_type: node_type.into(),
            tags: None,
        }
    }

    pub fn with_tags(mut self, tags: impl Into<TagSpec>) -> Self {
        self.tags = Some(tags.into());
        self
    }

    /// Whether a record is selected by this spec
    pub fn selects(&self, record: &NodeRecord) -> bool {
        record.resource_type == self.node_type && tags::matches_any(&record.tags, self.tags.as_ref())
    }
}

/// Direction of a dependency edge, seen from the subject
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relationship {
    Child,
    Parent,
}

impl Relationship {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Child => "child",
            Self::Parent => "parent",
        }
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A selected node together with its resolved neighbours
#[derive(Debug, Clone, Serialize)]
pub struct Subject<'a> {
    pub id: &'a str,
    pub record: &'a NodeRecord,
    pub child_params: BTreeMap<&'a str, &'a NodeRecord>,
    pub parent_params: BTreeMap<&'a str, &'a NodeRecord>,
    /// Neighbour ids referenced by an edge but missing from the graph
    pub dangling: BTreeSet<&'a str>,
}

impl<'a> Subject<'a> {
    pub fn name(&self) -> &'a str {
        &self.record.name
    }

    /// Resolved neighbours in the given direction
    pub fn dependencies(&self, relationship: Relationship) -> &BTreeMap<&'a str, &'a NodeRecord> {
        match relationship {
            Relationship::Child => &self.child_params,
            Relationship::Parent => &self.parent_params,
        }
    }

    /// Whether `id` resolved to a placeholder record
    pub fn is_dangling(&self, id: &str) -> bool {
        self.dangling.contains(id)
    }
}

/// Selected subjects keyed by node id
pub type SubjectMap<'a> = BTreeMap<&'a str, Subject<'a>>;

/// Selects rule subjects from an indexed graph
///
/// The index is built once and shared read-only by every selection, so
/// one selector can serve all rules of a run (also across threads).
#[derive(Debug)]
pub struct SubjectSelector<'g> {
    index: GraphIndex<'g>,
}

impl<'g> SubjectSelector<'g> {
    pub fn new(graph: &'g Graph) -> Self {
        Self {
            index: GraphIndex::new(graph),
        }
    }

    pub fn from_index(index: GraphIndex<'g>) -> Self {
        Self { index }
    }

    pub fn index(&self) -> &GraphIndex<'g> {
        &self.index
    }

    pub fn select(&self, spec: &SubjectSpec) -> SubjectMap<'_> {
        self.index
            .nodes()
            .filter(|(_, record)| spec.selects(record))
            .map(|(id, record)| {
                let child_params = self.index.resolve_children(id);
                let parent_params = self.index.resolve_parents(id);
                let dangling = child_params
                    .keys()
                    .chain(parent_params.keys())
                    .copied()
                    .filter(|dependency| !self.index.contains(dependency))
                    .collect();
                let subject = Subject {
                    id,
                    record,
                    child_params,
                    parent_params,
                    dangling,
                };
                (id, subject)
            })
            .collect()
    }

    /// Select by node type and optional tag spec
    pub fn select_by(&self, node_type: &ResourceType, tags: Option<&TagSpec>) -> SubjectMap<'_> {
        self.select(&SubjectSpec {
            node_type: node_type.clone(),
            tags: tags.cloned(),
        })
    }
}
