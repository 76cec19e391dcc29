//! Input loading
//!
//! Reads the rule document (YAML) and the dbt manifest (JSON) into the
//! in-memory structures the engine consumes.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use dagrules::Graph;
use serde_json::Value;
use tracing::debug;

/// Read a `dagrules.yml` document
pub fn load_rules(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read rules file {}", path.display()))?;
    let rules = parse_rules(&content)
        .with_context(|| format!("Failed to parse rules file {}", path.display()))?;
    debug!(path = %path.display(), "Loaded rule document");
    Ok(rules)
}

/// Parse a YAML rule document into a JSON value
pub fn parse_rules(content: &str) -> Result<Value, serde_yaml::Error> {
    serde_yaml::from_str(content)
}

/// Read a compiled dbt `manifest.json`
pub fn load_manifest(path: &Path) -> Result<Graph> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open manifest {}", path.display()))?;
    let graph: Graph = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse manifest {}", path.display()))?;
    debug!(
        path = %path.display(),
        nodes = graph.nodes.len(),
        sources = graph.sources.len(),
        "Loaded manifest"
    );
    Ok(graph)
}
