//! Tests for the built-in rule predicates

use std::collections::BTreeMap;

use crate::test_utils::{model, tags, warehouse_graph};
use dagrules::predicates::{NamePattern, have_relationship, have_tags_any, match_name};
use dagrules::{
    Graph, NodeRecord, Relationship, RelationshipOptions, RuleViolation, SubjectSelector,
    SubjectSpec, TagSpec,
};

/// A snapshot whose children are the given (id, tags) models
fn snapshot_with_children(children: &[(&str, &[&str])]) -> Graph {
    children.iter().fold(
        Graph::new().with_node("snapshot.p.snap", NodeRecord::new("snapshot", "snap")),
        |graph, (id, child_tags)| {
            graph.with_node(*id, model(id, child_tags, &["snapshot.p.snap"]))
        },
    )
}

fn check_snapshots(graph: &Graph, options: &RelationshipOptions) -> Vec<RuleViolation> {
    let selector = SubjectSelector::new(graph);
    let subjects = selector.select(&SubjectSpec::new("snapshot"));
    have_relationship(&subjects, Relationship::Child, options)
}

#[test]
fn test_one_to_one_with_single_base_child_passes() {
    let graph = snapshot_with_children(&[("model.p.base_a", &["base"])]);
    let options = RelationshipOptions::default().one_to_one().require_tags_any("base");
    assert!(check_snapshots(&graph, &options).is_empty());
}

#[test]
fn test_one_to_one_with_two_children_fails_on_cardinality() {
    let graph = snapshot_with_children(&[
        ("model.p.base_a", &["base"]),
        ("model.p.base_b", &["base"]),
    ]);
    let options = RelationshipOptions::default().one_to_one().require_tags_any("base");
    assert_eq!(
        check_snapshots(&graph, &options),
        [RuleViolation::CardinalityExceeded {
            node_id: "snapshot.p.snap".to_string(),
            relationship: Relationship::Child,
            found: 2,
        }]
    );
}

#[test]
fn test_required_relationship_missing() {
    let graph = snapshot_with_children(&[]);
    let violations = check_snapshots(&graph, &RelationshipOptions::default());
    assert_eq!(violations.len(), 1);
    assert_eq!(
        violations[0].to_string(),
        "child relationship required, not found for node \"snapshot.p.snap\""
    );

    assert!(check_snapshots(&graph, &RelationshipOptions::default().optional()).is_empty());
}

#[test]
fn test_select_filters_narrow_dependencies() {
    let graph = snapshot_with_children(&[
        ("model.p.base_a", &["base"]),
        ("model.p.audit", &["audit"]),
    ]);
    let options = RelationshipOptions::default()
        .one_to_one()
        .select_tags_any(TagSpec::from(dagrules::TagMatcher::default().excluding(["audit"])))
        .require_tags_any("base");
    assert!(check_snapshots(&graph, &options).is_empty());

    let by_type = RelationshipOptions::default().select_node_type("seed");
    assert!(matches!(
        check_snapshots(&graph, &by_type)[..],
        [RuleViolation::RelationshipNotFound { .. }]
    ));
}

#[test]
fn test_all_violations_of_a_subject_are_collected() {
    let graph = snapshot_with_children(&[
        ("model.p.a", &["staging"]),
        ("model.p.b", &["base"]),
    ]);
    let options = RelationshipOptions::default()
        .one_to_one()
        .require_tags_any("base")
        .require_node_type("snapshot");
    let violations = check_snapshots(&graph, &options);
    let codes: Vec<&str> = violations.iter().map(RuleViolation::code).collect();
    assert_eq!(codes, ["DAG004", "DAG005", "DAG006", "DAG006"]);
}

#[test]
fn test_dependency_tags_message_names_dependency() {
    let graph = snapshot_with_children(&[("model.p.a", &["staging"])]);
    let options = RelationshipOptions::default().require_tags_any("base");
    let violations = check_snapshots(&graph, &options);
    assert_eq!(
        violations[0].to_string(),
        "Expecting all child relations of \"snapshot.p.snap\" to have tags 'base', \
         however child \"model.p.a\" had tags ['staging']"
    );
}

#[test]
fn test_dangling_child_is_no_relationship() {
    let graph = Graph::new()
        .with_node("snapshot.p.snap", NodeRecord::new("snapshot", "snap"))
        .with_child_map(BTreeMap::from([(
            "snapshot.p.snap".to_string(),
            vec!["model.p.missing".to_string()],
        )]));

    assert_eq!(
        check_snapshots(&graph, &RelationshipOptions::default()),
        [RuleViolation::RelationshipNotFound {
            node_id: "snapshot.p.snap".to_string(),
            relationship: Relationship::Child,
        }]
    );
    assert!(check_snapshots(&graph, &RelationshipOptions::default().optional()).is_empty());
}

#[test]
fn test_dangling_child_does_not_count_toward_cardinality() {
    let graph = Graph::new()
        .with_node("snapshot.p.snap", NodeRecord::new("snapshot", "snap"))
        .with_node("model.p.base_a", model("base_a", &["base"], &["snapshot.p.snap"]))
        .with_child_map(BTreeMap::from([(
            "snapshot.p.snap".to_string(),
            vec!["model.p.base_a".to_string(), "model.p.gone".to_string()],
        )]));
    let options = RelationshipOptions::default().one_to_one();
    assert!(check_snapshots(&graph, &options).is_empty());
}

#[test]
fn test_dangling_parent_fails_type_requirement() {
    let graph = Graph::new().with_node("model.p.a", model("a", &[], &["source.p.gone"]));
    let selector = SubjectSelector::new(&graph);
    let subjects = selector.select(&SubjectSpec::default());

    let options = RelationshipOptions::default().require_node_type("source");
    let violations = have_relationship(&subjects, Relationship::Parent, &options);
    let codes: Vec<&str> = violations.iter().map(RuleViolation::code).collect();
    assert_eq!(codes, ["DAG003", "DAG006"]);
    assert!(violations[1].to_string().ends_with("had type \"unknown\""));

    let selected = RelationshipOptions::default().select_node_type("source");
    let violations = have_relationship(&subjects, Relationship::Parent, &selected);
    assert!(matches!(violations[..], [RuleViolation::RelationshipNotFound { .. }]));
}

#[test]
fn test_match_name_reports_every_mismatch() {
    let graph = Graph::new()
        .with_node("model.p.stg_a", model("stg_a", &[], &[]))
        .with_node("model.p.base_b", model("base_b", &[], &[]))
        .with_node("model.p.fct_c", model("fct_c", &[], &[]));
    let selector = SubjectSelector::new(&graph);
    let subjects = selector.select(&SubjectSpec::default());
    let pattern = NamePattern::parse("staging", "/stg_.*/").unwrap();

    let violations = match_name(&subjects, &pattern);
    assert_eq!(violations.len(), 2);
    assert_eq!(
        violations[0].to_string(),
        "For node \"model.p.base_b\", \"base_b\" does not match pattern /stg_.*/"
    );
    assert_eq!(violations[1].node_id(), "model.p.fct_c");
}

#[test]
fn test_have_tags_any() {
    let graph = warehouse_graph();
    let selector = SubjectSelector::new(&graph);
    let subjects = selector.select(&SubjectSpec::default());
    let spec = TagSpec::Any(vec![
        dagrules::TagMatcher::tag("staging"),
        dagrules::TagMatcher::tag("base"),
    ]);

    let violations = have_tags_any(&subjects, Some(&spec));
    assert_eq!(violations.len(), 1);
    assert_eq!(
        violations[0],
        RuleViolation::TagsMismatch {
            node_id: "model.shop.fct_orders".to_string(),
            tags: tags(&["fact", "mart"]),
            expected: Some(spec.clone()),
        }
    );
    assert!(have_tags_any(&subjects, None).is_empty());
}
