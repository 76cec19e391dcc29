//! Tests for subject selection

use crate::test_utils::{ids, model, warehouse_graph};
use dagrules::{Graph, Relationship, ResourceType, SubjectSelector, SubjectSpec, TagMatcher, TagSpec};

#[test]
fn test_default_subject_selects_models() {
    let graph = warehouse_graph();
    let selector = SubjectSelector::new(&graph);
    let subjects = selector.select(&SubjectSpec::default());
    assert_eq!(subjects.len(), 4);
    assert!(subjects.values().all(|subject| subject.record.resource_type == ResourceType::Model));
}

#[test]
fn test_selection_filters_by_type_and_tags() {
    let graph = warehouse_graph();
    let selector = SubjectSelector::new(&graph);

    let staging = selector.select(&SubjectSpec::new("model").with_tags("staging"));
    assert_eq!(ids(&staging), ["model.shop.stg_customers", "model.shop.stg_orders"]);

    let sources = selector.select(&SubjectSpec::new("source"));
    assert_eq!(ids(&sources), ["source.shop.raw.customers", "source.shop.raw.orders"]);

    let not_staging = selector.select_by(
        &ResourceType::Model,
        Some(&TagSpec::from(TagMatcher::default().excluding(["staging"]))),
    );
    assert_eq!(ids(&not_staging), ["model.shop.base_orders", "model.shop.fct_orders"]);
}

#[test]
fn test_subjects_carry_resolved_neighbours() {
    let graph = warehouse_graph();
    let selector = SubjectSelector::new(&graph);
    let subjects = selector.select(&SubjectSpec::new("model").with_tags("base"));
    let base = &subjects["model.shop.base_orders"];

    let parents: Vec<&str> = base.dependencies(Relationship::Parent).keys().copied().collect();
    let children: Vec<&str> = base.dependencies(Relationship::Child).keys().copied().collect();
    assert_eq!(parents, ["model.shop.stg_orders"]);
    assert_eq!(children, ["model.shop.fct_orders"]);
    assert_eq!(base.child_params["model.shop.fct_orders"].name, "fct_orders");
}

#[test]
fn test_selection_is_deterministic() {
    let graph = warehouse_graph();
    let selector = SubjectSelector::new(&graph);
    let spec = SubjectSpec::new("model").with_tags(TagSpec::Any(vec![
        TagMatcher::tag("staging"),
        TagMatcher::tag("mart"),
    ]));
    assert_eq!(ids(&selector.select(&spec)), ids(&selector.select(&spec)));
    assert_eq!(
        ids(&selector.select(&spec)),
        ids(&SubjectSelector::new(&graph).select(&spec))
    );
}

#[test]
fn test_empty_tag_list_selects_nothing() {
    let graph = warehouse_graph();
    let selector = SubjectSelector::new(&graph);
    let subjects = selector.select(&SubjectSpec::new("model").with_tags(TagSpec::Any(vec![])));
    assert!(subjects.is_empty());
}

#[test]
fn test_missing_neighbours_are_marked_dangling() {
    let graph = Graph::new().with_node("model.p.a", model("a", &[], &["source.p.gone"]));
    let selector = SubjectSelector::new(&graph);
    let subjects = selector.select(&SubjectSpec::default());
    let subject = &subjects["model.p.a"];

    assert!(subject.is_dangling("source.p.gone"));
    assert_eq!(
        subject.parent_params["source.p.gone"].resource_type,
        ResourceType::from("unknown")
    );
    assert!(!warehouse_graph_has_dangling());
}

fn warehouse_graph_has_dangling() -> bool {
    let graph = warehouse_graph();
    let selector = SubjectSelector::new(&graph);
    selector
        .select(&SubjectSpec::default())
        .values()
        .any(|subject| !subject.dangling.is_empty())
}
