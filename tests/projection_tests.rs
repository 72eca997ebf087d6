//! Integration tests for filtered projection of the data tree.

mod common;

use common::fixtures::{orion_entities, scenario_set};
use common::{find_node, server_tree};
use schemascope::models::EntitySet;
use schemascope::tree::projector::project;
use schemascope::tree::visibility::classify;
use schemascope::tree::{Filter, GroupingMode, Tone, TreeProjector, VisibilityClass, default_style};

// =============================================================================
// Classification
// =============================================================================

#[test]
fn test_all_matching_predicate_shows_everything() {
    let set: EntitySet = orion_entities().into_iter().collect();
    let (tree, _) = server_tree(&set, GroupingMode::ByHierarchy);

    let map = classify(&tree, |_| true);
    assert_eq!(map.count(VisibilityClass::Visible), tree.len());
    assert_eq!(map.shown(), tree.len());

    let projection = project(&tree, None, 1, default_style);
    let projected: Vec<_> = projection.display.shape().into_iter().map(|(_, id, _)| id).collect();
    assert_eq!(projected, tree.preorder());
    assert!(projection.reveal.is_empty());
}

#[test]
fn test_filter_scenario_classifies_ancestors_and_excludes_unrelated() {
    let (mut tree, _) = server_tree(&scenario_set(), GroupingMode::ByHierarchy);
    let a = find_node(&tree, "A (1 derived entity)");
    let b = find_node(&tree, "B");
    let c = find_node(&tree, "C");

    let filter = Filter::parse(Some("B"));
    let mut projector = TreeProjector::new();
    let projection = projector.rebuild(&mut tree, filter.as_ref(), default_style);

    let class_of = |id| {
        let display = projection.bindings.find_display_node(id)?;
        Some(projection.display.get(display).class())
    };
    assert_eq!(class_of(b), Some(VisibilityClass::Visible));
    assert_eq!(class_of(a), Some(VisibilityClass::ChildVisible));
    assert_eq!(class_of(c), None);
    assert_eq!(projection.display.len(), 3);
}

// =============================================================================
// Stability across rebuilds
// =============================================================================

#[test]
fn test_rebuild_is_idempotent_and_keeps_state() {
    let set: EntitySet = orion_entities().into_iter().collect();
    let (mut tree, root) = server_tree(&set, GroupingMode::ByNamespace);
    let group = find_node(&tree, "Orion (4 items)");
    let nodes = find_node(&tree, "Orion.Nodes");

    let mut projector = TreeProjector::new();
    projector.rebuild(&mut tree, None, default_style);
    let group_display = projector.bindings().find_display_node(group).expect("group shown");
    let root_display = projector.bindings().find_display_node(root).expect("root shown");
    assert!(projector.record_expansion(root_display, true, &mut tree));
    assert!(projector.record_expansion(group_display, true, &mut tree));
    let selected = projector.bindings().find_display_node(nodes);
    projector.select(selected, &mut tree);

    let filter = Filter::parse(Some("Nod"));
    let first = projector.rebuild(&mut tree, filter.as_ref(), default_style).display.shape();
    let second = projector.rebuild(&mut tree, filter.as_ref(), default_style).display.shape();
    assert_eq!(first, second);

    let cleared = projector.rebuild(&mut tree, None, default_style);
    let selected = cleared.selected.expect("selection survives");
    assert_eq!(cleared.bindings.find_data_node(selected), nodes);
    let group_display = cleared.bindings.find_display_node(group).expect("group shown");
    assert!(cleared.display.get(group_display).is_expanded());
    assert!(tree[group].is_expanded());
}

#[test]
fn test_filter_reveal_does_not_expand_data_nodes() {
    let set: EntitySet = orion_entities().into_iter().collect();
    let (mut tree, root) = server_tree(&set, GroupingMode::ByNamespace);
    let unmanage = find_node(&tree, "Unmanage");

    let mut projector = TreeProjector::new();
    let filter = Filter::parse(Some("Unman"));
    let projection = projector.rebuild(&mut tree, filter.as_ref(), default_style);

    let display = projection.bindings.find_display_node(unmanage).expect("match shown");
    assert_eq!(projection.reveal, vec![display]);
    let root_display = projection.bindings.find_display_node(root).expect("root shown");
    assert!(projection.display.get(root_display).is_expanded());
    assert_eq!(projection.display.get(root_display).style().tone, Tone::Muted);
    // the match's own placeholder child is kept, dimmed
    let placeholder = projection.display.get(display).children()[0];
    assert_eq!(projection.display.get(placeholder).class(), VisibilityClass::ParentVisible);
    assert!(!tree[root].is_expanded());
}

#[test]
#[should_panic(expected = "belongs to another projection")]
fn test_stale_display_ids_are_rejected() {
    let (mut tree, root) = server_tree(&scenario_set(), GroupingMode::Flat);
    let mut projector = TreeProjector::new();
    projector.rebuild(&mut tree, None, default_style);
    let stale = projector.bindings().find_display_node(root).expect("root shown");

    projector.rebuild(&mut tree, None, default_style);
    projector.bindings().find_data_node(stale);
}
