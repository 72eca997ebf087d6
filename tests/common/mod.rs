//! Common test utilities for integration tests.
//!
//! Everything runs in-process: providers are snapshot providers over fixture
//! documents and the widget is the text renderer.

#![allow(dead_code)]

pub mod fixtures;

use std::time::Duration;

use schemascope::explorer::{ExplorerController, TabLog};
use schemascope::models::EntitySet;
use schemascope::state::ExplorerSettings;
use schemascope::tree::grouping;
use schemascope::tree::{DataTree, GroupingMode, NodeId, Payload};
use schemascope::widget::TextTreeWidget;

pub type TestExplorer = ExplorerController<TextTreeWidget, TabLog>;

pub const REFRESH_TIMEOUT: Duration = Duration::from_secs(10);

pub fn explorer() -> TestExplorer {
    explorer_with(GroupingMode::ByNamespace)
}

pub fn explorer_with(grouping_mode: GroupingMode) -> TestExplorer {
    let settings = ExplorerSettings { grouping_mode, ..ExplorerSettings::default() };
    ExplorerController::new(TextTreeWidget::new(), TabLog::new(), &settings)
        .expect("failed to create explorer")
}

/// A data tree with one server node holding `entities` grouped by `mode`.
pub fn server_tree(entities: &EntitySet, mode: GroupingMode) -> (DataTree, NodeId) {
    let mut tree = DataTree::new();
    let root = tree.add_root(Payload::Provider("server".into()), "server");
    tree.graft(root, grouping::build(entities, mode));
    (tree, root)
}

/// Data node whose label is `label`, searching in pre-order.
pub fn find_node(tree: &DataTree, label: &str) -> NodeId {
    tree.preorder()
        .into_iter()
        .find(|id| tree[*id].label() == label)
        .unwrap_or_else(|| panic!("no node labelled {label:?}"))
}

pub fn child_labels(tree: &DataTree, id: NodeId) -> Vec<String> {
    tree.children(id).iter().map(|child| tree[*child].label()).collect()
}

/// Full names of every entity node under `id`, in pre-order.
pub fn entities_under(tree: &DataTree, id: NodeId) -> Vec<String> {
    let mut names = Vec::new();
    let mut stack: Vec<NodeId> = tree.children(id).iter().rev().copied().collect();
    while let Some(current) = stack.pop() {
        if let Some(entity) = tree[current].payload().as_entity() {
            names.push(entity.full_name.clone());
        }
        stack.extend(tree.children(current).iter().rev().copied());
    }
    names
}
