//! Per-node visibility classes for a filtered projection.

use std::collections::HashMap;

use super::data::DataTree;
use super::node::{Node, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisibilityClass {
    /// Matches the filter directly
    Visible,
    /// Kept because a descendant is visible
    ChildVisible,
    /// Kept because an ancestor is visible
    ParentVisible,
    /// Excluded from the projection
    NotVisible,
}

impl VisibilityClass {
    pub fn is_shown(self) -> bool {
        self != VisibilityClass::NotVisible
    }
}

/// Visibility of every node in a tree; absent nodes are `NotVisible`.
#[derive(Debug, Default)]
pub struct VisibilityMap {
    classes: HashMap<NodeId, VisibilityClass>,
}

impl VisibilityMap {
    pub fn get(&self, id: NodeId) -> VisibilityClass {
        self.classes.get(&id).copied().unwrap_or(VisibilityClass::NotVisible)
    }

    /// Number of nodes that stay in the projection.
    pub fn shown(&self) -> usize {
        self.classes.values().filter(|class| class.is_shown()).count()
    }

    pub fn count(&self, class: VisibilityClass) -> usize {
        self.classes.values().filter(|value| **value == class).count()
    }
}

/// Classify every node of `tree`. A node is `Visible` when `is_direct_match` accepts
/// it, `ChildVisible` when a strict descendant is visible, `ParentVisible` when a strict
/// ancestor is visible, and `NotVisible` otherwise, in that order of precedence.
pub fn classify<F>(tree: &DataTree, mut is_direct_match: F) -> VisibilityMap
where
    F: FnMut(&Node) -> bool,
{
    let order = tree.preorder();
    let mut direct: HashMap<NodeId, bool> = HashMap::with_capacity(order.len());
    for id in &order {
        direct.insert(*id, is_direct_match(&tree[*id]));
    }

    // Reverse pre-order visits children before parents.
    let mut has_visible_descendant: HashMap<NodeId, bool> = HashMap::with_capacity(order.len());
    for id in order.iter().rev() {
        let below = tree
            .children(*id)
            .iter()
            .any(|child| direct[child] || has_visible_descendant[child]);
        has_visible_descendant.insert(*id, below);
    }

    let mut under_visible: HashMap<NodeId, bool> = HashMap::with_capacity(order.len());
    let mut classes = HashMap::with_capacity(order.len());
    for id in &order {
        let inherited = match tree[*id].parent {
            Some(parent) => direct[&parent] || under_visible[&parent],
            None => false,
        };
        under_visible.insert(*id, inherited);

        let class = if direct[id] {
            VisibilityClass::Visible
        } else if has_visible_descendant[id] {
            VisibilityClass::ChildVisible
        } else if inherited {
            VisibilityClass::ParentVisible
        } else {
            VisibilityClass::NotVisible
        };
        classes.insert(*id, class);
    }

    VisibilityMap { classes }
}
