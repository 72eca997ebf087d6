//! The authoritative node arena.

use std::collections::HashMap;

use super::node::{Node, NodeId, NodeSpec, Payload};

/// Arena holding every data node of the explorer. Top-level nodes are servers; each
/// server subtree belongs to exactly one connection.
#[derive(Debug, Default)]
pub struct DataTree {
    nodes: HashMap<NodeId, Node>,
    roots: Vec<NodeId>,
    next_id: u64,
    selected: Option<NodeId>,
}

impl DataTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Children of `id`, empty when the node is gone.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(&id).map(|node| node.children.as_slice()).unwrap_or_default()
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    pub fn select(&mut self, id: Option<NodeId>) {
        self.selected = id.filter(|id| self.nodes.contains_key(id));
    }

    fn allocate(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    fn insert_node(&mut self, parent: Option<NodeId>, payload: Payload, name: String) -> NodeId {
        let id = self.allocate();
        self.nodes.insert(
            id,
            Node {
                id,
                parent,
                children: Vec::new(),
                payload,
                annotation: None,
                expanded: false,
                name,
            },
        );
        id
    }

    /// Add a top-level node.
    pub fn add_root(&mut self, payload: Payload, name: impl Into<String>) -> NodeId {
        let id = self.insert_node(None, payload, name.into());
        self.roots.push(id);
        id
    }

    /// Top-level node with the given de-duplication name.
    pub fn find_root(&self, name: &str) -> Option<NodeId> {
        self.roots.iter().copied().find(|id| self.nodes[id].name == name)
    }

    /// Append a child; returns `None` when `parent` no longer exists.
    pub fn append(&mut self, parent: NodeId, payload: Payload) -> Option<NodeId> {
        if !self.nodes.contains_key(&parent) {
            return None;
        }
        let id = self.insert_node(Some(parent), payload, String::new());
        if let Some(node) = self.nodes.get_mut(&parent) {
            node.children.push(id);
        }
        Some(id)
    }

    /// Graft detached specs under `parent`, preserving order. Returns the ids of the
    /// direct children created.
    pub fn graft(&mut self, parent: NodeId, specs: Vec<NodeSpec>) -> Vec<NodeId> {
        let mut created = Vec::with_capacity(specs.len());
        for spec in specs {
            let NodeSpec { payload, annotation, expanded, children } = spec;
            let Some(id) = self.append(parent, payload) else {
                break;
            };
            if let Some(node) = self.nodes.get_mut(&id) {
                node.annotation = annotation;
                node.expanded = expanded;
            }
            self.graft(id, children);
            created.push(id);
        }
        created
    }

    /// Drop every descendant of `id`, keeping the node itself.
    pub fn clear_children(&mut self, id: NodeId) {
        let children = match self.nodes.get_mut(&id) {
            Some(node) => std::mem::take(&mut node.children),
            None => return,
        };
        for child in children {
            self.drop_subtree(child);
        }
    }

    /// Remove a node and its subtree.
    pub fn remove(&mut self, id: NodeId) -> bool {
        let Some(node) = self.nodes.get(&id) else {
            return false;
        };
        match node.parent {
            Some(parent) => {
                if let Some(parent) = self.nodes.get_mut(&parent) {
                    parent.children.retain(|child| *child != id);
                }
            }
            None => self.roots.retain(|root| *root != id),
        }
        self.drop_subtree(id);
        true
    }

    fn drop_subtree(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.remove(&current) {
                stack.extend(node.children);
            }
            if self.selected == Some(current) {
                self.selected = None;
            }
        }
    }

    pub fn set_expanded(&mut self, id: NodeId, expanded: bool) -> bool {
        match self.nodes.get_mut(&id) {
            Some(node) => {
                node.expanded = expanded;
                true
            }
            None => false,
        }
    }

    /// Walk up from `id` to its top-level node.
    pub fn root_of(&self, id: NodeId) -> Option<NodeId> {
        let mut current = self.nodes.get(&id)?;
        while let Some(parent) = current.parent {
            current = self.nodes.get(&parent)?;
        }
        Some(current.id)
    }

    /// Strict ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let mut next = self.nodes.get(&id).and_then(|node| node.parent);
        std::iter::from_fn(move || {
            let current = next?;
            next = self.nodes.get(&current).and_then(|node| node.parent);
            Some(current)
        })
    }

    /// Pre-order traversal of every node, in display order.
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        order
    }
}

impl std::ops::Index<NodeId> for DataTree {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        match self.nodes.get(&id) {
            Some(node) => node,
            None => panic!("data node {id} is not part of this tree"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::node::Placeholder;

    fn group(name: &str) -> Payload {
        Payload::Group(crate::tree::GroupKey::Namespace(name.to_string()))
    }

    #[test]
    fn ids_are_never_reused() {
        let mut tree = DataTree::new();
        let root = tree.add_root(Payload::Provider("one".into()), "one");
        let child = tree.append(root, group("a")).expect("root exists");
        tree.clear_children(root);
        let again = tree.append(root, group("a")).expect("root exists");

        assert_ne!(child, again);
        assert!(tree.get(child).is_none());
        assert_eq!(tree.children(root), &[again]);
    }

    #[test]
    fn remove_clears_selection_inside_subtree() {
        let mut tree = DataTree::new();
        let root = tree.add_root(Payload::Provider("one".into()), "one");
        let leaf = tree.append(root, Payload::Placeholder(Placeholder::Refreshing)).unwrap();
        tree.select(Some(leaf));

        assert!(tree.remove(root));
        assert_eq!(tree.selected(), None);
        assert!(tree.roots().is_empty());
        assert!(tree.is_empty());
    }

    #[test]
    fn preorder_follows_child_order() {
        let mut tree = DataTree::new();
        let root = tree.add_root(Payload::Provider("one".into()), "one");
        let a = tree.append(root, group("a")).unwrap();
        let a1 = tree.append(a, group("a1")).unwrap();
        let b = tree.append(root, group("b")).unwrap();

        assert_eq!(tree.preorder(), vec![root, a, a1, b]);
        assert_eq!(tree.ancestors(a1).collect::<Vec<_>>(), vec![a, root]);
        assert_eq!(tree.root_of(a1), Some(root));
    }
}
