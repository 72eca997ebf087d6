//! Derives the display view from the data tree.
//!
//! The display tree never owns payloads: each display node points at a data node and
//! carries only what one projection decided (visibility class, tone, expansion). It is
//! thrown away and rebuilt on every filter or structural change.

use crate::perf;

use super::bindings::{DisplayId, NodeBindingTable};
use super::data::DataTree;
use super::fuzzy::Filter;
use super::node::{Node, NodeId};
use super::visibility::{VisibilityClass, classify};

/// Presentation tone of a display node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tone {
    #[default]
    Normal,
    /// On the path to a match
    Muted,
    /// Inside a matched subtree
    Dimmed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NodeStyle {
    pub tone: Tone,
    /// Expand every display ancestor and report the node for scrolling.
    pub ensure_visible: bool,
}

impl NodeStyle {
    /// Default presentation for a visibility class.
    pub fn for_class(class: VisibilityClass) -> Self {
        match class {
            VisibilityClass::Visible => NodeStyle { tone: Tone::Normal, ensure_visible: true },
            VisibilityClass::ChildVisible => NodeStyle { tone: Tone::Muted, ensure_visible: false },
            VisibilityClass::ParentVisible => {
                NodeStyle { tone: Tone::Dimmed, ensure_visible: false }
            }
            VisibilityClass::NotVisible => NodeStyle::default(),
        }
    }
}

/// Default style callback.
pub fn default_style(_node: &Node, class: VisibilityClass) -> NodeStyle {
    NodeStyle::for_class(class)
}

#[derive(Debug, Clone)]
pub struct DisplayNode {
    pub(crate) data: NodeId,
    pub(crate) parent: Option<DisplayId>,
    pub(crate) children: Vec<DisplayId>,
    pub(crate) expanded: bool,
    pub(crate) class: VisibilityClass,
    pub(crate) style: NodeStyle,
}

impl DisplayNode {
    pub fn data(&self) -> NodeId {
        self.data
    }

    pub fn parent(&self) -> Option<DisplayId> {
        self.parent
    }

    pub fn children(&self) -> &[DisplayId] {
        &self.children
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn class(&self) -> VisibilityClass {
        self.class
    }

    pub fn style(&self) -> NodeStyle {
        self.style
    }
}

/// The filtered view rendered by the widget.
#[derive(Debug, Default)]
pub struct DisplayTree {
    epoch: u32,
    nodes: Vec<DisplayNode>,
    roots: Vec<DisplayId>,
}

impl DisplayTree {
    pub fn epoch(&self) -> u32 {
        self.epoch
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn roots(&self) -> &[DisplayId] {
        &self.roots
    }

    pub fn get(&self, id: DisplayId) -> &DisplayNode {
        assert_eq!(id.epoch, self.epoch, "display node {id} belongs to another projection");
        &self.nodes[id.slot()]
    }

    fn get_mut(&mut self, id: DisplayId) -> &mut DisplayNode {
        assert_eq!(id.epoch, self.epoch, "display node {id} belongs to another projection");
        &mut self.nodes[id.slot()]
    }

    /// Every display id in pre-order (creation order).
    pub fn ids(&self) -> impl Iterator<Item = DisplayId> + '_ {
        (0..self.nodes.len()).map(|index| DisplayId { epoch: self.epoch, index: index as u32 })
    }

    /// Epoch-independent structure: depth, data node and expansion in pre-order.
    pub fn shape(&self) -> Vec<(usize, NodeId, bool)> {
        let mut depths = vec![0usize; self.nodes.len()];
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, node)| {
                let depth = node.parent.map(|parent| depths[parent.slot()] + 1).unwrap_or(0);
                depths[index] = depth;
                (depth, node.data, node.expanded)
            })
            .collect()
    }

    fn push(
        &mut self,
        data: NodeId,
        parent: Option<DisplayId>,
        class: VisibilityClass,
    ) -> DisplayId {
        let id = DisplayId { epoch: self.epoch, index: self.nodes.len() as u32 };
        self.nodes.push(DisplayNode {
            data,
            parent,
            children: Vec::new(),
            expanded: false,
            class,
            style: NodeStyle::default(),
        });
        match parent {
            Some(parent) => self.get_mut(parent).children.push(id),
            None => self.roots.push(id),
        }
        id
    }
}

/// Output of one projection.
#[derive(Debug, Default)]
pub struct Projection {
    pub display: DisplayTree,
    pub bindings: NodeBindingTable,
    /// Display node of the selected data node, if it survived.
    pub selected: Option<DisplayId>,
    /// Directly matching nodes to bring into view, in display order.
    pub reveal: Vec<DisplayId>,
    pub filter: Option<Filter>,
}

/// Build a display tree and bindings for `data`. Without a filter this is a verbatim
/// copy and `style` is never called.
pub fn project<F>(data: &DataTree, filter: Option<&Filter>, epoch: u32, mut style: F) -> Projection
where
    F: FnMut(&Node, VisibilityClass) -> NodeStyle,
{
    let visibility = filter.map(|filter| {
        classify(data, |node| !node.payload().is_placeholder() && filter.matches(&node.label()))
    });

    let capacity = visibility.as_ref().map(|map| map.shown()).unwrap_or(data.len());
    let mut display =
        DisplayTree { epoch, nodes: Vec::with_capacity(capacity), roots: Vec::new() };
    let mut bindings = NodeBindingTable::with_capacity(epoch, capacity);
    let mut reveal = Vec::new();

    let mut stack: Vec<(NodeId, Option<DisplayId>)> =
        data.roots().iter().rev().map(|root| (*root, None)).collect();
    while let Some((id, parent)) = stack.pop() {
        let node = &data[id];
        let class = match &visibility {
            Some(map) => map.get(id),
            None => VisibilityClass::Visible,
        };
        // A hidden node cannot have shown descendants.
        if !class.is_shown() {
            continue;
        }

        let display_id = display.push(id, parent, class);
        bindings.bind(id, display_id);

        let node_style =
            if visibility.is_some() { style(node, class) } else { NodeStyle::default() };
        let display_node = display.get_mut(display_id);
        display_node.expanded = node.is_expanded();
        display_node.style = node_style;
        if node_style.ensure_visible {
            reveal.push(display_id);
        }

        stack.extend(node.children().iter().rev().map(|child| (*child, Some(display_id))));
    }

    for id in &reveal {
        let mut parent = display.get(*id).parent;
        while let Some(current) = parent {
            let node = display.get_mut(current);
            node.expanded = true;
            parent = node.parent;
        }
    }

    let selected = data.selected().and_then(|id| bindings.find_display_node(id));
    Projection { display, bindings, selected, reveal, filter: filter.cloned() }
}

/// Owns the current projection and keeps expand/selection state flowing back into the
/// data tree.
#[derive(Debug, Default)]
pub struct TreeProjector {
    epoch: u32,
    current: Projection,
    updating: u32,
}

impl TreeProjector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn projection(&self) -> &Projection {
        &self.current
    }

    pub fn display(&self) -> &DisplayTree {
        &self.current.display
    }

    pub fn bindings(&self) -> &NodeBindingTable {
        &self.current.bindings
    }

    pub fn filter(&self) -> Option<&Filter> {
        self.current.filter.as_ref()
    }

    /// Suppress expand write-back until the matching [`end_update`](Self::end_update).
    pub fn begin_update(&mut self) {
        self.updating += 1;
    }

    pub fn end_update(&mut self) {
        self.updating = self.updating.saturating_sub(1);
    }

    pub fn is_updating(&self) -> bool {
        self.updating > 0
    }

    /// Replace the projection. The selection is carried over by data identity.
    pub fn rebuild<F>(
        &mut self,
        data: &mut DataTree,
        filter: Option<&Filter>,
        style: F,
    ) -> &Projection
    where
        F: FnMut(&Node, VisibilityClass) -> NodeStyle,
    {
        let span = perf::TreeSpan::start("rebuild");
        self.begin_update();

        if let Some(selected) = self.current.selected {
            data.select(Some(self.current.bindings.find_data_node(selected)));
        }

        self.epoch = self.epoch.wrapping_add(1);
        self.current = project(data, filter, self.epoch, style);

        self.end_update();
        if let Some(span) = span {
            span.finish(|| {
                format!(
                    "data={} display={} filter={:?}",
                    data.len(),
                    self.current.display.len(),
                    filter.map(Filter::as_str)
                )
            });
        }
        &self.current
    }

    /// Selection changed in the widget.
    pub fn select(&mut self, display: Option<DisplayId>, data: &mut DataTree) {
        self.current.selected = display;
        data.select(self.current.bindings.resolve(display));
    }

    /// Select by data identity, e.g. a node that is not projected yet.
    pub fn select_data(&mut self, id: Option<NodeId>, data: &mut DataTree) {
        data.select(id);
        self.current.selected =
            data.selected().and_then(|id| self.current.bindings.find_display_node(id));
    }

    /// Expand/collapse happened in the widget. Written back to the data node unless an
    /// update is in progress; returns whether the data tree changed.
    pub fn record_expansion(
        &mut self,
        display: DisplayId,
        expanded: bool,
        data: &mut DataTree,
    ) -> bool {
        if self.is_updating() {
            log::debug!("Ignoring expansion of {display} during tree update");
            return false;
        }
        let id = self.current.bindings.find_data_node(display);
        self.current.display.get_mut(display).expanded = expanded;
        data.set_expanded(id, expanded)
    }
}
