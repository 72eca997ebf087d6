//! Data ↔ display identity map for one projection.

use std::collections::HashMap;
use std::fmt;

use super::node::NodeId;

/// Identity of a display node. Only valid for the projection (epoch) that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DisplayId {
    pub(crate) epoch: u32,
    pub(crate) index: u32,
}

impl DisplayId {
    pub fn epoch(self) -> u32 {
        self.epoch
    }

    pub(crate) fn slot(self) -> usize {
        self.index as usize
    }
}

impl fmt::Display for DisplayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "d{}.{}", self.epoch, self.index)
    }
}

/// Bindings produced by a single projection. A new table replaces the old one on
/// every rebuild; resolving a display id from another rebuild panics.
#[derive(Debug, Default)]
pub struct NodeBindingTable {
    epoch: u32,
    by_data: HashMap<NodeId, DisplayId>,
    by_display: Vec<NodeId>,
}

impl NodeBindingTable {
    pub fn new(epoch: u32) -> Self {
        Self { epoch, by_data: HashMap::new(), by_display: Vec::new() }
    }

    pub fn with_capacity(epoch: u32, capacity: usize) -> Self {
        Self {
            epoch,
            by_data: HashMap::with_capacity(capacity),
            by_display: Vec::with_capacity(capacity),
        }
    }

    pub fn epoch(&self) -> u32 {
        self.epoch
    }

    pub fn len(&self) -> usize {
        self.by_display.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_display.is_empty()
    }

    /// Record `data` ↔ `display`. Display ids are handed out densely, in order.
    pub fn bind(&mut self, data: NodeId, display: DisplayId) {
        self.check(display);
        assert_eq!(
            display.slot(),
            self.by_display.len(),
            "display nodes must be bound in creation order"
        );
        let previous = self.by_data.insert(data, display);
        assert!(previous.is_none(), "data node {data} bound twice in one projection");
        self.by_display.push(data);
    }

    /// The display node of `data`, if it survived the filter.
    pub fn find_display_node(&self, data: NodeId) -> Option<DisplayId> {
        self.by_data.get(&data).copied()
    }

    /// The data node behind `display`.
    pub fn find_data_node(&self, display: DisplayId) -> NodeId {
        self.check(display);
        match self.by_display.get(display.slot()) {
            Some(data) => *data,
            None => panic!("display node {display} was never bound"),
        }
    }

    /// Like [`find_data_node`](Self::find_data_node) but for optional input.
    pub fn resolve(&self, display: Option<DisplayId>) -> Option<NodeId> {
        display.map(|display| self.find_data_node(display))
    }

    fn check(&self, display: DisplayId) {
        assert_eq!(
            display.epoch, self.epoch,
            "display node {display} belongs to another projection (current epoch {})",
            self.epoch
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups_work_both_ways() {
        let mut table = NodeBindingTable::new(3);
        let first = DisplayId { epoch: 3, index: 0 };
        let second = DisplayId { epoch: 3, index: 1 };
        table.bind(NodeId(10), first);
        table.bind(NodeId(42), second);

        assert_eq!(table.find_display_node(NodeId(42)), Some(second));
        assert_eq!(table.find_display_node(NodeId(7)), None);
        assert_eq!(table.find_data_node(first), NodeId(10));
        assert_eq!(table.len(), 2);
    }

    #[test]
    #[should_panic(expected = "belongs to another projection")]
    fn stale_display_id_panics() {
        let mut table = NodeBindingTable::new(2);
        table.bind(NodeId(1), DisplayId { epoch: 2, index: 0 });
        table.find_data_node(DisplayId { epoch: 1, index: 0 });
    }

    #[test]
    #[should_panic(expected = "bound twice")]
    fn double_binding_panics() {
        let mut table = NodeBindingTable::new(0);
        table.bind(NodeId(1), DisplayId { epoch: 0, index: 0 });
        table.bind(NodeId(1), DisplayId { epoch: 0, index: 1 });
    }
}
