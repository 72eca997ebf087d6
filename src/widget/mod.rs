//! Rendering capability for the projected tree.

mod text;

use crate::models::ConnectionInfo;
use crate::tree::{DataTree, DisplayId, IconKey, NodeId, Projection, Tone};

pub use text::TextTreeWidget;

/// What the widget needs to draw one row.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetItem {
    pub label: String,
    pub icon: IconKey,
    pub tone: Tone,
    pub tooltip: Option<String>,
}

/// A tree control keyed by display identities.
///
/// Interactions flow back to the controller as explicit calls
/// (`on_expanded`, `on_selected`, ...) carrying the display id; the widget never
/// resolves ids itself.
pub trait TreeWidget {
    fn begin_update(&mut self);
    fn end_update(&mut self);
    fn clear(&mut self);
    /// Append `id` as the last child of `parent` (or as the last top-level row).
    fn insert(&mut self, parent: Option<DisplayId>, id: DisplayId, item: WidgetItem);
    fn remove(&mut self, id: DisplayId);
    fn set_expanded(&mut self, id: DisplayId, expanded: bool);
    fn set_selected(&mut self, id: Option<DisplayId>);
    fn selected(&self) -> Option<DisplayId>;
    fn scroll_into_view(&mut self, id: DisplayId);
    fn focus_search(&mut self);
}

/// Replace the widget contents with `projection`. `connection_of` names the server a
/// data node belongs to, for tooltips.
pub fn populate<'c, W, F>(
    widget: &mut W,
    projection: &Projection,
    data: &DataTree,
    connection_of: F,
) where
    W: TreeWidget + ?Sized,
    F: Fn(NodeId) -> Option<&'c ConnectionInfo>,
{
    widget.begin_update();
    widget.clear();

    let display = &projection.display;
    for id in display.ids() {
        let node = display.get(id);
        let data_node = &data[node.data()];
        widget.insert(
            node.parent(),
            id,
            WidgetItem {
                label: data_node.label(),
                icon: data_node.icon(),
                tone: node.style().tone,
                tooltip: data_node.tooltip(connection_of(node.data())),
            },
        );
    }
    // Children exist only after every insert.
    for id in display.ids() {
        let node = display.get(id);
        if node.is_expanded() && !node.children().is_empty() {
            widget.set_expanded(id, true);
        }
    }

    widget.set_selected(projection.selected);
    if let Some(first) = projection.reveal.first() {
        widget.scroll_into_view(*first);
    } else if let Some(selected) = projection.selected {
        widget.scroll_into_view(selected);
    }
    widget.end_update();
}
