use std::collections::HashMap;
use std::fmt::Write as _;

use crate::tree::{DisplayId, Tone};

use super::{TreeWidget, WidgetItem};

#[derive(Debug, Clone)]
struct Row {
    item: WidgetItem,
    children: Vec<DisplayId>,
    expanded: bool,
}

/// Headless widget that keeps rows in memory and renders them as indented text.
#[derive(Debug, Default)]
pub struct TextTreeWidget {
    rows: HashMap<DisplayId, Row>,
    roots: Vec<DisplayId>,
    selected: Option<DisplayId>,
    scrolled_to: Option<DisplayId>,
    search_focused: bool,
    update_depth: u32,
    /// Completed begin/end pairs
    updates: usize,
}

impl TextTreeWidget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn item(&self, id: DisplayId) -> Option<&WidgetItem> {
        self.rows.get(&id).map(|row| &row.item)
    }

    pub fn is_expanded(&self, id: DisplayId) -> bool {
        self.rows.get(&id).is_some_and(|row| row.expanded)
    }

    pub fn roots(&self) -> &[DisplayId] {
        &self.roots
    }

    pub fn children(&self, id: DisplayId) -> &[DisplayId] {
        self.rows.get(&id).map(|row| row.children.as_slice()).unwrap_or_default()
    }

    pub fn scrolled_to(&self) -> Option<DisplayId> {
        self.scrolled_to
    }

    pub fn search_focused(&self) -> bool {
        self.search_focused
    }

    pub fn is_updating(&self) -> bool {
        self.update_depth > 0
    }

    pub fn updates(&self) -> usize {
        self.updates
    }

    /// Find the first row whose label equals `label`, in display order.
    pub fn find(&self, label: &str) -> Option<DisplayId> {
        let mut stack: Vec<DisplayId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let row = &self.rows[&id];
            if row.item.label == label {
                return Some(id);
            }
            stack.extend(row.children.iter().rev().copied());
        }
        None
    }

    /// Visible rows only: children of collapsed rows are skipped.
    pub fn render(&self) -> String {
        self.render_rows(false)
    }

    /// Every row regardless of expansion.
    pub fn render_all(&self) -> String {
        self.render_rows(true)
    }

    fn render_rows(&self, all: bool) -> String {
        let mut out = String::new();
        let mut stack: Vec<(DisplayId, usize)> =
            self.roots.iter().rev().map(|id| (*id, 0)).collect();
        while let Some((id, depth)) = stack.pop() {
            let row = &self.rows[&id];
            let marker = match (row.children.is_empty(), row.expanded) {
                (true, _) => ' ',
                (false, true) => '-',
                (false, false) => '+',
            };
            let tone = match row.item.tone {
                Tone::Normal => "",
                Tone::Muted => " ~",
                Tone::Dimmed => " .",
            };
            let selected = if self.selected == Some(id) { " <" } else { "" };
            let _ = writeln!(
                out,
                "{:indent$}{marker} {}{tone}{selected}",
                "",
                row.item.label,
                indent = depth * 2
            );
            if all || row.expanded {
                stack.extend(row.children.iter().rev().map(|child| (*child, depth + 1)));
            }
        }
        out
    }
}

impl TreeWidget for TextTreeWidget {
    fn begin_update(&mut self) {
        self.update_depth += 1;
    }

    fn end_update(&mut self) {
        if self.update_depth > 0 {
            self.update_depth -= 1;
            if self.update_depth == 0 {
                self.updates += 1;
            }
        }
    }

    fn clear(&mut self) {
        self.rows.clear();
        self.roots.clear();
        self.selected = None;
        self.scrolled_to = None;
    }

    fn insert(&mut self, parent: Option<DisplayId>, id: DisplayId, item: WidgetItem) {
        match parent {
            Some(parent) => match self.rows.get_mut(&parent) {
                Some(row) => row.children.push(id),
                None => {
                    log::warn!("Dropping row {id}: parent {parent} is not in the widget");
                    return;
                }
            },
            None => self.roots.push(id),
        }
        self.rows.insert(id, Row { item, children: Vec::new(), expanded: false });
    }

    fn remove(&mut self, id: DisplayId) {
        self.roots.retain(|root| *root != id);
        for row in self.rows.values_mut() {
            row.children.retain(|child| *child != id);
        }
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(row) = self.rows.remove(&current) {
                stack.extend(row.children);
            }
            if self.selected == Some(current) {
                self.selected = None;
            }
        }
    }

    fn set_expanded(&mut self, id: DisplayId, expanded: bool) {
        if let Some(row) = self.rows.get_mut(&id) {
            row.expanded = expanded;
        }
    }

    fn set_selected(&mut self, id: Option<DisplayId>) {
        self.selected = id.filter(|id| self.rows.contains_key(id));
    }

    fn selected(&self) -> Option<DisplayId> {
        self.selected
    }

    fn scroll_into_view(&mut self, id: DisplayId) {
        self.scrolled_to = Some(id);
    }

    fn focus_search(&mut self) {
        self.search_focused = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::IconKey;

    fn id(index: u32) -> DisplayId {
        DisplayId { epoch: 1, index }
    }

    fn item(label: &str) -> WidgetItem {
        WidgetItem { label: label.into(), icon: IconKey::None, tone: Tone::Normal, tooltip: None }
    }

    #[test]
    fn renders_only_expanded_rows() {
        let mut widget = TextTreeWidget::new();
        widget.insert(None, id(0), item("server"));
        widget.insert(Some(id(0)), id(1), item("Orion (1 item)"));
        widget.insert(Some(id(1)), id(2), item("Orion.Nodes"));

        assert_eq!(widget.render(), "+ server\n");
        widget.set_expanded(id(0), true);
        widget.set_selected(Some(id(1)));
        assert_eq!(widget.render(), "- server\n  + Orion (1 item) <\n");
        assert_eq!(widget.render_all().lines().count(), 3);
    }

    #[test]
    fn remove_drops_the_subtree() {
        let mut widget = TextTreeWidget::new();
        widget.insert(None, id(0), item("server"));
        widget.insert(Some(id(0)), id(1), item("Orion"));
        widget.insert(Some(id(1)), id(2), item("Orion.Nodes"));
        widget.set_selected(Some(id(2)));

        widget.remove(id(1));
        assert_eq!(widget.len(), 1);
        assert!(widget.children(id(0)).is_empty());
        assert_eq!(widget.selected(), None);
        assert_eq!(widget.find("Orion.Nodes"), None);
    }

    #[test]
    fn nested_updates_count_once() {
        let mut widget = TextTreeWidget::new();
        widget.begin_update();
        widget.begin_update();
        widget.end_update();
        assert!(widget.is_updating());
        widget.end_update();
        assert_eq!(widget.updates(), 1);
    }
}
