//! Dual-tree engine: the authoritative data arena, grouping into tree shapes, fuzzy
//! filtering and the projected display view.

pub mod bindings;
pub mod data;
pub mod fuzzy;
pub mod grouping;
pub mod node;
pub mod projector;
pub mod visibility;

pub use bindings::{DisplayId, NodeBindingTable};
pub use data::DataTree;
pub use fuzzy::Filter;
pub use grouping::GroupingMode;
pub use node::{Annotation, GroupKey, IconKey, Node, NodeId, NodeSpec, Payload, Placeholder};
pub use projector::{
    DisplayNode, DisplayTree, NodeStyle, Projection, Tone, TreeProjector, default_style,
};
pub use visibility::{VisibilityClass, VisibilityMap};
