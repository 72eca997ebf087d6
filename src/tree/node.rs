//! Arena node types shared by the data tree and the display view.

use std::fmt;
use std::sync::Arc;

use crate::models::{ConnectionInfo, Entity, Property, Verb, VerbArgument};

/// Stable identity of a data tree node. Identities are never reused, so an id that
/// outlives its node simply stops resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Synthetic grouping key for namespace and base-type groups.
#[derive(Debug, Clone, PartialEq)]
pub enum GroupKey {
    Namespace(String),
    BaseType(Arc<Entity>),
}

impl GroupKey {
    pub fn name(&self) -> &str {
        match self {
            GroupKey::Namespace(namespace) => namespace,
            GroupKey::BaseType(entity) => &entity.full_name,
        }
    }
}

/// Nodes that stand in for content that is not there yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    /// Server subtree while a refresh is in flight
    Refreshing,
    /// Verb arguments not yet loaded
    VerbArguments,
}

/// What a node represents.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// A connected server; carries the provider display name.
    Provider(String),
    Entity(Arc<Entity>),
    Property(Property),
    Verb(Arc<Verb>),
    VerbArgument(VerbArgument),
    Group(GroupKey),
    Placeholder(Placeholder),
}

impl Payload {
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Payload::Placeholder(_))
    }

    pub fn as_entity(&self) -> Option<&Arc<Entity>> {
        match self {
            Payload::Entity(entity) => Some(entity),
            _ => None,
        }
    }

    pub fn as_verb(&self) -> Option<&Arc<Verb>> {
        match self {
            Payload::Verb(verb) => Some(verb),
            _ => None,
        }
    }
}

/// Count suffix appended to a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Annotation {
    /// `(3 items)` on namespace and base-type groups
    Items(usize),
    /// `(2 derived entities)` on hierarchy nodes
    Derived(usize),
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Annotation::Items(count) => {
                write!(f, "({count} item{})", if count > 1 { "s" } else { "" })
            }
            Annotation::Derived(count) => {
                write!(f, "({count} derived entit{})", if count > 1 { "ies" } else { "y" })
            }
        }
    }
}

/// Icon keys understood by the widget layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IconKey {
    Database,
    Namespace,
    BaseType,
    BaseTypeAbstract,
    Table,
    TableAbstract,
    TableCrud,
    Indication,
    KeyColumn,
    Column,
    InheritedColumn,
    Link,
    Verb,
    Argument,
    None,
}

impl IconKey {
    pub fn as_str(self) -> &'static str {
        match self {
            IconKey::Database => "Database",
            IconKey::Namespace => "Namespace",
            IconKey::BaseType => "BaseType",
            IconKey::BaseTypeAbstract => "BaseTypeAbstract",
            IconKey::Table => "Table",
            IconKey::TableAbstract => "TableAbstract",
            IconKey::TableCrud => "TableCrud",
            IconKey::Indication => "Indication",
            IconKey::KeyColumn => "KeyColumn",
            IconKey::Column => "Column",
            IconKey::InheritedColumn => "InheritedColumn",
            IconKey::Link => "Link",
            IconKey::Verb => "Verb",
            IconKey::Argument => "Argument",
            IconKey::None => "",
        }
    }

    pub fn for_entity(entity: &Entity) -> Self {
        if entity.is_indication {
            IconKey::Indication
        } else if entity.is_abstract {
            IconKey::TableAbstract
        } else if entity.has_crud() {
            IconKey::TableCrud
        } else {
            IconKey::Table
        }
    }

    pub fn for_property(property: &Property) -> Self {
        if property.is_navigable {
            IconKey::Link
        } else if property.is_key {
            IconKey::KeyColumn
        } else if property.is_inherited {
            IconKey::InheritedColumn
        } else {
            IconKey::Column
        }
    }
}

/// A node of the data tree.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) payload: Payload,
    pub(crate) annotation: Option<Annotation>,
    pub(crate) expanded: bool,
    pub(crate) name: String,
}

impl Node {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn annotation(&self) -> Option<Annotation> {
        self.annotation
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// De-duplication key; only meaningful for top-level server nodes.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Display text, derived from the payload and annotation.
    pub fn label(&self) -> String {
        let base = match &self.payload {
            Payload::Provider(name) => name.clone(),
            Payload::Entity(entity) => entity.full_name.clone(),
            Payload::Property(property) => format!("{} ({})", property.name, property.type_name),
            Payload::Verb(verb) => verb.name.clone(),
            Payload::VerbArgument(argument) => {
                format!("{} ({})", argument.name, argument.type_name)
            }
            Payload::Group(key) => key.name().to_string(),
            Payload::Placeholder(Placeholder::Refreshing) => "Refreshing...".to_string(),
            Payload::Placeholder(Placeholder::VerbArguments) => "Loading...".to_string(),
        };
        match self.annotation {
            Some(annotation) => format!("{base} {annotation}"),
            None => base,
        }
    }

    pub fn icon(&self) -> IconKey {
        match &self.payload {
            Payload::Provider(_) => IconKey::Database,
            Payload::Entity(entity) => IconKey::for_entity(entity),
            Payload::Property(property) => IconKey::for_property(property),
            Payload::Verb(_) => IconKey::Verb,
            Payload::VerbArgument(_) => IconKey::Argument,
            Payload::Group(GroupKey::Namespace(_)) => IconKey::Namespace,
            Payload::Group(GroupKey::BaseType(base)) if base.is_abstract => {
                IconKey::BaseTypeAbstract
            }
            Payload::Group(GroupKey::BaseType(_)) => IconKey::BaseType,
            Payload::Placeholder(_) => IconKey::None,
        }
    }

    /// Hover text. `connection` is the server the node belongs to; indications only
    /// report their subscription capability when it is known.
    pub fn tooltip(&self, connection: Option<&ConnectionInfo>) -> Option<String> {
        match &self.payload {
            Payload::Entity(entity) => Some(entity_tooltip(entity, connection)),
            Payload::Property(property) => property
                .summary
                .as_deref()
                .filter(|summary| !summary.is_empty())
                .map(|summary| format!("{}\n{summary}", self.label())),
            Payload::Verb(verb) => Some(format!("{}\n{}", verb.name, verb.summary)),
            Payload::VerbArgument(argument) => {
                argument.summary.clone().filter(|summary| !summary.is_empty())
            }
            _ => None,
        }
    }
}

fn entity_tooltip(entity: &Entity, connection: Option<&ConnectionInfo>) -> String {
    let mut text = format!("{}\n", entity.full_name);
    if let Some(summary) = entity.summary.as_deref().filter(|summary| !summary.is_empty()) {
        text.push_str(summary);
        text.push('\n');
    }
    text.push_str(&format!("Base type: {}", entity.base_entity.as_deref().unwrap_or_default()));
    if entity.is_indication {
        if let Some(connection) = connection {
            text.push_str(&format!("\nCanSubscribe: {}", connection.can_create_subscription));
        }
    } else {
        text.push_str(&format!(
            "\nCanCreate: {}\nCanUpdate: {}\nCanDelete: {}",
            entity.can_create, entity.can_update, entity.can_delete
        ));
    }
    text
}

/// Detached node description produced by grouping and grafted into a data tree.
#[derive(Debug, Clone)]
pub struct NodeSpec {
    pub payload: Payload,
    pub annotation: Option<Annotation>,
    pub expanded: bool,
    pub children: Vec<NodeSpec>,
}

impl NodeSpec {
    pub fn new(payload: Payload) -> Self {
        Self { payload, annotation: None, expanded: false, children: Vec::new() }
    }

    pub fn leaf(payload: Payload) -> Self {
        Self::new(payload)
    }

    /// Number of nodes in this subtree, including itself.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(NodeSpec::count).sum::<usize>()
    }
}
