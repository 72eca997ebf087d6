//! Schema metadata: entities, their properties and verbs.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// A remote entity (table-like type) described by the metadata service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub full_name: String,
    #[serde(default)]
    pub namespace: String,
    /// Full name of the base entity, if any.
    #[serde(default)]
    pub base_entity: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub is_abstract: bool,
    #[serde(default)]
    pub is_indication: bool,
    #[serde(default)]
    pub can_create: bool,
    #[serde(default)]
    pub can_update: bool,
    #[serde(default)]
    pub can_delete: bool,
    #[serde(default)]
    pub properties: Vec<Property>,
    #[serde(default)]
    pub verbs: Vec<Verb>,
}

impl Entity {
    pub fn new(full_name: impl Into<String>) -> Self {
        let full_name = full_name.into();
        let namespace = match full_name.rsplit_once('.') {
            Some((namespace, _)) => namespace.to_string(),
            None => String::new(),
        };
        Self {
            full_name,
            namespace,
            base_entity: None,
            summary: None,
            is_abstract: false,
            is_indication: false,
            can_create: false,
            can_update: false,
            can_delete: false,
            properties: Vec::new(),
            verbs: Vec::new(),
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base_entity = Some(base.into());
        self
    }

    pub fn with_property(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }

    pub fn with_verb(mut self, verb: Verb) -> Self {
        self.verbs.push(verb);
        self
    }

    /// Any of create/update/delete is allowed.
    pub fn has_crud(&self) -> bool {
        self.can_create || self.can_update || self.can_delete
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub is_key: bool,
    #[serde(default)]
    pub is_navigable: bool,
    #[serde(default)]
    pub is_inherited: bool,
    #[serde(default)]
    pub summary: Option<String>,
}

impl Property {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            is_key: false,
            is_navigable: false,
            is_inherited: false,
            summary: None,
        }
    }

    pub fn key(mut self) -> Self {
        self.is_key = true;
        self
    }

    pub fn navigable(mut self) -> Self {
        self.is_navigable = true;
        self
    }

    pub fn inherited(mut self) -> Self {
        self.is_inherited = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verb {
    pub name: String,
    pub entity_name: String,
    #[serde(default)]
    pub summary: String,
    /// Resolved lazily; empty until someone asks the provider.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<VerbArgument>,
}

impl Verb {
    pub fn new(entity_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entity_name: entity_name.into(),
            summary: String::new(),
            arguments: Vec::new(),
        }
    }

    /// Key used by providers to look up arguments: `Entity.Verb`.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.entity_name, self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerbArgument {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub summary: Option<String>,
}

impl VerbArgument {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self { name: name.into(), type_name: type_name.into(), summary: None }
    }
}

/// Ordinal, case-insensitive ordering on names, with exact ordinal as the final tie-break
/// so that the result is total.
pub fn cmp_full_name(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_uppercase)
        .cmp(b.chars().flat_map(char::to_uppercase))
        .then_with(|| a.cmp(b))
}

/// An immutable snapshot of entities indexed by full name.
#[derive(Debug, Clone, Default)]
pub struct EntitySet {
    entities: Vec<Arc<Entity>>,
    by_name: HashMap<String, usize>,
}

impl EntitySet {
    pub fn new(entities: Vec<Arc<Entity>>) -> Self {
        let by_name = entities
            .iter()
            .enumerate()
            .map(|(index, entity)| (entity.full_name.clone(), index))
            .collect();
        Self { entities, by_name }
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Entity>> {
        self.entities.iter()
    }

    pub fn get(&self, full_name: &str) -> Option<&Arc<Entity>> {
        self.by_name.get(full_name).map(|index| &self.entities[*index])
    }

    /// The base entity, when it is a member of this set. A dangling reference resolves
    /// to `None`, so callers place such an entity as if it had no base.
    pub fn resolve_base(&self, entity: &Entity) -> Option<&Arc<Entity>> {
        entity.base_entity.as_deref().and_then(|name| self.get(name))
    }

    /// Entities sorted by full name.
    pub fn sorted(&self) -> Vec<Arc<Entity>> {
        let mut sorted = self.entities.clone();
        sorted.sort_by(|a, b| cmp_full_name(&a.full_name, &b.full_name));
        sorted
    }
}

impl FromIterator<Entity> for EntitySet {
    fn from_iter<I: IntoIterator<Item = Entity>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Arc::new).collect())
    }
}
