//! Entity set → tree shape, one function per grouping mode.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::models::{Entity, EntitySet, Property, cmp_full_name};

use super::node::{Annotation, GroupKey, NodeSpec, Payload, Placeholder};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum GroupingMode {
    Flat,
    #[default]
    ByNamespace,
    ByBaseType,
    ByHierarchy,
}

impl GroupingMode {
    pub fn label(self) -> &'static str {
        match self {
            GroupingMode::Flat => "Flat",
            GroupingMode::ByNamespace => "By namespace",
            GroupingMode::ByBaseType => "By base type",
            GroupingMode::ByHierarchy => "By hierarchy",
        }
    }
}

/// Build the nodes that go under a server node. Pure and deterministic.
pub fn build(entities: &EntitySet, mode: GroupingMode) -> Vec<NodeSpec> {
    match mode {
        GroupingMode::Flat => entities.sorted().iter().map(entity_node).collect(),
        GroupingMode::ByNamespace => by_namespace(entities),
        GroupingMode::ByBaseType => by_base_type(entities),
        GroupingMode::ByHierarchy => by_hierarchy(entities),
    }
}

fn by_namespace(entities: &EntitySet) -> Vec<NodeSpec> {
    let mut groups: HashMap<&str, Vec<Arc<Entity>>> = HashMap::new();
    let sorted = entities.sorted();
    for entity in &sorted {
        groups.entry(entity.namespace.as_str()).or_default().push(entity.clone());
    }

    let mut keys: Vec<&str> = groups.keys().copied().collect();
    keys.sort_by(|a, b| cmp_full_name(a, b));
    keys.into_iter()
        .map(|namespace| {
            let members = &groups[namespace];
            let mut group = NodeSpec::new(Payload::Group(GroupKey::Namespace(namespace.into())));
            group.annotation = Some(Annotation::Items(members.len()));
            group.children = members.iter().map(entity_node).collect();
            group
        })
        .collect()
}

fn by_base_type(entities: &EntitySet) -> Vec<NodeSpec> {
    let mut groups: HashMap<&str, (Arc<Entity>, Vec<Arc<Entity>>)> = HashMap::new();
    let sorted = entities.sorted();
    for entity in &sorted {
        let Some(base) = entities.resolve_base(entity) else {
            continue;
        };
        groups
            .entry(base.full_name.as_str())
            .or_insert_with(|| (base.clone(), Vec::new()))
            .1
            .push(entity.clone());
    }

    let mut keys: Vec<&str> = groups.keys().copied().collect();
    keys.sort_by(|a, b| cmp_full_name(a, b));
    keys.into_iter()
        .map(|name| {
            let (base, members) = &groups[name];
            let mut group = NodeSpec::new(Payload::Group(GroupKey::BaseType(base.clone())));
            group.annotation = Some(Annotation::Items(members.len()));
            group.children = members.iter().map(entity_node).collect();
            group
        })
        .collect()
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Walk {
    InProgress,
    Done,
}

/// Base of every entity after dangling references are dropped and cycles are cut.
/// Chains are walked in full-name order; the first identity reached twice loses its
/// base link and becomes root-level.
pub(crate) fn effective_bases(entities: &EntitySet) -> HashMap<String, Option<String>> {
    let mut bases: HashMap<String, Option<String>> = entities
        .iter()
        .map(|entity| {
            let base = entities.resolve_base(entity).map(|base| base.full_name.clone());
            (entity.full_name.clone(), base)
        })
        .collect();

    let mut state: HashMap<String, Walk> = HashMap::with_capacity(bases.len());
    for entity in entities.sorted() {
        let mut chain = Vec::new();
        let mut current = Some(entity.full_name.clone());
        while let Some(name) = current.take() {
            match state.get(&name).copied() {
                Some(Walk::Done) => {}
                Some(Walk::InProgress) => {
                    log::debug!("Base entity cycle detected at {name}; placing it at root level");
                    bases.insert(name, None);
                }
                None => {
                    state.insert(name.clone(), Walk::InProgress);
                    current = bases.get(&name).cloned().flatten();
                    chain.push(name);
                }
            }
        }
        for name in chain {
            state.insert(name, Walk::Done);
        }
    }

    bases
}

fn by_hierarchy(entities: &EntitySet) -> Vec<NodeSpec> {
    let bases = effective_bases(entities);
    let mut derived: HashMap<Option<&str>, Vec<Arc<Entity>>> = HashMap::new();
    for entity in entities.sorted() {
        let base = bases.get(&entity.full_name).and_then(|base| base.as_deref());
        derived.entry(base).or_default().push(entity);
    }
    hierarchy_level(None, &derived)
}

fn hierarchy_level(
    base: Option<&str>,
    derived: &HashMap<Option<&str>, Vec<Arc<Entity>>>,
) -> Vec<NodeSpec> {
    let Some(members) = derived.get(&base) else {
        return Vec::new();
    };
    members
        .iter()
        .map(|entity| {
            let mut node = entity_node(entity);
            let children = hierarchy_level(Some(entity.full_name.as_str()), derived);
            if !children.is_empty() {
                node.annotation = Some(Annotation::Derived(children.len()));
            }
            node.expanded = true;
            node.children.extend(children);
            node
        })
        .collect()
}

/// An entity with its property runs and verbs.
pub fn entity_node(entity: &Arc<Entity>) -> NodeSpec {
    let mut node = NodeSpec::new(Payload::Entity(entity.clone()));

    let runs: [fn(&Property) -> bool; 4] = [
        |p| p.is_key,
        |p| !p.is_inherited && !p.is_navigable && !p.is_key,
        |p| p.is_inherited && !p.is_navigable && !p.is_key,
        |p| p.is_navigable,
    ];
    for keep in runs {
        let mut run: Vec<&Property> = entity.properties.iter().filter(|p| keep(p)).collect();
        run.sort_by(|a, b| cmp_full_name(&a.name, &b.name));
        node.children.extend(run.into_iter().map(|p| NodeSpec::leaf(Payload::Property(p.clone()))));
    }

    let mut verbs: Vec<_> = entity.verbs.iter().collect();
    verbs.sort_by(|a, b| cmp_full_name(&a.name, &b.name));
    node.children.extend(verbs.into_iter().map(|verb| {
        let mut verb_node = NodeSpec::new(Payload::Verb(Arc::new(verb.clone())));
        verb_node.children.push(NodeSpec::leaf(Payload::Placeholder(Placeholder::VerbArguments)));
        verb_node
    }));

    node
}
