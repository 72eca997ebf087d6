//! Metadata fixtures for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use schemascope::models::{ConnectionInfo, Entity, EntitySet, Property, Verb, VerbArgument};
use schemascope::provider::{MetadataDocument, MetadataProvider, SnapshotProvider};
use schemascope::{Error, Result};

/// `A (N1)`, `B (N1, base A)`, `C (N2)`.
pub fn scenario_entities() -> Vec<Entity> {
    vec![
        Entity::new("A").with_namespace("N1"),
        Entity::new("B").with_namespace("N1").with_base("A"),
        Entity::new("C").with_namespace("N2"),
    ]
}

pub fn scenario_set() -> EntitySet {
    scenario_entities().into_iter().collect()
}

/// A small Orion-like schema:
///
/// ```text
/// System.Entity (abstract)
///   Orion.NetObject (abstract)
///     Orion.Interfaces
///     Orion.Nodes (update only, verbs PollNow/Unmanage)
/// System.Indication (abstract)
///   Orion.AlertEvents (indication)
/// ```
pub fn orion_entities() -> Vec<Entity> {
    let mut system_entity = Entity::new("System.Entity");
    system_entity.is_abstract = true;

    let mut net_object = Entity::new("Orion.NetObject")
        .with_base("System.Entity")
        .with_property(Property::new("Uri", "String"))
        .with_property(Property::new("DisplayName", "String"));
    net_object.is_abstract = true;

    let mut nodes = Entity::new("Orion.Nodes")
        .with_base("Orion.NetObject")
        .with_property(Property::new("NodeID", "Int32").key())
        .with_property(Property::new("Caption", "String"))
        .with_property(Property::new("Uri", "String").inherited())
        .with_property(Property::new("Interfaces", "Orion.Interfaces").navigable())
        .with_verb(Verb::new("Orion.Nodes", "Unmanage"))
        .with_verb(Verb::new("Orion.Nodes", "PollNow"));
    nodes.can_update = true;
    nodes.summary = Some("Monitored network nodes".into());

    let interfaces = Entity::new("Orion.Interfaces")
        .with_base("Orion.NetObject")
        .with_property(Property::new("InterfaceID", "Int32").key())
        .with_property(Property::new("Name", "String"));

    let mut indication = Entity::new("System.Indication");
    indication.is_abstract = true;

    let mut alert_events = Entity::new("Orion.AlertEvents")
        .with_base("System.Indication")
        .with_property(Property::new("AlertID", "Int32"));
    alert_events.is_indication = true;

    vec![system_entity, net_object, nodes, interfaces, indication, alert_events]
}

pub fn orion_document() -> MetadataDocument {
    let mut verb_arguments = HashMap::new();
    verb_arguments.insert(
        "Orion.Nodes.PollNow".to_string(),
        vec![VerbArgument::new("netObjectId", "String")],
    );
    verb_arguments.insert(
        "Orion.Nodes.Unmanage".to_string(),
        vec![
            VerbArgument::new("netObjectId", "String"),
            VerbArgument::new("unmanageTime", "DateTime"),
            VerbArgument::new("remanageTime", "DateTime"),
            VerbArgument::new("isRelative", "Boolean"),
        ],
    );
    MetadataDocument {
        name: "orion".to_string(),
        can_create_subscription: false,
        entities: orion_entities(),
        verb_arguments,
    }
}

pub fn orion_provider() -> Arc<SnapshotProvider> {
    Arc::new(SnapshotProvider::from_document(orion_document()))
}

pub fn orion_provider_with_subscriptions() -> Arc<SnapshotProvider> {
    let document = MetadataDocument { can_create_subscription: true, ..orion_document() };
    Arc::new(SnapshotProvider::from_document(document))
}

/// Serves the Orion document unless `failing` is set.
pub fn switchable_provider(title: &str) -> (Arc<SnapshotProvider>, Arc<AtomicBool>) {
    let failing = Arc::new(AtomicBool::new(false));
    let flag = failing.clone();
    let provider = SnapshotProvider::new(ConnectionInfo::new(title), move || {
        if flag.load(Ordering::SeqCst) {
            Err(Error::ProviderFault("metadata service unavailable".into()))
        } else {
            Ok(orion_document())
        }
    });
    (Arc::new(provider), failing)
}

/// A provider whose loads after the first block until `release` is set.
pub struct GatedProvider {
    pub provider: Arc<SnapshotProvider>,
    pub release: Arc<AtomicBool>,
    /// Loads started so far
    pub loads: Arc<AtomicUsize>,
}

pub fn gated_provider(title: &str) -> GatedProvider {
    let release = Arc::new(AtomicBool::new(false));
    let loads = Arc::new(AtomicUsize::new(0));
    let (gate, counter) = (release.clone(), loads.clone());
    let provider = SnapshotProvider::new(ConnectionInfo::new(title), move || {
        if counter.fetch_add(1, Ordering::SeqCst) > 0 {
            // bounded so a failed test cannot hang the runtime shutdown
            let deadline = Instant::now() + Duration::from_secs(10);
            while !gate.load(Ordering::SeqCst) && Instant::now() < deadline {
                thread::sleep(Duration::from_millis(5));
            }
        }
        Ok(orion_document())
    });
    GatedProvider { provider: Arc::new(provider), release, loads }
}

/// Delegates to a snapshot provider but cannot load verb arguments.
pub struct BrokenArguments {
    inner: SnapshotProvider,
}

impl BrokenArguments {
    pub fn new() -> Arc<Self> {
        Arc::new(Self { inner: SnapshotProvider::from_document(orion_document()) })
    }
}

impl MetadataProvider for BrokenArguments {
    fn name(&self) -> String {
        self.inner.name()
    }

    fn tables(&self) -> Vec<Arc<Entity>> {
        self.inner.tables()
    }

    fn refresh(&self) -> Result<()> {
        self.inner.refresh()
    }

    fn verb_arguments(&self, verb: &Verb) -> Result<Vec<VerbArgument>> {
        Err(Error::ProviderSecurityFault(format!("access denied to {}", verb.qualified_name())))
    }

    fn connection_info(&self) -> ConnectionInfo {
        self.inner.connection_info()
    }
}
