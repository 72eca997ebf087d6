//! Provider backed by a JSON metadata document.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{ConnectionInfo, Entity, Verb, VerbArgument};

use super::MetadataProvider;

/// Serialized metadata of one server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetadataDocument {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub can_create_subscription: bool,
    #[serde(default)]
    pub entities: Vec<Entity>,
    /// Arguments keyed by `Entity.Verb`.
    #[serde(default)]
    pub verb_arguments: HashMap<String, Vec<VerbArgument>>,
}

impl MetadataDocument {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}

type Loader = Box<dyn Fn() -> Result<MetadataDocument> + Send + Sync>;

#[derive(Default)]
struct Snapshot {
    tables: Vec<Arc<Entity>>,
    verb_arguments: HashMap<String, Vec<VerbArgument>>,
}

impl From<MetadataDocument> for Snapshot {
    fn from(document: MetadataDocument) -> Self {
        Self {
            tables: document
                .entities
                .into_iter()
                .map(|mut entity| {
                    if entity.namespace.is_empty()
                        && let Some((namespace, _)) = entity.full_name.rsplit_once('.')
                    {
                        entity.namespace = namespace.to_string();
                    }
                    Arc::new(entity)
                })
                .collect(),
            verb_arguments: document.verb_arguments,
        }
    }
}

/// A provider whose refresh re-runs a loader. Empty until the first refresh.
pub struct SnapshotProvider {
    connection: ConnectionInfo,
    loader: Loader,
    snapshot: RwLock<Snapshot>,
    argument_fetches: AtomicUsize,
}

impl SnapshotProvider {
    pub fn new<F>(connection: ConnectionInfo, loader: F) -> Self
    where
        F: Fn() -> Result<MetadataDocument> + Send + Sync + 'static,
    {
        Self {
            connection,
            loader: Box::new(loader),
            snapshot: RwLock::new(Snapshot::default()),
            argument_fetches: AtomicUsize::new(0),
        }
    }

    /// Serve a fixed document on every refresh.
    pub fn from_document(document: MetadataDocument) -> Self {
        let connection = ConnectionInfo::new(document.name.clone())
            .with_subscriptions(document.can_create_subscription);
        Self::new(connection, move || Ok(document.clone()))
    }

    /// Re-read `path` on every refresh. The file is read once up front for the
    /// server name.
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let document = MetadataDocument::load(&path)?;
        let title = if document.name.is_empty() {
            path.file_stem().map(|stem| stem.to_string_lossy().into_owned()).unwrap_or_default()
        } else {
            document.name.clone()
        };
        let connection =
            ConnectionInfo::new(title).with_subscriptions(document.can_create_subscription);
        Ok(Self::new(connection, move || {
            MetadataDocument::load(&path)
                .map_err(|err| Error::Provider(format!("{}: {err}", path.display())))
        }))
    }

    /// How many times verb arguments were requested.
    pub fn argument_fetches(&self) -> usize {
        self.argument_fetches.load(Ordering::Relaxed)
    }
}

impl MetadataProvider for SnapshotProvider {
    fn name(&self) -> String {
        self.connection.title.clone()
    }

    fn tables(&self) -> Vec<Arc<Entity>> {
        self.snapshot.read().tables.clone()
    }

    fn refresh(&self) -> Result<()> {
        let document = (self.loader)()?;
        log::debug!(
            "Loaded {} entities for {}",
            document.entities.len(),
            self.connection.title
        );
        *self.snapshot.write() = Snapshot::from(document);
        Ok(())
    }

    fn verb_arguments(&self, verb: &Verb) -> Result<Vec<VerbArgument>> {
        self.argument_fetches.fetch_add(1, Ordering::Relaxed);
        let snapshot = self.snapshot.read();
        Ok(snapshot.verb_arguments.get(&verb.qualified_name()).cloned().unwrap_or_default())
    }

    fn connection_info(&self) -> ConnectionInfo {
        self.connection.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCUMENT: &str = r#"{
        "name": "orion-dev",
        "can_create_subscription": true,
        "entities": [
            {
                "full_name": "Orion.Nodes",
                "can_update": true,
                "properties": [{ "name": "NodeID", "type": "Int32", "is_key": true }],
                "verbs": [{ "name": "PollNow", "entity_name": "Orion.Nodes" }]
            }
        ],
        "verb_arguments": {
            "Orion.Nodes.PollNow": [{ "name": "netObjectId", "type": "String" }]
        }
    }"#;

    #[test]
    fn snapshot_is_empty_until_refresh() {
        let provider = SnapshotProvider::from_document(
            MetadataDocument::from_json(DOCUMENT).expect("valid document"),
        );
        assert!(provider.tables().is_empty());
        assert_eq!(provider.name(), "orion-dev");
        assert!(provider.connection_info().can_create_subscription);

        provider.refresh().expect("refresh succeeds");
        let tables = provider.tables();
        assert_eq!(tables.len(), 1);
        assert!(tables[0].properties[0].is_key);
        assert_eq!(tables[0].namespace, "Orion");
    }

    #[test]
    fn verb_arguments_are_counted() {
        let provider = SnapshotProvider::from_document(
            MetadataDocument::from_json(DOCUMENT).expect("valid document"),
        );
        provider.refresh().expect("refresh succeeds");
        let verb = provider.tables()[0].verbs[0].clone();

        let arguments = provider.verb_arguments(&verb).expect("arguments");
        assert_eq!(arguments.len(), 1);
        assert_eq!(arguments[0].name, "netObjectId");
        provider.verb_arguments(&verb).expect("arguments");
        assert_eq!(provider.argument_fetches(), 2);
    }

    #[test]
    fn loader_errors_surface_from_refresh() {
        let provider = SnapshotProvider::new(ConnectionInfo::new("down"), || {
            Err(Error::ProviderSecurityFault("certificate rejected".into()))
        });
        let err = provider.refresh().expect_err("refresh fails");
        assert!(matches!(err, Error::ProviderSecurityFault(_)));
    }
}
