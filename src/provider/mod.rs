//! Metadata provider capability.
//!
//! The explorer never talks to a service directly; everything it knows about a server
//! comes through [`MetadataProvider`].

mod snapshot;

use std::sync::Arc;

use crate::error::Result;
use crate::models::{ConnectionInfo, Entity, Verb, VerbArgument};

pub use snapshot::{MetadataDocument, SnapshotProvider};

pub trait MetadataProvider: Send + Sync {
    /// Server display name; also the de-duplication key of its top-level node.
    fn name(&self) -> String;

    /// Entities of the current snapshot. Stable until the next successful refresh.
    fn tables(&self) -> Vec<Arc<Entity>>;

    /// Fetch a new snapshot. Blocking; called off the UI thread.
    ///
    /// Fails with [`Error::ProviderFault`](crate::Error::ProviderFault),
    /// [`Error::ProviderSecurityFault`](crate::Error::ProviderSecurityFault) or
    /// [`Error::Provider`](crate::Error::Provider).
    fn refresh(&self) -> Result<()>;

    fn verb_arguments(&self, verb: &Verb) -> Result<Vec<VerbArgument>>;

    fn connection_info(&self) -> ConnectionInfo;
}
