//! Explorer events for reactive UI updates

use uuid::Uuid;

use crate::tree::GroupingMode;

/// Events emitted by the explorer controller
#[derive(Debug, Clone, PartialEq)]
pub enum ExplorerEvent {
    // Server lifecycle
    ServerAdded(Uuid),
    ServerClosed(Uuid),

    // Refresh lifecycle
    RefreshStarted(Uuid),
    RefreshCompleted { connection: Uuid, entities: usize },
    RefreshFailed { connection: Uuid, error: String },

    // Verb arguments
    VerbArgumentsLoaded { verb: String, count: usize },
    VerbArgumentsFailed { verb: String, error: String },

    // View changes
    FilterApplied(Option<String>),
    GroupingChanged(GroupingMode),
}
