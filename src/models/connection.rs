// Connection identity models

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identity of a metadata connection plus its capability flags
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionInfo {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub can_create_subscription: bool,
}

impl ConnectionInfo {
    pub fn new(title: impl Into<String>) -> Self {
        Self { id: Uuid::new_v4(), title: title.into(), can_create_subscription: false }
    }

    pub fn with_subscriptions(mut self, allowed: bool) -> Self {
        self.can_create_subscription = allowed;
        self
    }
}
