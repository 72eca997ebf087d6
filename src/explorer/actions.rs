//! Context actions per node kind.

use crate::models::ConnectionInfo;
use crate::tree::Payload;

use super::tabs::CrudOperation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextAction {
    GenerateSelect,
    GenerateSelectWithInherited,
    Subscribe,
    Crud(CrudOperation),
    Refresh,
    ActivityMonitor,
    Disconnect,
    Invoke,
}

impl ContextAction {
    pub fn label(self) -> &'static str {
        match self {
            ContextAction::GenerateSelect => "Generate Select Statement",
            ContextAction::GenerateSelectWithInherited => {
                "Generate Select Statement (with Inherited Properties)"
            }
            ContextAction::Subscribe => "Subscribe",
            ContextAction::Crud(operation) => operation.label(),
            ContextAction::Refresh => "Refresh",
            ContextAction::ActivityMonitor => "Activity Monitor",
            ContextAction::Disconnect => "Disconnect",
            ContextAction::Invoke => "Invoke",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuItem {
    pub action: ContextAction,
    pub enabled: bool,
}

impl MenuItem {
    fn enabled(action: ContextAction) -> Self {
        Self { action, enabled: true }
    }
}

/// Actions offered on a node of `connection`'s subtree. Empty for groups,
/// properties, arguments and placeholders.
pub fn context_actions(payload: &Payload, connection: &ConnectionInfo) -> Vec<MenuItem> {
    match payload {
        Payload::Entity(entity) => {
            let mut items = vec![
                MenuItem::enabled(ContextAction::GenerateSelect),
                MenuItem::enabled(ContextAction::GenerateSelectWithInherited),
            ];
            if connection.can_create_subscription {
                items.push(MenuItem::enabled(ContextAction::Subscribe));
            }
            // CRUD makes no sense on indications
            if !entity.is_indication && entity.has_crud() {
                items.extend([
                    MenuItem {
                        action: ContextAction::Crud(CrudOperation::Create),
                        enabled: entity.can_create,
                    },
                    MenuItem {
                        action: ContextAction::Crud(CrudOperation::Update),
                        enabled: entity.can_update,
                    },
                    MenuItem {
                        action: ContextAction::Crud(CrudOperation::Delete),
                        enabled: entity.can_delete,
                    },
                ]);
            }
            items
        }
        Payload::Provider(_) => {
            let mut items = vec![MenuItem::enabled(ContextAction::Refresh)];
            if connection.can_create_subscription {
                items.push(MenuItem::enabled(ContextAction::ActivityMonitor));
            }
            items.push(MenuItem::enabled(ContextAction::Disconnect));
            items
        }
        Payload::Verb(_) => vec![MenuItem::enabled(ContextAction::Invoke)],
        _ => Vec::new(),
    }
}

/// Whether `action` is listed and enabled for the node.
pub fn is_available(payload: &Payload, connection: &ConnectionInfo, action: ContextAction) -> bool {
    context_actions(payload, connection).iter().any(|item| item.action == action && item.enabled)
}
