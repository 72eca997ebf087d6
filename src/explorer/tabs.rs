//! Requests the explorer makes to the surrounding workspace.

use crate::models::{ConnectionInfo, Entity, Verb};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrudOperation {
    Create,
    Update,
    Delete,
}

impl CrudOperation {
    pub fn label(self) -> &'static str {
        match self {
            CrudOperation::Create => "Create",
            CrudOperation::Update => "Update",
            CrudOperation::Delete => "Delete",
        }
    }
}

/// Opens editor tabs on behalf of the explorer.
pub trait TabsFactory {
    fn open_query_tab(&mut self, query: &str, connection: &ConnectionInfo);
    fn open_invoke_tab(&mut self, connection: &ConnectionInfo, verb: &Verb);
    fn open_crud_tab(
        &mut self,
        operation: CrudOperation,
        connection: &ConnectionInfo,
        entity: &Entity,
    );
    fn open_activity_monitor(&mut self, connection: &ConnectionInfo);
}

/// A recorded tab request.
#[derive(Debug, Clone, PartialEq)]
pub enum TabRequest {
    Query { connection: String, query: String },
    Invoke { connection: String, verb: Verb },
    Crud { connection: String, operation: CrudOperation, entity: String },
    ActivityMonitor { connection: String },
}

/// Collects tab requests instead of opening anything.
#[derive(Debug, Default)]
pub struct TabLog {
    requests: Vec<TabRequest>,
}

impl TabLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> &[TabRequest] {
        &self.requests
    }

    pub fn last(&self) -> Option<&TabRequest> {
        self.requests.last()
    }

    pub fn take(&mut self) -> Vec<TabRequest> {
        std::mem::take(&mut self.requests)
    }
}

impl TabsFactory for TabLog {
    fn open_query_tab(&mut self, query: &str, connection: &ConnectionInfo) {
        log::debug!("Query tab for {}", connection.title);
        self.requests.push(TabRequest::Query {
            connection: connection.title.clone(),
            query: query.to_string(),
        });
    }

    fn open_invoke_tab(&mut self, connection: &ConnectionInfo, verb: &Verb) {
        log::debug!("Invoke tab for {} on {}", verb.qualified_name(), connection.title);
        self.requests
            .push(TabRequest::Invoke { connection: connection.title.clone(), verb: verb.clone() });
    }

    fn open_crud_tab(
        &mut self,
        operation: CrudOperation,
        connection: &ConnectionInfo,
        entity: &Entity,
    ) {
        log::debug!("{} tab for {} on {}", operation.label(), entity.full_name, connection.title);
        self.requests.push(TabRequest::Crud {
            connection: connection.title.clone(),
            operation,
            entity: entity.full_name.clone(),
        });
    }

    fn open_activity_monitor(&mut self, connection: &ConnectionInfo) {
        log::debug!("Activity monitor for {}", connection.title);
        self.requests.push(TabRequest::ActivityMonitor { connection: connection.title.clone() });
    }
}
