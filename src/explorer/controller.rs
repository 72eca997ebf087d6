//! The explorer: one data subtree per connected server, projected into a widget.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{ConnectionInfo, EntitySet, Verb};
use crate::provider::MetadataProvider;
use crate::state::{ExplorerEvent, ExplorerSettings, FilterDebouncer, StatusMessage};
use crate::tree::{
    DataTree, DisplayId, Filter, GroupingMode, NodeId, Payload, Placeholder, Projection,
    TreeProjector, default_style, grouping,
};
use crate::widget::{self, TreeWidget};

use super::actions::{ContextAction, MenuItem, context_actions, is_available};
use super::query::{select_statement, subscribe_statement};
use super::refresh::{RefreshOutcome, RefreshWorker};
use super::tabs::TabsFactory;

/// A connected server.
struct ServerEntry {
    provider: Arc<dyn MetadataProvider>,
    info: ConnectionInfo,
    root: NodeId,
    /// Last successfully loaded snapshot; regrouped on mode changes
    entities: EntitySet,
    /// Ticket of the refresh in flight; outcomes carrying any other ticket are stale
    refresh_ticket: Option<u64>,
    last_refreshed: Option<DateTime<Utc>>,
}

pub struct ExplorerController<W: TreeWidget, T: TabsFactory> {
    data: DataTree,
    projector: TreeProjector,
    widget: W,
    tabs: T,
    servers: Vec<ServerEntry>,
    worker: RefreshWorker,
    filter: Option<Filter>,
    grouping: GroupingMode,
    debouncer: FilterDebouncer,
    status: Option<StatusMessage>,
    events: Vec<ExplorerEvent>,
}

impl<W: TreeWidget, T: TabsFactory> ExplorerController<W, T> {
    pub fn new(widget: W, tabs: T, settings: &ExplorerSettings) -> Result<Self> {
        Ok(Self {
            data: DataTree::new(),
            projector: TreeProjector::new(),
            widget,
            tabs,
            servers: Vec::new(),
            worker: RefreshWorker::new()?,
            filter: None,
            grouping: settings.grouping_mode,
            debouncer: FilterDebouncer::new(settings.filter_debounce()),
            status: None,
            events: Vec::new(),
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn widget(&self) -> &W {
        &self.widget
    }

    pub fn tabs(&self) -> &T {
        &self.tabs
    }

    pub fn tabs_mut(&mut self) -> &mut T {
        &mut self.tabs
    }

    pub fn data(&self) -> &DataTree {
        &self.data
    }

    pub fn projection(&self) -> &Projection {
        self.projector.projection()
    }

    pub fn filter(&self) -> Option<&Filter> {
        self.filter.as_ref()
    }

    pub fn grouping_mode(&self) -> GroupingMode {
        self.grouping
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    /// Drain events emitted since the last call.
    pub fn take_events(&mut self) -> Vec<ExplorerEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn connections(&self) -> Vec<ConnectionInfo> {
        self.servers.iter().map(|server| server.info.clone()).collect()
    }

    pub fn server_node(&self, connection: Uuid) -> Option<NodeId> {
        self.server(connection).map(|server| server.root)
    }

    pub fn is_refreshing(&self, connection: Uuid) -> bool {
        self.server(connection).is_some_and(|server| server.refresh_ticket.is_some())
    }

    pub fn last_refreshed(&self, connection: Uuid) -> Option<DateTime<Utc>> {
        self.server(connection).and_then(|server| server.last_refreshed)
    }

    /// Display node currently bound to `node`, if shown.
    pub fn display_of(&self, node: NodeId) -> Option<DisplayId> {
        self.projector.bindings().find_display_node(node)
    }

    /// Actions for the node behind `display`.
    pub fn context_actions(&self, display: DisplayId) -> Vec<MenuItem> {
        let node = self.projector.bindings().find_data_node(display);
        match self.server_for_node(node) {
            Some(server) => context_actions(self.data[node].payload(), &server.info),
            None => Vec::new(),
        }
    }

    fn server(&self, connection: Uuid) -> Option<&ServerEntry> {
        self.servers.iter().find(|server| server.info.id == connection)
    }

    fn server_mut(&mut self, connection: Uuid) -> Option<&mut ServerEntry> {
        self.servers.iter_mut().find(|server| server.info.id == connection)
    }

    fn server_for_node(&self, node: NodeId) -> Option<&ServerEntry> {
        let root = self.data.root_of(node)?;
        self.servers.iter().find(|server| server.root == root)
    }

    fn set_status(&mut self, status: StatusMessage) {
        self.status = Some(status);
    }

    // =========================================================================
    // Projection
    // =========================================================================

    /// Re-project the data tree and repopulate the widget.
    fn rebuild(&mut self) {
        self.projector.begin_update();
        self.projector.rebuild(&mut self.data, self.filter.as_ref(), default_style);
        let (data, servers) = (&self.data, &self.servers);
        widget::populate(&mut self.widget, self.projector.projection(), data, |node| {
            let root = data.root_of(node)?;
            servers.iter().find(|server| server.root == root).map(|server| &server.info)
        });
        self.projector.end_update();
    }

    // =========================================================================
    // Servers
    // =========================================================================

    /// Add a server and start its first refresh. A provider whose name is already
    /// shown only selects the existing node.
    pub fn add_server(&mut self, provider: Arc<dyn MetadataProvider>) -> Result<Uuid> {
        let name = provider.name();
        if let Some(existing) = self.data.find_root(&name)
            && let Some(server) = self.servers.iter().find(|server| server.root == existing)
        {
            let connection = server.info.id;
            log::debug!("Server {name} already connected; selecting it");
            self.projector.select_data(Some(existing), &mut self.data);
            self.rebuild();
            return Ok(connection);
        }

        let info = provider.connection_info();
        let connection = info.id;
        let root = self.data.add_root(Payload::Provider(name.clone()), name.as_str());
        self.servers.push(ServerEntry {
            provider,
            info,
            root,
            entities: EntitySet::default(),
            refresh_ticket: None,
            last_refreshed: None,
        });
        self.projector.select_data(Some(root), &mut self.data);
        log::info!("Added server {name} ({connection})");
        self.events.push(ExplorerEvent::ServerAdded(connection));

        self.refresh_server(connection)?;
        Ok(connection)
    }

    /// Replace the server's subtree with a `Refreshing...` placeholder and refresh
    /// the provider off-thread. Completion is applied by [`pump`](Self::pump).
    pub fn refresh_server(&mut self, connection: Uuid) -> Result<()> {
        let server = self.server_mut(connection).ok_or(Error::UnknownConnection(connection))?;
        if server.refresh_ticket.is_some() {
            log::warn!("Refresh of {} rejected: already in progress", server.info.title);
            return Err(Error::RefreshInProgress(server.info.title.clone()));
        }
        let root = server.root;
        let title = server.info.title.clone();
        let provider = Arc::clone(&server.provider);

        self.data.clear_children(root);
        self.data.append(root, Payload::Placeholder(Placeholder::Refreshing));
        let ticket = self.worker.spawn(connection, provider);
        if let Some(server) = self.server_mut(connection) {
            server.refresh_ticket = Some(ticket);
        }

        log::info!("Refreshing {title}");
        self.set_status(StatusMessage::info(format!("Refreshing {title}...")).about(connection));
        self.events.push(ExplorerEvent::RefreshStarted(connection));
        self.rebuild();
        Ok(())
    }

    /// Refresh every server that is not already refreshing.
    pub fn refresh_all_servers(&mut self) -> Result<()> {
        let idle: Vec<Uuid> = self
            .servers
            .iter()
            .filter(|server| server.refresh_ticket.is_none())
            .map(|server| server.info.id)
            .collect();
        for connection in idle {
            self.refresh_server(connection)?;
        }
        Ok(())
    }

    /// Remove a server and its subtree. A refresh still in flight is discarded
    /// when it completes.
    pub fn close_server(&mut self, connection: Uuid) -> Result<()> {
        let index = self
            .servers
            .iter()
            .position(|server| server.info.id == connection)
            .ok_or(Error::UnknownConnection(connection))?;
        let server = self.servers.remove(index);
        self.data.remove(server.root);

        log::info!("Closed server {}", server.info.title);
        let text = format!("Disconnected from {}", server.info.title);
        self.set_status(StatusMessage::info(text).about(connection));
        self.events.push(ExplorerEvent::ServerClosed(connection));
        self.rebuild();
        Ok(())
    }

    /// Apply every refresh that has finished. Returns how many were applied; stale
    /// outcomes are dropped and not counted.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Some(outcome) = self.worker.try_recv() {
            if self.apply_refresh(outcome) {
                applied += 1;
            }
        }
        applied
    }

    /// Refreshes spawned whose outcome has not been received yet, stale ones included.
    pub fn pending_refreshes(&self) -> usize {
        self.worker.in_flight()
    }

    /// Block until no refresh is in flight or `timeout` passes. Returns whether
    /// everything finished.
    pub fn wait_for_refresh(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.worker.in_flight() > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return false;
            }
            match self.worker.recv_timeout(remaining) {
                Some(outcome) => {
                    self.apply_refresh(outcome);
                }
                None => return false,
            }
        }
        true
    }

    /// Apply one outcome if it belongs to the refresh its server is waiting for.
    fn apply_refresh(&mut self, outcome: RefreshOutcome) -> bool {
        let RefreshOutcome { connection, ticket, result, finished_at } = outcome;
        let mode = self.grouping;
        let Some(server) = self.server_mut(connection) else {
            log::debug!("Dropping refresh of closed connection {connection}");
            return false;
        };
        if server.refresh_ticket != Some(ticket) {
            log::debug!("Dropping stale refresh {ticket} of {}", server.info.title);
            return false;
        }
        server.refresh_ticket = None;
        let root = server.root;
        let title = server.info.title.clone();

        match result {
            Ok(tables) => {
                server.entities = EntitySet::new(tables);
                server.last_refreshed = Some(finished_at);
                let count = server.entities.len();
                let specs = grouping::build(&server.entities, mode);

                self.data.clear_children(root);
                self.data.graft(root, specs);
                if mode == GroupingMode::ByHierarchy {
                    self.data.set_expanded(root, true);
                }

                log::info!("Loaded {count} entities from {title}");
                let text = format!("Loaded {count} entities from {title}");
                self.set_status(StatusMessage::info(text).about(connection));
                self.events.push(ExplorerEvent::RefreshCompleted { connection, entities: count });
            }
            Err(err) => {
                self.data.clear_children(root);
                log::error!("Failed to refresh {title}: {err}");
                let text = format!("Failed to refresh {title}: {err}");
                self.set_status(StatusMessage::error(text).about(connection));
                let error = err.to_string();
                self.events.push(ExplorerEvent::RefreshFailed { connection, error });
            }
        }
        self.rebuild();
        true
    }

    // =========================================================================
    // Filter and grouping
    // =========================================================================

    /// Apply filter text immediately. Blank text clears the filter.
    pub fn set_filter(&mut self, text: &str) {
        self.debouncer.cancel();
        let filter = Filter::parse(Some(text));
        if filter == self.filter {
            return;
        }
        log::debug!("Filter set to {:?}", filter.as_ref().map(Filter::as_str));
        self.events
            .push(ExplorerEvent::FilterApplied(filter.as_ref().map(|f| f.as_str().to_string())));
        self.filter = filter;
        self.rebuild();
    }

    /// Typed search text; applied by [`tick`](Self::tick) once input goes quiet.
    pub fn search_text_changed(&mut self, text: &str, now: Instant) {
        self.debouncer.push(text, now);
    }

    /// Apply debounced search text if its quiet period is over.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.debouncer.poll(now) {
            Some(text) => {
                self.set_filter(&text);
                true
            }
            None => false,
        }
    }

    pub fn focus_search(&mut self) {
        self.widget.focus_search();
    }

    /// Regroup every loaded server. Servers still refreshing pick the mode up when
    /// their refresh completes.
    pub fn set_grouping_mode(&mut self, mode: GroupingMode) {
        if mode == self.grouping {
            return;
        }
        self.grouping = mode;
        for server in &self.servers {
            if server.refresh_ticket.is_some() {
                continue;
            }
            self.data.clear_children(server.root);
            self.data.graft(server.root, grouping::build(&server.entities, mode));
            if mode == GroupingMode::ByHierarchy {
                self.data.set_expanded(server.root, true);
            }
        }
        log::info!("Grouping set to {}", mode.label());
        self.events.push(ExplorerEvent::GroupingChanged(mode));
        self.rebuild();
    }

    // =========================================================================
    // Interaction
    // =========================================================================

    /// Expand or collapse from the widget. Expanding a verb re-fetches its arguments.
    pub fn on_expanded(&mut self, display: DisplayId, expanded: bool) {
        let node = self.projector.bindings().find_data_node(display);
        self.projector.record_expansion(display, expanded, &mut self.data);
        self.widget.set_expanded(display, expanded);

        if expanded && self.data[node].payload().as_verb().is_some() {
            self.load_verb_arguments(node);
        }
    }

    pub fn on_selected(&mut self, display: Option<DisplayId>) {
        self.projector.select(display, &mut self.data);
        self.widget.set_selected(display);
    }

    pub fn on_double_click(&mut self, display: DisplayId) {
        let node = self.projector.bindings().find_data_node(display);
        let Some(server) = self.server_for_node(node) else {
            return;
        };
        let info = server.info.clone();

        match self.data[node].payload().clone() {
            Payload::Entity(entity) => {
                let include_inherited = !entity.is_indication && entity.is_abstract;
                self.tabs.open_query_tab(&select_statement(&entity, include_inherited), &info);
            }
            Payload::Provider(_) => {
                if info.can_create_subscription {
                    self.tabs.open_activity_monitor(&info);
                }
            }
            Payload::Verb(verb) => self.invoke_verb(&verb, &info, node),
            _ => {}
        }
    }

    /// Run a context action on the node behind `display`. Actions the node does not
    /// offer are ignored.
    pub fn run_action(&mut self, display: DisplayId, action: ContextAction) -> Result<()> {
        let node = self.projector.bindings().find_data_node(display);
        let Some(server) = self.server_for_node(node) else {
            return Ok(());
        };
        let info = server.info.clone();
        let payload = self.data[node].payload().clone();
        if !is_available(&payload, &info, action) {
            log::warn!("Action {} is not available on {}", action.label(), self.data[node].label());
            return Ok(());
        }

        match (action, payload) {
            (ContextAction::GenerateSelect, Payload::Entity(entity)) => {
                self.tabs.open_query_tab(&select_statement(&entity, false), &info);
            }
            (ContextAction::GenerateSelectWithInherited, Payload::Entity(entity)) => {
                self.tabs.open_query_tab(&select_statement(&entity, true), &info);
            }
            (ContextAction::Subscribe, Payload::Entity(entity)) => {
                self.tabs.open_query_tab(&subscribe_statement(&entity), &info);
            }
            (ContextAction::Crud(operation), Payload::Entity(entity)) => {
                self.tabs.open_crud_tab(operation, &info, &entity);
            }
            (ContextAction::Refresh, Payload::Provider(_)) => self.refresh_server(info.id)?,
            (ContextAction::ActivityMonitor, Payload::Provider(_)) => {
                self.tabs.open_activity_monitor(&info);
            }
            (ContextAction::Disconnect, Payload::Provider(_)) => self.close_server(info.id)?,
            (ContextAction::Invoke, Payload::Verb(verb)) => self.invoke_verb(&verb, &info, node),
            _ => {}
        }
        Ok(())
    }

    // =========================================================================
    // Verbs
    // =========================================================================

    fn provider_for_node(&self, node: NodeId) -> Option<Arc<dyn MetadataProvider>> {
        self.server_for_node(node).map(|server| Arc::clone(&server.provider))
    }

    /// Replace the verb's children with freshly fetched argument nodes. On failure the
    /// placeholder stays.
    fn load_verb_arguments(&mut self, node: NodeId) {
        let Some(verb) = self.data[node].payload().as_verb().cloned() else {
            return;
        };
        let Some(provider) = self.provider_for_node(node) else {
            return;
        };

        match provider.verb_arguments(&verb) {
            Ok(arguments) => {
                let count = arguments.len();
                self.data.clear_children(node);
                for argument in arguments {
                    self.data.append(node, Payload::VerbArgument(argument));
                }
                log::debug!("Loaded {count} arguments for {}", verb.qualified_name());
                self.events.push(ExplorerEvent::VerbArgumentsLoaded {
                    verb: verb.qualified_name(),
                    count,
                });
                self.rebuild();
            }
            Err(err) => {
                log::error!("Failed to load arguments of {}: {err}", verb.qualified_name());
                self.set_status(StatusMessage::error(format!(
                    "Failed to load arguments of {}: {err}",
                    verb.name
                )));
                self.events.push(ExplorerEvent::VerbArgumentsFailed {
                    verb: verb.qualified_name(),
                    error: err.to_string(),
                });
            }
        }
    }

    /// Open an invoke tab; arguments are fetched first when the verb carries none.
    fn invoke_verb(&mut self, verb: &Arc<Verb>, info: &ConnectionInfo, node: NodeId) {
        if !verb.arguments.is_empty() {
            self.tabs.open_invoke_tab(info, verb);
            return;
        }
        let Some(provider) = self.provider_for_node(node) else {
            return;
        };
        match provider.verb_arguments(verb) {
            Ok(arguments) => {
                let verb = Verb { arguments, ..Verb::clone(verb) };
                self.tabs.open_invoke_tab(info, &verb);
            }
            Err(err) => {
                log::error!("Failed to load arguments of {}: {err}", verb.qualified_name());
                self.set_status(StatusMessage::error(format!(
                    "Failed to load arguments of {}: {err}",
                    verb.name
                )));
            }
        }
    }
}
