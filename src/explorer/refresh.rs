//! Off-thread provider refresh.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::runtime::Runtime;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::Entity;
use crate::provider::MetadataProvider;

/// Result of one refresh, delivered back to the UI thread.
#[derive(Debug)]
pub struct RefreshOutcome {
    pub connection: Uuid,
    /// Ticket returned by the [`RefreshWorker::spawn`] call that produced this outcome
    pub ticket: u64,
    pub result: Result<Vec<Arc<Entity>>>,
    pub finished_at: DateTime<Utc>,
}

/// Runs `MetadataProvider::refresh` on a Tokio blocking pool and queues outcomes.
pub struct RefreshWorker {
    /// Tokio runtime for blocking provider calls
    runtime: Runtime,
    sender: UnboundedSender<RefreshOutcome>,
    receiver: UnboundedReceiver<RefreshOutcome>,
    in_flight: usize,
    next_ticket: u64,
}

impl RefreshWorker {
    pub fn new() -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("schemascope-refresh")
            .enable_time()
            .build()?;
        let (sender, receiver) = unbounded_channel();
        Ok(Self { runtime, sender, receiver, in_flight: 0, next_ticket: 0 })
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Start a refresh and return its ticket; tickets are never reused. The snapshot is
    /// read on the worker right after `refresh` returns so the UI thread never blocks on
    /// the provider.
    pub fn spawn(&mut self, connection: Uuid, provider: Arc<dyn MetadataProvider>) -> u64 {
        let sender = self.sender.clone();
        self.in_flight += 1;
        self.next_ticket += 1;
        let ticket = self.next_ticket;
        self.runtime.spawn(async move {
            let result = tokio::task::spawn_blocking(move || -> Result<Vec<Arc<Entity>>> {
                provider.refresh()?;
                Ok(provider.tables())
            })
            .await
            .unwrap_or_else(|err| Err(Error::Provider(format!("Refresh task failed: {err}"))));

            let outcome = RefreshOutcome { connection, ticket, result, finished_at: Utc::now() };
            if sender.send(outcome).is_err() {
                log::debug!("Refresh of {connection} finished after the explorer went away");
            }
        });
        ticket
    }

    /// Next finished refresh, without waiting.
    pub fn try_recv(&mut self) -> Option<RefreshOutcome> {
        let outcome = self.receiver.try_recv().ok()?;
        self.in_flight = self.in_flight.saturating_sub(1);
        Some(outcome)
    }

    /// Next finished refresh, waiting at most `timeout`.
    pub fn recv_timeout(&mut self, timeout: Duration) -> Option<RefreshOutcome> {
        if self.in_flight == 0 {
            return self.try_recv();
        }
        let receiver = &mut self.receiver;
        let outcome = self.runtime.block_on(async {
            tokio::time::timeout(timeout, receiver.recv()).await.ok().flatten()
        })?;
        self.in_flight = self.in_flight.saturating_sub(1);
        Some(outcome)
    }
}
