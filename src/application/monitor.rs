//! The aggregation task.
//!
//! [`FundingMonitor`] is the single consumer of adapter events. It owns the
//! [`AdapterRegistry`] and the [`Aggregator`], applies [`MonitorCommand`]s,
//! and publishes a fresh [`DashboardView`] over a watch channel after every
//! accepted change.
//!
//! Events are accepted only from the live session of an enabled adapter, so
//! anything queued by a stopped run is discarded on arrival.

use std::collections::HashMap;
use std::ops::ControlFlow;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use serde::Serialize;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, trace, warn};

use super::aggregator::Aggregator;
use super::registry::AdapterRegistry;
use crate::domain::{AdapterId, AdapterStatus, ArbitrageRow, RankingPolicy};
use crate::error::{Error, Result};
use crate::port::{AdapterEvent, AdapterKind, AdapterPayload, ExchangeAdapter};

/// Requests accepted by a running [`FundingMonitor`].
#[derive(Debug)]
pub enum MonitorCommand {
    Enable {
        id: AdapterId,
        reply: oneshot::Sender<Result<bool>>,
    },
    Disable {
        id: AdapterId,
        reply: oneshot::Sender<Result<bool>>,
    },
    SetInterval {
        secs: u64,
    },
    /// Refresh every running adapter; `done` fires once all have settled.
    RefreshAll {
        done: oneshot::Sender<()>,
    },
    Shutdown,
}

/// Status line of one enabled adapter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdapterState {
    pub id: AdapterId,
    pub label: &'static str,
    pub kind: AdapterKind,
    pub status: AdapterStatus,
}

/// Everything a front end needs to render the board.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DashboardView {
    /// Ranked rows, best first.
    pub rows: Vec<ArbitrageRow>,
    /// Enabled adapters in registration order.
    pub adapters: Vec<AdapterState>,
    pub enabled: Vec<AdapterId>,
    pub interval_secs: u64,
    pub ranking: RankingPolicy,
    /// When data last changed or a source was removed.
    pub last_update: Option<DateTime<Utc>>,
}

/// Startup parameters for a [`FundingMonitor`].
#[derive(Debug, Clone)]
pub struct MonitorSettings {
    pub ranking: RankingPolicy,
    pub interval_secs: u64,
    pub min_enabled: usize,
    /// Adapters enabled when the task starts.
    pub enabled: Vec<AdapterId>,
}

/// Cloneable front end to a running monitor.
#[derive(Debug, Clone)]
pub struct MonitorHandle {
    commands: mpsc::UnboundedSender<MonitorCommand>,
    view: watch::Receiver<DashboardView>,
}

impl MonitorHandle {
    /// Enable an adapter. Returns `true` if it was started.
    ///
    /// # Errors
    ///
    /// Fails for unknown ids or if the monitor has stopped.
    pub async fn enable(&self, id: AdapterId) -> Result<bool> {
        let (reply, rx) = oneshot::channel();
        self.send(MonitorCommand::Enable { id, reply })?;
        rx.await.map_err(|_| Error::MonitorStopped)?
    }

    /// Disable an adapter. Returns `false` when rejected by the enabled floor.
    ///
    /// # Errors
    ///
    /// Fails for unknown ids or if the monitor has stopped.
    pub async fn disable(&self, id: AdapterId) -> Result<bool> {
        let (reply, rx) = oneshot::channel();
        self.send(MonitorCommand::Disable { id, reply })?;
        rx.await.map_err(|_| Error::MonitorStopped)?
    }

    /// Change the refresh interval; `0` turns polling off.
    ///
    /// # Errors
    ///
    /// Fails if the monitor has stopped.
    pub fn set_interval(&self, secs: u64) -> Result<()> {
        self.send(MonitorCommand::SetInterval { secs })
    }

    /// Refresh every running adapter and wait until all have settled.
    ///
    /// # Errors
    ///
    /// Fails if the monitor has stopped.
    pub async fn refresh_all(&self) -> Result<()> {
        let (done, rx) = oneshot::channel();
        self.send(MonitorCommand::RefreshAll { done })?;
        rx.await.map_err(|_| Error::MonitorStopped)
    }

    /// Ask the monitor to stop all adapters and exit.
    pub fn shutdown(&self) {
        let _ = self.commands.send(MonitorCommand::Shutdown);
    }

    /// Receiver that observes every published view.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<DashboardView> {
        self.view.clone()
    }

    /// The latest published view.
    #[must_use]
    pub fn view(&self) -> DashboardView {
        self.view.borrow().clone()
    }

    fn send(&self, command: MonitorCommand) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| Error::MonitorStopped)
    }
}

/// Single task that aggregates adapter events into ranked rows.
pub struct FundingMonitor {
    registry: AdapterRegistry,
    aggregator: Aggregator,
    statuses: HashMap<AdapterId, AdapterStatus>,
    ranking: RankingPolicy,
    initial: Vec<AdapterId>,
    last_update: Option<DateTime<Utc>>,
    events: mpsc::UnboundedReceiver<AdapterEvent>,
    commands: mpsc::UnboundedReceiver<MonitorCommand>,
    view: watch::Sender<DashboardView>,
}

impl FundingMonitor {
    /// Build a monitor over `adapters`. Nothing starts until [`run`](Self::run).
    #[must_use]
    pub fn new(
        adapters: Vec<Arc<dyn ExchangeAdapter>>,
        settings: MonitorSettings,
    ) -> (Self, MonitorHandle) {
        let (events_tx, events) = mpsc::unbounded_channel();
        let (commands_tx, commands) = mpsc::unbounded_channel();

        let mut registry =
            AdapterRegistry::new(events_tx, settings.min_enabled, settings.interval_secs);
        for adapter in adapters {
            registry.register(adapter);
        }

        let (view_tx, view_rx) = watch::channel(DashboardView {
            interval_secs: settings.interval_secs,
            ranking: settings.ranking,
            ..DashboardView::default()
        });

        let monitor = Self {
            registry,
            aggregator: Aggregator::new(),
            statuses: HashMap::new(),
            ranking: settings.ranking,
            initial: settings.enabled,
            last_update: None,
            events,
            commands,
            view: view_tx,
        };
        let handle = MonitorHandle {
            commands: commands_tx,
            view: view_rx,
        };
        (monitor, handle)
    }

    /// Start the initial adapters and process events until shut down.
    ///
    /// Returns after a [`MonitorCommand::Shutdown`] or once every handle is
    /// dropped. All adapters are stopped before returning.
    pub async fn run(mut self) {
        self.start_initial();
        self.publish();

        loop {
            tokio::select! {
                biased;

                command = self.commands.recv() => {
                    let Some(command) = command else {
                        debug!("All monitor handles dropped");
                        break;
                    };
                    if self.handle_command(command).is_break() {
                        break;
                    }
                }
                Some(event) = self.events.recv() => {
                    if self.handle_event(event) {
                        self.publish();
                    }
                }
            }
        }

        self.registry.stop_all();
        self.statuses.clear();
        self.publish();
        info!("Funding monitor stopped");
    }

    fn start_initial(&mut self) {
        for id in std::mem::take(&mut self.initial) {
            match self.registry.enable(&id) {
                Ok(_) => {
                    self.statuses.entry(id).or_default();
                }
                Err(e) => warn!(adapter = %id, error = %e, "Could not enable adapter"),
            }
        }
        info!(
            enabled = self.registry.enabled_count(),
            ranking = %self.ranking,
            interval_secs = self.registry.interval_secs(),
            "Funding monitor started"
        );
    }

    /// Apply one adapter event. Returns `true` if the view changed.
    fn handle_event(&mut self, event: AdapterEvent) -> bool {
        let AdapterEvent {
            adapter_id,
            session,
            payload,
        } = event;

        if !self.registry.is_current(&adapter_id, session) {
            trace!(adapter = %adapter_id, session, "Dropping event from stale session");
            return false;
        }

        match payload {
            AdapterPayload::Data(list) => {
                trace!(adapter = %adapter_id, count = list.len(), "Snapshot replaced");
                self.aggregator.replace(adapter_id, list);
                self.last_update = Some(Utc::now());
                true
            }
            AdapterPayload::Status(status) => {
                self.statuses.insert(adapter_id, status) != Some(status)
            }
        }
    }

    fn handle_command(&mut self, command: MonitorCommand) -> ControlFlow<()> {
        match command {
            MonitorCommand::Enable { id, reply } => {
                let result = self.registry.enable(&id);
                if matches!(result, Ok(true)) {
                    self.statuses.insert(id, AdapterStatus::Idle);
                    self.publish();
                }
                let _ = reply.send(result);
            }
            MonitorCommand::Disable { id, reply } => {
                let result = self.registry.disable(&id);
                if matches!(result, Ok(true)) {
                    self.aggregator.remove(&id);
                    self.statuses.remove(&id);
                    self.last_update = Some(Utc::now());
                    self.publish();
                }
                let _ = reply.send(result);
            }
            MonitorCommand::SetInterval { secs } => {
                self.registry.set_interval(secs);
                self.publish();
            }
            MonitorCommand::RefreshAll { done } => {
                let controls = self.registry.controls();
                debug!(adapters = controls.len(), "Refreshing all adapters");
                tokio::spawn(async move {
                    join_all(controls.iter().map(|c| c.manual_refresh())).await;
                    let _ = done.send(());
                });
            }
            MonitorCommand::Shutdown => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }

    fn build_view(&self) -> DashboardView {
        let adapters = self
            .registry
            .adapters()
            .into_iter()
            .filter(|info| info.enabled)
            .map(|info| AdapterState {
                status: self.statuses.get(&info.id).copied().unwrap_or_default(),
                id: info.id,
                label: info.label,
                kind: info.kind,
            })
            .collect();

        DashboardView {
            rows: self.aggregator.rank(self.ranking),
            adapters,
            enabled: self.registry.enabled_ids(),
            interval_secs: self.registry.interval_secs(),
            ranking: self.ranking,
            last_update: self.last_update,
        }
    }

    fn publish(&self) {
        self.view.send_replace(self.build_view());
    }
}
