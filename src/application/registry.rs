//! Adapter registry and enable/disable control.
//!
//! The registry owns every registered adapter and the control handle of each
//! running one. Enabling starts an adapter with a fresh session number;
//! disabling stops it. At least [`MIN_ENABLED`] adapters stay enabled: a
//! disable that would go below the floor is a no-op.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::domain::AdapterId;
use crate::error::{Error, Result};
use crate::port::{
    AdapterControl, AdapterKind, EventSender, EventSink, ExchangeAdapter, StartContext,
};

/// Lowest permitted number of enabled adapters.
pub const MIN_ENABLED: usize = 2;

/// Registration details of one adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdapterInfo {
    pub id: AdapterId,
    pub label: &'static str,
    pub kind: AdapterKind,
    pub enabled: bool,
}

struct Running {
    session: u64,
    control: Arc<dyn AdapterControl>,
}

/// Registered adapters and the running subset.
pub struct AdapterRegistry {
    adapters: Vec<Arc<dyn ExchangeAdapter>>,
    running: HashMap<AdapterId, Running>,
    events: EventSender,
    min_enabled: usize,
    interval_secs: u64,
    next_session: u64,
}

impl AdapterRegistry {
    /// Create a registry publishing onto `events`.
    ///
    /// `min_enabled` is raised to [`MIN_ENABLED`] if lower.
    #[must_use]
    pub fn new(events: EventSender, min_enabled: usize, interval_secs: u64) -> Self {
        Self {
            adapters: Vec::new(),
            running: HashMap::new(),
            events,
            min_enabled: min_enabled.max(MIN_ENABLED),
            interval_secs,
            next_session: 1,
        }
    }

    /// Add an adapter. A second adapter with an existing id is ignored.
    pub fn register(&mut self, adapter: Arc<dyn ExchangeAdapter>) {
        if self.find(adapter.id()).is_some() {
            debug!(adapter = %adapter.id(), "Adapter already registered");
            return;
        }
        self.adapters.push(adapter);
    }

    #[must_use]
    pub const fn min_enabled(&self) -> usize {
        self.min_enabled
    }

    #[must_use]
    pub const fn interval_secs(&self) -> u64 {
        self.interval_secs
    }

    /// All registered adapters in registration order.
    #[must_use]
    pub fn adapters(&self) -> Vec<AdapterInfo> {
        self.adapters
            .iter()
            .map(|a| AdapterInfo {
                id: a.id().clone(),
                label: a.label(),
                kind: a.kind(),
                enabled: self.is_enabled(a.id()),
            })
            .collect()
    }

    /// Enabled adapter ids in registration order.
    #[must_use]
    pub fn enabled_ids(&self) -> Vec<AdapterId> {
        self.adapters
            .iter()
            .map(|a| a.id())
            .filter(|id| self.running.contains_key(*id))
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn enabled_count(&self) -> usize {
        self.running.len()
    }

    #[must_use]
    pub fn is_enabled(&self, id: &AdapterId) -> bool {
        self.running.contains_key(id)
    }

    /// Whether `session` is the live run of `id`.
    #[must_use]
    pub fn is_current(&self, id: &AdapterId, session: u64) -> bool {
        self.running.get(id).is_some_and(|r| r.session == session)
    }

    /// Start `id` if it is not running. Returns `true` if it was started.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownAdapter`] if no adapter has that id.
    pub fn enable(&mut self, id: &AdapterId) -> Result<bool> {
        let adapter = self
            .find(id)
            .cloned()
            .ok_or_else(|| Error::UnknownAdapter(id.to_string()))?;
        if self.running.contains_key(id) {
            return Ok(false);
        }

        let session = self.next_session;
        self.next_session += 1;

        let sink = EventSink::new(id.clone(), session, self.events.clone());
        let control = adapter.start(StartContext {
            sink,
            interval_secs: self.interval_secs,
        });
        self.running.insert(id.clone(), Running { session, control });

        info!(adapter = %id, session, "Adapter enabled");
        Ok(true)
    }

    /// Stop `id`. Returns `true` if it was stopped.
    ///
    /// Disabling an adapter that is not running, or one that would leave
    /// fewer than the floor enabled, changes nothing and returns `false`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownAdapter`] if no adapter has that id.
    pub fn disable(&mut self, id: &AdapterId) -> Result<bool> {
        if self.find(id).is_none() {
            return Err(Error::UnknownAdapter(id.to_string()));
        }
        if !self.running.contains_key(id) {
            return Ok(false);
        }
        if self.running.len() <= self.min_enabled {
            info!(
                adapter = %id,
                enabled = self.running.len(),
                min_enabled = self.min_enabled,
                "Disable rejected: enabled floor reached"
            );
            return Ok(false);
        }

        if let Some(running) = self.running.remove(id) {
            running.control.stop();
        }
        info!(adapter = %id, "Adapter disabled");
        Ok(true)
    }

    /// Change the polling cadence of every running adapter and of future starts.
    pub fn set_interval(&mut self, secs: u64) {
        self.interval_secs = secs;
        for running in self.running.values() {
            running.control.set_interval_secs(secs);
        }
        debug!(interval_secs = secs, "Refresh interval updated");
    }

    /// Control handles of every running adapter.
    #[must_use]
    pub fn controls(&self) -> Vec<Arc<dyn AdapterControl>> {
        self.running
            .values()
            .map(|r| Arc::clone(&r.control))
            .collect()
    }

    /// Stop every running adapter, ignoring the floor.
    pub fn stop_all(&mut self) {
        for (id, running) in self.running.drain() {
            running.control.stop();
            debug!(adapter = %id, "Adapter stopped");
        }
    }

    fn find(&self, id: &AdapterId) -> Option<&Arc<dyn ExchangeAdapter>> {
        self.adapters.iter().find(|a| a.id() == id)
    }
}

impl Drop for AdapterRegistry {
    fn drop(&mut self) {
        self.stop_all();
    }
}
