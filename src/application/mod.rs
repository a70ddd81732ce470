//! Application services (use cases).
//!
//! These services merge adapter output into ranked opportunities and
//! coordinate adapter lifecycle.
//!
//! - [`aggregator`] - Per-adapter snapshots and the ranking algorithm
//! - [`registry`] - Enable/disable control with the enabled floor
//! - [`monitor`] - The aggregation task and its dashboard view

pub mod aggregator;
pub mod monitor;
pub mod registry;

pub use aggregator::{rank, Aggregator};
pub use monitor::{
    AdapterState, DashboardView, FundingMonitor, MonitorCommand, MonitorHandle, MonitorSettings,
};
pub use registry::{AdapterInfo, AdapterRegistry, MIN_ENABLED};
