//! fundarb - cross-exchange funding-rate arbitrage monitor.
//!
//! Streams and polls perpetual funding rates from several venues, normalizes
//! them to a one-hour basis, and ranks long/short pairings per symbol by the
//! hourly rate difference.
//!
//! # Architecture
//!
//! The crate follows a hexagonal layout:
//!
//! - [`domain`] - Exchange-agnostic types: funding readings, statuses, rows
//! - [`port`] - Adapter protocol, event channel and transport seams
//! - [`adapter`] - Venue adapters (outbound) and the CLI (inbound)
//! - [`application`] - Aggregation, ranking, the registry and the monitor task
//! - [`infrastructure`] - Configuration and the adapter factory
//! - [`error`] - Error types for the crate
//!
//! # Venues
//!
//! | Id | Kind | Period |
//! |---|---|---|
//! | `lighter` | push | 1h |
//! | `edgex` | push | from funding timestamps |
//! | `backpack` | pull | 1h |
//! | `paradex` | push | reported hours or 8h |
//! | `hyperliquid` | pull | reported or 8h |
//!
//! # Example
//!
//! ```no_run
//! use fundarb::infrastructure::config::Config;
//! use fundarb::infrastructure::factory::{build_monitor, build_transports};
//!
//! # async fn demo() -> fundarb::error::Result<()> {
//! let config = Config::default();
//! let transports = build_transports()?;
//! let (monitor, handle) = build_monitor(&config, &transports);
//! tokio::spawn(monitor.run());
//! let view = handle.view();
//! println!("{} rows", view.rows.len());
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
