//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! Ports define the extension points in the hexagonal architecture.
//! They are traits that adapters implement to integrate with external
//! systems (exchange feeds, HTTP endpoints, WebSocket servers).
//!
//! # Architecture
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │      Application        │
//!                    │  (aggregate, rank,      │
//!                    │   registry, monitor)    │
//!                    └───────────┬─────────────┘
//!                                │ AdapterEvent
//!              ┌─────────────────┼─────────────────┐
//!              ▼                 ▼                 ▼
//!        ┌──────────┐      ┌──────────┐      ┌──────────┐
//!        │   Pull   │      │   Push   │      │   Push   │
//!        │ adapter  │      │ adapter  │      │ adapter  │
//!        └────┬─────┘      └────┬─────┘      └────┬─────┘
//!             ▼                 ▼                 ▼
//!        HttpFetcher       WsConnector       WsConnector
//! ```
//!
//! # Available Ports
//!
//! - [`ExchangeAdapter`], [`AdapterControl`] - Adapter lifecycle protocol
//! - [`EventSink`], [`AdapterEvent`] - Typed event channel from adapters
//! - [`HttpFetcher`], [`WsConnector`], [`WsConnection`] - Transport seams

pub mod outbound;

pub use outbound::adapter::{AdapterControl, AdapterKind, ExchangeAdapter, StartContext};
pub use outbound::event::{AdapterEvent, AdapterPayload, EventSender, EventSink};
pub use outbound::transport::{HttpFetcher, WsConnection, WsConnector, WsFrame};
