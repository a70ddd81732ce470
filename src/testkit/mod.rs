//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`http`]: `StubFetcher`, a scripted [`HttpFetcher`](crate::port::HttpFetcher)
//!   with an optional gate for holding responses back.
//! - [`ws`]: `ScriptedConnector`, a [`WsConnector`](crate::port::WsConnector)
//!   that plays back frames per connection and records what was sent.
//! - [`adapter`]: `RecordingAdapter`, an in-memory adapter for registry and
//!   monitor tests.
//! - [`domain`]: Builders for funding data and event channels.
//! - [`config`]: Canonical test configurations.

pub mod adapter;
pub mod config;
pub mod domain;
pub mod http;
pub mod ws;
