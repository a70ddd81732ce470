//! Outbound ports: how the application talks to exchange feeds.

pub mod adapter;
pub mod event;
pub mod transport;
