//! Factory modules for building infrastructure components.
//!
//! Provides factory functions that construct fully-configured components
//! from application configuration. These factories handle dependency
//! injection and wiring.
//!
//! # Submodules
//!
//! - [`adapter`] - Venue adapters, transports and the monitor

pub mod adapter;

pub use adapter::{build_adapters, build_monitor, build_transports, Transports};

#[cfg(test)]
mod tests;
