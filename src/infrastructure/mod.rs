//! Infrastructure layer.
//!
//! Provides technical concerns that support the application without
//! containing business logic: configuration loading and component wiring.
//!
//! # Submodules
//!
//! - [`config`] - Configuration loading and validation
//! - [`factory`] - Adapter, transport and monitor construction

pub mod config;
pub mod factory;
