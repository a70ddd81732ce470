//! Infrastructure configuration modules.

pub mod logging;
pub mod monitor;
pub mod settings;
pub mod venues;

pub use logging::LoggingConfig;
pub use monitor::{MonitorConfig, REFRESH_INTERVAL_CHOICES};
pub use settings::Config;
pub use venues::{LighterEndpoint, VenueEndpoint, VenuesConfig};
