//! Exchange-agnostic domain types.

pub mod arbitrage;
pub mod error;
pub mod funding;
pub mod id;
pub mod status;

pub use arbitrage::{ArbitrageRow, RankingPolicy};
pub use error::DomainError;
pub use funding::{format_percent, period_label, FundingDatum, HOUR_MS};
pub use id::AdapterId;
pub use status::AdapterStatus;
