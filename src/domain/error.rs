//! Domain validation errors for funding data.
//!
//! These errors are returned by [`FundingDatum::try_new`](super::funding::FundingDatum::try_new)
//! when a reading cannot be normalized. Adapters treat them as "drop this
//! data point" and carry on with the rest of the batch.
//!
//! ```
//! use fundarb::domain::error::DomainError;
//! use fundarb::domain::funding::FundingDatum;
//!
//! let result = FundingDatum::try_new("Backpack", "BTC", 0.0001, 0);
//! assert!(matches!(result, Err(DomainError::NonPositivePeriod { period_ms: 0 })));
//! ```

use thiserror::Error;

/// Errors that occur when funding data invariants are violated.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// The symbol was empty after normalization.
    #[error("symbol cannot be empty")]
    EmptySymbol,

    /// Funding periods must be strictly positive.
    #[error("funding period must be positive, got {period_ms}ms")]
    NonPositivePeriod {
        /// The invalid period that was provided.
        period_ms: i64,
    },

    /// Rates must be finite numbers.
    #[error("funding rate must be finite, got {rate}")]
    NonFiniteRate {
        /// The invalid rate that was provided.
        rate: f64,
    },
}
