//! Normalized funding-rate readings.

use serde::Serialize;

use super::error::DomainError;

/// One hour in milliseconds, the common comparison basis.
pub const HOUR_MS: u64 = 3_600_000;

/// One exchange's current funding-rate reading for one symbol.
///
/// Construction always goes through [`FundingDatum::try_new`], so
/// `rate_per_hour` is derived from `raw_rate` and `period_ms` and can never
/// be set independently.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FundingDatum {
    exchange: String,
    symbol: String,
    raw_rate: f64,
    period_ms: u64,
    rate_per_hour: f64,
}

impl FundingDatum {
    /// Build a datum from a raw reading in the exchange's native period.
    ///
    /// # Errors
    ///
    /// Returns an error if the symbol is empty, the period is not strictly
    /// positive, or the rate (raw or scaled) is not finite.
    pub fn try_new(
        exchange: impl Into<String>,
        symbol: impl Into<String>,
        raw_rate: f64,
        period_ms: i64,
    ) -> Result<Self, DomainError> {
        let symbol = symbol.into();
        if symbol.is_empty() {
            return Err(DomainError::EmptySymbol);
        }
        if period_ms <= 0 {
            return Err(DomainError::NonPositivePeriod { period_ms });
        }
        if !raw_rate.is_finite() {
            return Err(DomainError::NonFiniteRate { rate: raw_rate });
        }

        let period_ms = period_ms.unsigned_abs();
        let rate_per_hour = hourly_rate(raw_rate, period_ms);
        if !rate_per_hour.is_finite() {
            return Err(DomainError::NonFiniteRate {
                rate: rate_per_hour,
            });
        }

        Ok(Self {
            exchange: exchange.into(),
            symbol,
            raw_rate,
            period_ms,
            rate_per_hour,
        })
    }

    /// Display identifier of the source venue.
    #[must_use]
    pub fn exchange(&self) -> &str {
        &self.exchange
    }

    /// Normalized base-asset ticker.
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Rate as reported, in the exchange's native period.
    #[must_use]
    pub const fn raw_rate(&self) -> f64 {
        self.raw_rate
    }

    /// Native funding period in milliseconds.
    #[must_use]
    pub const fn period_ms(&self) -> u64 {
        self.period_ms
    }

    /// Rate scaled linearly to a one-hour period.
    #[must_use]
    pub const fn rate_per_hour(&self) -> f64 {
        self.rate_per_hour
    }

    /// Whether this reading differs from `other` in rate or period.
    ///
    /// Push adapters use this to decide whether an incoming update is a change.
    #[must_use]
    pub fn differs_from(&self, other: &Self) -> bool {
        self.raw_rate != other.raw_rate || self.period_ms != other.period_ms
    }
}

/// Scale a rate over `period_ms` to a one-hour basis.
#[must_use]
pub fn hourly_rate(raw_rate: f64, period_ms: u64) -> f64 {
    raw_rate * (HOUR_MS as f64 / period_ms as f64)
}

/// Human-readable period, e.g. `"1h"`, `"8h"` or `"30m"`.
///
/// Zero renders as `"-"`.
#[must_use]
pub fn period_label(period_ms: u64) -> String {
    if period_ms == 0 {
        return "-".to_string();
    }
    let minutes = (period_ms as f64 / 60_000.0).round() as u64;
    if minutes % 60 == 0 {
        format!("{}h", minutes / 60)
    } else {
        format!("{minutes}m")
    }
}

/// Render a fractional rate as a percentage with `decimals` places.
#[must_use]
pub fn format_percent(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return "-".to_string();
    }
    format!("{:.*}%", decimals, value * 100.0)
}
