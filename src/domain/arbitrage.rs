//! Cross-exchange long/short pairings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::funding::{period_label, FundingDatum};

/// One candidate long/short pairing for a symbol across two exchanges.
///
/// Rows are recomputed from scratch on every aggregation pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArbitrageRow {
    pub symbol: String,
    pub long_exchange: String,
    pub long_rate_per_hour: f64,
    pub long_period: String,
    pub short_exchange: String,
    pub short_rate_per_hour: f64,
    pub short_period: String,
    /// `short_rate_per_hour - long_rate_per_hour`.
    pub diff_per_hour: f64,
}

impl ArbitrageRow {
    /// Pair a long leg with a short leg on the same symbol.
    #[must_use]
    pub fn from_legs(long: &FundingDatum, short: &FundingDatum) -> Self {
        Self {
            symbol: long.symbol().to_string(),
            long_exchange: long.exchange().to_string(),
            long_rate_per_hour: long.rate_per_hour(),
            long_period: period_label(long.period_ms()),
            short_exchange: short.exchange().to_string(),
            short_rate_per_hour: short.rate_per_hour(),
            short_period: period_label(short.period_ms()),
            diff_per_hour: short.rate_per_hour() - long.rate_per_hour(),
        }
    }

    /// Whether the pairing collects more than it pays.
    #[must_use]
    pub fn is_profitable(&self) -> bool {
        self.diff_per_hour > 0.0
    }
}

/// Which pairings survive selection for each symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingPolicy {
    /// Every ordered pair with a strictly positive difference.
    #[default]
    AllProfitable,
    /// Only the maximum-difference pair per symbol, regardless of sign.
    BestPerSymbol,
}

impl RankingPolicy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AllProfitable => "all_profitable",
            Self::BestPerSymbol => "best_per_symbol",
        }
    }
}

impl fmt::Display for RankingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RankingPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "all_profitable" | "all" => Ok(Self::AllProfitable),
            "best_per_symbol" | "best" => Ok(Self::BestPerSymbol),
            other => Err(format!(
                "unknown ranking policy '{other}' (expected all_profitable or best_per_symbol)"
            )),
        }
    }
}
