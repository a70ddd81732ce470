//! Adapter status reporting.

use std::fmt;

use serde::Serialize;

/// Connection or fetch state reported by an adapter.
///
/// Pull adapters report [`Ok`](Self::Ok) or [`Error`](Self::Error) after each
/// fetch; push adapters walk through the connection lifecycle. Status is
/// informational and never gates whether data is merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AdapterStatus {
    #[default]
    Idle,
    Connecting,
    Open,
    Closed,
    Ok,
    Error,
}

impl AdapterStatus {
    /// Whether the adapter is currently delivering data.
    #[must_use]
    pub const fn is_healthy(self) -> bool {
        matches!(self, Self::Ok | Self::Open)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Connecting => "connecting",
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Ok => "ok",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for AdapterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
