//! Domain identifier types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Adapter identifier - newtype for type safety.
///
/// Identifies one registered exchange adapter (e.g. `"lighter"`), not the
/// display label of the venue it reads from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AdapterId(String);

impl AdapterId {
    /// Create a new `AdapterId` from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the adapter ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AdapterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for AdapterId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for AdapterId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl AsRef<str> for AdapterId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
