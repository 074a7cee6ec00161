//! Identity types for entities

use serde::{Deserialize, Serialize};
use std::fmt;

/// A stable, human-readable entity name (spec.md §4.2: "identified by a
/// stable name and a tick priority").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityName(pub String);

impl EntityName {
    /// Create a new entity name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for EntityName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for EntityName {
    fn from(s: String) -> Self {
        Self(s)
    }
}
