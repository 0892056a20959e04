//! Entity state — the current operational state of an entity.

use serde::{Deserialize, Serialize};

/// Discrete operational state of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityState {
    On,
    Off,
    #[default]
    Unknown,
    Unavailable,
}

impl EntityState {
    /// Map a boolean "is on" reading onto [`On`](Self::On) / [`Off`](Self::Off).
    #[must_use]
    pub fn from_on(is_on: bool) -> Self {
        if is_on { Self::On } else { Self::Off }
    }

    #[must_use]
    pub fn is_on(self) -> bool {
        matches!(self, Self::On)
    }
}

impl std::fmt::Display for EntityState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::On => "on",
            Self::Off => "off",
            Self::Unknown => "unknown",
            Self::Unavailable => "unavailable",
        })
    }
}
