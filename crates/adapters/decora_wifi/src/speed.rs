//! Fan speed levels and their brightness encoding.
//!
//! The DW4SF fan switch reuses the dimmer `brightness` attribute (0–100) to
//! carry one of four speeds. The mapping is a fixed bijection:
//!
//! | Speed | Brightness |
//! |-------|------------|
//! | `low` | 25 |
//! | `medium` | 50 |
//! | `high` | 75 |
//! | `max` | 100 |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One of the four speeds a DW4SF switch supports, ordered slowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FanSpeed {
    Low,
    Medium,
    High,
    Max,
}

impl FanSpeed {
    /// Every speed, slowest first. This is the entity's speed list.
    pub const ALL: [Self; 4] = [Self::Low, Self::Medium, Self::High, Self::Max];

    /// Brightness value written to the switch for this speed.
    #[must_use]
    pub fn brightness(self) -> u8 {
        match self {
            Self::Low => 25,
            Self::Medium => 50,
            Self::High => 75,
            Self::Max => 100,
        }
    }

    /// Reverse lookup; `None` for any value outside the table.
    #[must_use]
    pub fn from_brightness(value: i64) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|speed| i64::from(speed.brightness()) == value)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Max => "max",
        }
    }
}

impl fmt::Display for FanSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A speed name outside `low`, `medium`, `high`, `max`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown fan speed {0:?}")]
pub struct UnknownSpeedError(pub String);

impl FromStr for FanSpeed {
    type Err = UnknownSpeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|speed| speed.as_str() == s)
            .ok_or_else(|| UnknownSpeedError(s.to_string()))
    }
}
