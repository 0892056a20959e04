//! Timestamps.

use chrono::{DateTime, Utc};

/// UTC instant used for `last_changed`, `last_updated`, event and
/// notification times.
pub type Timestamp = DateTime<Utc>;

/// Current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_be_monotonic_across_calls() {
        let first = now();
        let second = now();
        assert!(second >= first);
    }
}
