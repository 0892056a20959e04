//! Persistent notifications — user-visible messages that stay until dismissed.
//!
//! Integrations raise them for failures a user has to act on (bad
//! credentials, unreachable account). The `notification_id` acts as a
//! dedup key: raising a notification with an id that already exists
//! replaces the previous one.

use serde::{Deserialize, Serialize};

use crate::error::{MiniHubError, ValidationError};
use crate::time::{Timestamp, now};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistentNotification {
    pub notification_id: String,
    pub title: String,
    pub message: String,
    pub created_at: Timestamp,
}

impl PersistentNotification {
    /// Create a notification stamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns [`MiniHubError::Validation`] when `notification_id` is empty.
    pub fn new(
        notification_id: impl Into<String>,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Result<Self, MiniHubError> {
        let notification_id = notification_id.into();
        if notification_id.is_empty() {
            return Err(ValidationError::EmptyNotificationId.into());
        }
        Ok(Self {
            notification_id,
            title: title.into(),
            message: message.into(),
            created_at: now(),
        })
    }
}
