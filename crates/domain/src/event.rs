//! Event — an immutable record of something that happened in the hub.

use serde::{Deserialize, Serialize};

use crate::id::{EntityId, EventId};
use crate::time::{Timestamp, now};

/// Kind of [`Event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    StateChanged,
    EntityCreated,
    NotificationCreated,
    /// The hub is shutting down; integrations are about to be torn down.
    HubStopping,
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::StateChanged => "state_changed",
            Self::EntityCreated => "entity_created",
            Self::NotificationCreated => "notification_created",
            Self::HubStopping => "hub_stopping",
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub event_type: EventType,
    pub entity_id: Option<EntityId>,
    pub data: serde_json::Value,
    pub timestamp: Timestamp,
}

impl Event {
    /// Create an event stamped with the current time.
    #[must_use]
    pub fn new(event_type: EventType, entity_id: Option<EntityId>, data: serde_json::Value) -> Self {
        Self {
            id: EventId::new(),
            event_type,
            entity_id,
            data,
            timestamp: now(),
        }
    }
}
