//! Entity — the central state-holding concept in minihub.
//!
//! An entity represents a single observable/controllable aspect of a device
//! (e.g. a fan's on/off state together with its speed attributes).

mod attribute_value;
mod state;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub use attribute_value::AttributeValue;
pub use state::EntityState;

use crate::error::{MiniHubError, ValidationError};
use crate::id::{DeviceId, EntityId};
use crate::time::{Timestamp, now};

/// A state holder owned by a device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub device_id: DeviceId,
    /// Human-readable, dotted identifier such as `fan.decora_wifi_42`.
    pub entity_id: String,
    pub friendly_name: String,
    pub state: EntityState,
    pub attributes: HashMap<String, AttributeValue>,
    pub last_changed: Timestamp,
    pub last_updated: Timestamp,
}

impl Entity {
    /// Create a builder for constructing an [`Entity`].
    #[must_use]
    pub fn builder() -> EntityBuilder {
        EntityBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`MiniHubError::Validation`] when `entity_id` or
    /// `friendly_name` is empty.
    pub fn validate(&self) -> Result<(), MiniHubError> {
        if self.entity_id.is_empty() {
            return Err(ValidationError::EmptyEntityId.into());
        }
        if self.friendly_name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        Ok(())
    }

    /// Record a new state at `at`.
    ///
    /// `last_updated` always moves; `last_changed` only moves when the
    /// state actually differs.
    pub fn update_state(&mut self, state: EntityState, at: Timestamp) {
        if self.state != state {
            self.state = state;
            self.last_changed = at;
        }
        self.last_updated = at;
    }

    #[must_use]
    pub fn get_attribute(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }

    pub fn set_attribute(&mut self, key: impl Into<String>, value: AttributeValue) {
        self.attributes.insert(key.into(), value);
    }
}

/// Step-by-step builder for [`Entity`].
#[derive(Debug, Default)]
pub struct EntityBuilder {
    id: Option<EntityId>,
    device_id: Option<DeviceId>,
    entity_id: Option<String>,
    friendly_name: Option<String>,
    state: EntityState,
    attributes: HashMap<String, AttributeValue>,
}

impl EntityBuilder {
    #[must_use]
    pub fn id(mut self, id: EntityId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn device_id(mut self, device_id: DeviceId) -> Self {
        self.device_id = Some(device_id);
        self
    }

    #[must_use]
    pub fn entity_id(mut self, entity_id: impl Into<String>) -> Self {
        self.entity_id = Some(entity_id.into());
        self
    }

    #[must_use]
    pub fn friendly_name(mut self, name: impl Into<String>) -> Self {
        self.friendly_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn state(mut self, state: EntityState) -> Self {
        self.state = state;
        self
    }

    #[must_use]
    pub fn attribute(mut self, key: impl Into<String>, value: AttributeValue) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    /// Consume the builder, validate, and return an [`Entity`].
    ///
    /// # Errors
    ///
    /// Returns [`MiniHubError::Validation`] if `entity_id` or
    /// `friendly_name` is missing or empty.
    pub fn build(self) -> Result<Entity, MiniHubError> {
        let ts = now();
        let entity = Entity {
            id: self.id.unwrap_or_default(),
            device_id: self.device_id.unwrap_or_default(),
            entity_id: self.entity_id.unwrap_or_default(),
            friendly_name: self.friendly_name.unwrap_or_default(),
            state: self.state,
            attributes: self.attributes,
            last_changed: ts,
            last_updated: ts,
        };
        entity.validate()?;
        Ok(entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fan() -> Entity {
        Entity::builder()
            .entity_id("fan.bedroom")
            .friendly_name("Bedroom Fan")
            .state(EntityState::Off)
            .attribute("speed", AttributeValue::String("low".to_string()))
            .build()
            .unwrap()
    }

    #[test]
    fn should_build_entity_with_attributes() {
        let entity = fan();
        assert_eq!(entity.entity_id, "fan.bedroom");
        assert_eq!(
            entity.get_attribute("speed"),
            Some(&AttributeValue::String("low".to_string()))
        );
    }

    #[test]
    fn should_reject_missing_entity_id() {
        let result = Entity::builder().friendly_name("Fan").build();
        assert!(matches!(
            result,
            Err(MiniHubError::Validation(ValidationError::EmptyEntityId))
        ));
    }

    #[test]
    fn should_reject_missing_friendly_name() {
        let result = Entity::builder().entity_id("fan.x").build();
        assert!(matches!(
            result,
            Err(MiniHubError::Validation(ValidationError::EmptyName))
        ));
    }

    #[test]
    fn should_move_last_changed_only_on_real_change() {
        let mut entity = fan();
        let changed = entity.last_changed;
        let later = changed + chrono::Duration::seconds(5);

        entity.update_state(EntityState::Off, later);
        assert_eq!(entity.last_changed, changed);
        assert_eq!(entity.last_updated, later);

        entity.update_state(EntityState::On, later);
        assert_eq!(entity.last_changed, later);
        assert_eq!(entity.state, EntityState::On);
    }

    #[test]
    fn should_overwrite_attribute() {
        let mut entity = fan();
        entity.set_attribute("speed", AttributeValue::String("max".to_string()));
        assert_eq!(
            entity.get_attribute("speed").and_then(AttributeValue::as_str),
            Some("max")
        );
    }
}
