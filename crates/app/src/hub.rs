//! In-memory [`IntegrationContext`] — the registry integrations report into.
//!
//! Holds every registered device, entity and persistent notification for
//! the lifetime of the process and publishes the matching domain events.
//! Cloning is cheap: all clones share the same registry.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use minihub_domain::device::Device;
use minihub_domain::entity::Entity;
use minihub_domain::error::MiniHubError;
use minihub_domain::event::{Event, EventType};
use minihub_domain::id::EntityId;
use minihub_domain::notification::PersistentNotification;

use crate::ports::{EventPublisher, IntegrationContext};

#[derive(Default)]
struct Registry {
    devices: Vec<Device>,
    entities: Vec<Entity>,
    notifications: Vec<PersistentNotification>,
}

/// Hub-side registry shared with integrations.
pub struct HubContext<EP> {
    registry: Arc<Mutex<Registry>>,
    publisher: EP,
}

impl<EP> HubContext<EP> {
    #[must_use]
    pub fn new(publisher: EP) -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry::default())),
            publisher,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn devices(&self) -> Vec<Device> {
        self.lock().devices.clone()
    }

    /// Registered entities, in registration order.
    #[must_use]
    pub fn entities(&self) -> Vec<Entity> {
        self.lock().entities.clone()
    }

    #[must_use]
    pub fn entity(&self, id: EntityId) -> Option<Entity> {
        self.lock().entities.iter().find(|e| e.id == id).cloned()
    }

    #[must_use]
    pub fn notifications(&self) -> Vec<PersistentNotification> {
        self.lock().notifications.clone()
    }
}

impl<EP: Clone> Clone for HubContext<EP> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            publisher: self.publisher.clone(),
        }
    }
}

impl<EP> IntegrationContext for HubContext<EP>
where
    EP: EventPublisher + Send + Sync + 'static,
{
    async fn upsert_device(&self, mut device: Device) -> Result<Device, MiniHubError> {
        device.validate()?;
        let mut registry = self.lock();
        let existing = registry.devices.iter_mut().find(|d| {
            d.unique_id.is_some()
                && d.integration == device.integration
                && d.unique_id == device.unique_id
        });
        match existing {
            Some(slot) => {
                device.id = slot.id;
                slot.clone_from(&device);
            }
            None => registry.devices.push(device.clone()),
        }
        Ok(device)
    }

    async fn upsert_entity(&self, mut entity: Entity) -> Result<Entity, MiniHubError> {
        entity.validate()?;
        let event = {
            let mut registry = self.lock();
            match registry
                .entities
                .iter_mut()
                .find(|e| e.entity_id == entity.entity_id)
            {
                Some(slot) => {
                    let previous = slot.state;
                    entity.id = slot.id;
                    if previous == entity.state {
                        entity.last_changed = slot.last_changed;
                    }
                    slot.clone_from(&entity);
                    (previous != entity.state).then(|| {
                        Event::new(
                            EventType::StateChanged,
                            Some(entity.id),
                            serde_json::json!({
                                "entity_id": entity.entity_id,
                                "from": previous,
                                "to": entity.state,
                            }),
                        )
                    })
                }
                None => {
                    registry.entities.push(entity.clone());
                    Some(Event::new(
                        EventType::EntityCreated,
                        Some(entity.id),
                        serde_json::json!({ "entity_id": entity.entity_id }),
                    ))
                }
            }
        };

        if let Some(event) = event {
            self.publisher.publish_or_log(event).await;
        }
        Ok(entity)
    }

    async fn publish(&self, event: Event) -> Result<(), MiniHubError> {
        self.publisher.publish(event).await
    }

    async fn notify(&self, notification: PersistentNotification) -> Result<(), MiniHubError> {
        let event = Event::new(
            EventType::NotificationCreated,
            None,
            serde_json::json!({
                "notification_id": notification.notification_id,
                "title": notification.title,
            }),
        );
        {
            let mut registry = self.lock();
            registry
                .notifications
                .retain(|n| n.notification_id != notification.notification_id);
            registry.notifications.push(notification);
        }
        self.publisher.publish_or_log(event).await;
        Ok(())
    }
}
