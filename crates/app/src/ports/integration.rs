//! Integration port — lifecycle and service-call handling for device integrations.
//!
//! An integration bridges an external system (a vendor cloud, a local
//! protocol, …) into the minihub system. It discovers devices/entities on
//! setup, handles service calls directed at entities it owns and releases
//! its external resources on teardown.

use std::future::Future;

use minihub_domain::device::Device;
use minihub_domain::entity::Entity;
use minihub_domain::error::MiniHubError;
use minihub_domain::event::Event;
use minihub_domain::id::EntityId;
use minihub_domain::notification::PersistentNotification;

/// Context provided to integrations for registering what they discover.
///
/// This is a **port** — adapters call it to register devices and entities
/// and to surface persistent notifications to the user. The hub provides
/// the concrete implementation ([`HubContext`](crate::hub::HubContext)).
pub trait IntegrationContext: Send + Sync {
    /// Register a discovered device (create or update by `integration`+`unique_id`).
    fn upsert_device(
        &self,
        device: Device,
    ) -> impl Future<Output = Result<Device, MiniHubError>> + Send;

    /// Register an entity snapshot (create or update by `entity_id` string).
    fn upsert_entity(
        &self,
        entity: Entity,
    ) -> impl Future<Output = Result<Entity, MiniHubError>> + Send;

    /// Publish a domain event to the event bus.
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), MiniHubError>> + Send;

    /// Raise a persistent notification, replacing any with the same id.
    fn notify(
        &self,
        notification: PersistentNotification,
    ) -> impl Future<Output = Result<(), MiniHubError>> + Send;

    /// Convenience: register a full [`DiscoveredDevice`] (device + all entities).
    fn persist_discovered(
        &self,
        dd: DiscoveredDevice,
    ) -> impl Future<Output = Result<(), MiniHubError>> + Send {
        async move {
            self.upsert_device(dd.device).await?;
            for entity in dd.entities {
                self.upsert_entity(entity).await?;
            }
            Ok(())
        }
    }
}

/// A pluggable device integration.
///
/// The composition root calls the lifecycle methods in order:
///
/// 1. [`setup`](Self::setup) — connect, discover and register entities
/// 2. [`start_background`](Self::start_background) — spawn long-running tasks (polling)
/// 3. (the hub runs, forwarding service calls via [`handle_service_call`](Self::handle_service_call))
/// 4. [`teardown`](Self::teardown) — release external resources on shutdown
pub trait Integration {
    /// Unique name identifying this integration (e.g. `"decora_wifi"`).
    fn name(&self) -> &'static str;

    /// Connect and register discovered devices/entities via `ctx`.
    ///
    /// An `Err` reports a failed setup to the hub; the integration then
    /// owns no entity.
    fn setup(
        &mut self,
        ctx: &impl IntegrationContext,
    ) -> impl Future<Output = Result<(), MiniHubError>> + Send;

    /// Start long-running background work.
    ///
    /// Spawns internal tasks that push fresh snapshots via `ctx` and returns
    /// immediately. The default implementation is a no-op.
    fn start_background(
        &mut self,
        _ctx: impl IntegrationContext + Clone + 'static,
    ) -> impl Future<Output = Result<(), MiniHubError>> + Send {
        async { Ok(()) }
    }

    /// Handle a service call (e.g. `turn_on`, `set_speed`) for an entity
    /// owned by this integration.
    ///
    /// Returns the [`Entity`] snapshot after handling the call.
    fn handle_service_call(
        &self,
        entity_id: EntityId,
        service: &str,
        data: serde_json::Value,
    ) -> impl Future<Output = Result<Entity, MiniHubError>> + Send;

    /// Called once on graceful shutdown.
    fn teardown(&mut self) -> impl Future<Output = Result<(), MiniHubError>> + Send;
}

/// A device and its associated entities discovered during integration setup.
#[derive(Debug, Clone)]
pub struct DiscoveredDevice {
    pub device: Device,
    pub entities: Vec<Entity>,
}
