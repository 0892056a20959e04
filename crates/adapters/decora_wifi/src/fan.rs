//! Fan entity backed by one DW4SF switch.
//!
//! Every property is read fresh from the last switch snapshot; nothing is
//! derived or cached beyond that snapshot. Commands are a single
//! attribute update each. A failed command is logged and swallowed, and the
//! snapshot keeps whatever it held before the call.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use minihub_domain::device::Device;
use minihub_domain::entity::{AttributeValue, Entity, EntityState};
use minihub_domain::error::MiniHubError;
use minihub_domain::id::{DeviceId, EntityId};

use crate::api::{DecoraApi, FAN_MODEL, IotSwitch, Power, SwitchId, SwitchUpdate};
use crate::speed::FanSpeed;
use crate::INTEGRATION_NAME;

/// Capability flags advertised by a fan entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FanFeatures(u32);

impl FanFeatures {
    /// The fan accepts `set_speed`.
    pub const SET_SPEED: Self = Self(1);

    #[must_use]
    pub fn bits(self) -> u32 {
        self.0
    }

    #[must_use]
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

/// A minihub fan wrapping one myLeviton switch.
pub struct DecoraWifiFan<A> {
    api: Arc<A>,
    device_id: DeviceId,
    entity_id: EntityId,
    switch: Mutex<IotSwitch>,
}

impl<A: DecoraApi> DecoraWifiFan<A> {
    #[must_use]
    pub fn new(api: Arc<A>, switch: IotSwitch) -> Self {
        Self {
            api,
            device_id: DeviceId::new(),
            entity_id: EntityId::new(),
            switch: Mutex::new(switch),
        }
    }

    fn snapshot(&self) -> MutexGuard<'_, IotSwitch> {
        self.switch.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn switch_id(&self) -> SwitchId {
        self.snapshot().id
    }

    #[must_use]
    pub fn entity_id(&self) -> EntityId {
        self.entity_id
    }

    /// Identifier of the wrapped switch.
    #[must_use]
    pub fn unique_id(&self) -> String {
        self.switch_id().to_string()
    }

    /// Switch name, or `Decora fan <id>` when myLeviton has none.
    #[must_use]
    pub fn name(&self) -> String {
        let switch = self.snapshot();
        if switch.name.trim().is_empty() {
            format!("Decora fan {}", switch.id)
        } else {
            switch.name.clone()
        }
    }

    /// `true` only when the switch reports exactly `"ON"`.
    #[must_use]
    pub fn is_on(&self) -> bool {
        self.snapshot().power.as_deref() == Some("ON")
    }

    /// Current speed; an unrecognised brightness is logged and read as
    /// [`FanSpeed::Medium`].
    #[must_use]
    pub fn speed(&self) -> FanSpeed {
        let brightness = self.snapshot().brightness;
        match brightness.and_then(FanSpeed::from_brightness) {
            Some(speed) => speed,
            None => {
                tracing::error!(
                    switch_id = %self.switch_id(),
                    ?brightness,
                    "unknown speed"
                );
                FanSpeed::Medium
            }
        }
    }

    #[must_use]
    pub fn speed_list(&self) -> &'static [FanSpeed] {
        &FanSpeed::ALL
    }

    #[must_use]
    pub fn supported_features(&self) -> FanFeatures {
        FanFeatures::SET_SPEED
    }

    /// Turn the fan on, optionally at `speed`, in one update.
    pub async fn turn_on(&self, speed: Option<FanSpeed>) {
        let mut update = SwitchUpdate::power(Power::On);
        if let Some(speed) = speed {
            update = update.with_brightness(speed.brightness());
        }
        self.apply(&update, "failed to turn on myLeviton fan").await;
    }

    pub async fn turn_off(&self) {
        self.apply(
            &SwitchUpdate::power(Power::Off),
            "failed to turn off myLeviton fan",
        )
        .await;
    }

    /// Setting a speed also turns the fan on.
    pub async fn set_speed(&self, speed: FanSpeed) {
        let update = SwitchUpdate::power(Power::On).with_brightness(speed.brightness());
        self.apply(&update, "failed to set the speed of myLeviton fan")
            .await;
    }

    /// Pull the switch state from myLeviton.
    pub async fn update(&self) {
        let id = self.switch_id();
        match self.api.fetch_switch(id).await {
            Ok(fresh) => *self.snapshot() = fresh,
            Err(err) => {
                tracing::error!(switch_id = %id, error = %err, "failed to update myLeviton fan data");
            }
        }
    }

    async fn apply(&self, update: &SwitchUpdate, failure: &'static str) {
        let id = self.switch_id();
        match self.api.update_switch(id, update).await {
            Ok(updated) => *self.snapshot() = updated,
            Err(err) => tracing::error!(switch_id = %id, error = %err, "{failure}"),
        }
    }

    /// The [`Device`] this fan belongs to.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the device fails its builder checks.
    pub fn device(&self) -> Result<Device, MiniHubError> {
        Device::builder()
            .id(self.device_id)
            .name(self.name())
            .manufacturer("Leviton")
            .model(FAN_MODEL)
            .integration(INTEGRATION_NAME)
            .unique_id(self.unique_id())
            .build()
    }

    /// Snapshot the fan as a minihub [`Entity`].
    ///
    /// # Errors
    ///
    /// Returns a validation error if the entity fails its builder checks.
    pub fn to_entity(&self) -> Result<Entity, MiniHubError> {
        let speed_list: Vec<serde_json::Value> = self
            .speed_list()
            .iter()
            .map(|s| serde_json::Value::from(s.as_str()))
            .collect();
        let brightness = self.snapshot().brightness;

        let mut builder = Entity::builder()
            .id(self.entity_id)
            .device_id(self.device_id)
            .entity_id(format!("fan.{INTEGRATION_NAME}_{}", self.unique_id()))
            .friendly_name(self.name())
            .state(EntityState::from_on(self.is_on()))
            .attribute("speed", AttributeValue::from(self.speed().as_str()))
            .attribute("speed_list", AttributeValue::Json(serde_json::Value::Array(speed_list)))
            .attribute(
                "supported_features",
                AttributeValue::Int(i64::from(self.supported_features().bits())),
            );
        if let Some(brightness) = brightness {
            builder = builder.attribute("brightness", AttributeValue::Int(brightness));
        }
        builder.build()
    }
}
