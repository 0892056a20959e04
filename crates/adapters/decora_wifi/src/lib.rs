//! # minihub-adapter-decora-wifi
//!
//! Leviton Decora Smart Wi-Fi integration. Logs into the myLeviton cloud,
//! discovers every DW4SF fan switch the account can reach and exposes each
//! one as a minihub fan entity.
//!
//! ## How it works
//!
//! 1. `setup` logs in, walks residential permissions (account grants expand
//!    to their residences) and registers one device + entity per fan.
//! 2. `start_background` refreshes every fan on a fixed interval.
//! 3. Service calls (`turn_on`, `turn_off`, `set_speed`, `update`) are a
//!    single switch update each.
//! 4. `teardown` stops polling and closes the myLeviton session.
//!
//! ## Speed encoding
//!
//! | Speed | Brightness |
//! |-------|------------|
//! | `low` | 25 |
//! | `medium` | 50 |
//! | `high` | 75 |
//! | `max` | 100 |
//!
//! ## Dependency rule
//!
//! Same as other adapters: depends on `minihub-app` and `minihub-domain`.

pub mod api;
pub mod client;
mod config;
pub mod discovery;
mod error;
pub mod fan;
mod poller;
pub mod service;
pub mod speed;

#[cfg(test)]
mod testing;

pub use client::LevitonClient;
pub use config::DecoraWifiConfig;
pub use error::DecoraError;
pub use speed::FanSpeed;

use std::collections::HashMap;
use std::sync::Arc;

use tokio::task::JoinHandle;

use minihub_app::ports::{DiscoveredDevice, Integration, IntegrationContext};
use minihub_domain::entity::Entity;
use minihub_domain::error::{MiniHubError, NotFoundError};
use minihub_domain::id::EntityId;
use minihub_domain::notification::PersistentNotification;

use api::{DecoraApi, Person};
use fan::DecoraWifiFan;
use poller::FanPoller;
use service::FanCommand;

/// Integration name, also the `integration` field of every device.
pub const INTEGRATION_NAME: &str = "decora_wifi";

const NOTIFICATION_ID: &str = "leviton_notification_fan";
const NOTIFICATION_TITLE: &str = "myLeviton Decora Wifi Fan Setup";
const LOGIN_FAILED_MESSAGE: &str = "Failed to log into myLeviton Services. Check credentials.";

/// Decora Wi-Fi integration over any [`DecoraApi`] implementation.
pub struct DecoraWifiIntegration<A = LevitonClient> {
    config: DecoraWifiConfig,
    api: Arc<A>,
    session: Option<Person>,
    fans: HashMap<EntityId, Arc<DecoraWifiFan<A>>>,
    poll_handle: Option<JoinHandle<()>>,
}

impl DecoraWifiIntegration<LevitonClient> {
    /// Create the integration with an HTTP client built from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`DecoraError`] if the base URL is invalid or the HTTP client
    /// cannot be built.
    pub fn new(config: DecoraWifiConfig) -> Result<Self, DecoraError> {
        let client = LevitonClient::new(&config.base_url, config.timeout())?;
        Ok(Self::with_api(config, client))
    }
}

impl<A: DecoraApi + 'static> DecoraWifiIntegration<A> {
    #[must_use]
    pub fn with_api(config: DecoraWifiConfig, api: A) -> Self {
        Self {
            config,
            api: Arc::new(api),
            session: None,
            fans: HashMap::new(),
            poll_handle: None,
        }
    }

    /// Check whether this integration owns the given entity.
    #[must_use]
    pub fn owns_entity(&self, entity_id: EntityId) -> bool {
        self.fans.contains_key(&entity_id)
    }

    /// Whether setup opened a myLeviton session that is still live.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.session.is_some()
    }

    async fn login(&self, ctx: &impl IntegrationContext) -> Result<Option<Person>, MiniHubError> {
        match self
            .api
            .login(&self.config.username, &self.config.password)
            .await
        {
            Ok(Some(person)) => Ok(Some(person)),
            Ok(None) => {
                tracing::error!(username = %self.config.username, "failed to log into myLeviton");
                let notification = PersistentNotification::new(
                    NOTIFICATION_ID,
                    NOTIFICATION_TITLE,
                    LOGIN_FAILED_MESSAGE,
                )?;
                ctx.notify(notification).await?;
                Err(DecoraError::Authentication.into())
            }
            Err(err) => {
                tracing::error!(%err, "failed to communicate with myLeviton service");
                Ok(None)
            }
        }
    }

    /// Register `fan` with the hub. A switch reached through more than one
    /// permission is registered once; later copies are dropped.
    async fn register(
        &mut self,
        ctx: &impl IntegrationContext,
        fan: DecoraWifiFan<A>,
    ) -> Result<(), MiniHubError> {
        let unique_id = fan.unique_id();
        if self.fans.values().any(|known| known.unique_id() == unique_id) {
            tracing::debug!(%unique_id, "myLeviton switch already registered");
            return Ok(());
        }
        let discovered = DiscoveredDevice {
            device: fan.device()?,
            entities: vec![fan.to_entity()?],
        };
        ctx.persist_discovered(discovered).await?;
        self.fans.insert(fan.entity_id(), Arc::new(fan));
        Ok(())
    }
}

impl<A: DecoraApi + 'static> Integration for DecoraWifiIntegration<A> {
    fn name(&self) -> &'static str {
        INTEGRATION_NAME
    }

    async fn setup(&mut self, ctx: &impl IntegrationContext) -> Result<(), MiniHubError> {
        let Some(person) = self.login(ctx).await? else {
            return Ok(());
        };
        self.session = Some(person);
        tracing::info!(person_id = %person.id, "logged into myLeviton");

        let switches = match discovery::discover_switches(self.api.as_ref(), person.id).await {
            Ok(switches) => switches,
            Err(err) => {
                tracing::error!(%err, "failed to communicate with myLeviton service");
                return Ok(());
            }
        };

        for switch in discovery::fan_switches(switches) {
            let fan = DecoraWifiFan::new(Arc::clone(&self.api), switch);
            let unique_id = fan.unique_id();
            if let Err(err) = self.register(ctx, fan).await {
                tracing::error!(%err, %unique_id, "failed to register myLeviton fan");
            }
        }

        tracing::info!(count = self.fans.len(), "myLeviton fans registered");
        Ok(())
    }

    async fn start_background(
        &mut self,
        ctx: impl IntegrationContext + Clone + 'static,
    ) -> Result<(), MiniHubError> {
        let interval = self.config.scan_interval();
        if interval.is_zero() || self.fans.is_empty() {
            tracing::debug!("myLeviton polling disabled");
            return Ok(());
        }

        let fans = self.fans.values().cloned().collect();
        self.poll_handle = Some(FanPoller::start(ctx, fans, interval));
        tracing::info!(
            interval_secs = self.config.scan_interval_secs,
            "myLeviton poll loop started"
        );
        Ok(())
    }

    async fn handle_service_call(
        &self,
        entity_id: EntityId,
        service: &str,
        data: serde_json::Value,
    ) -> Result<Entity, MiniHubError> {
        let fan = self.fans.get(&entity_id).ok_or_else(|| NotFoundError {
            entity: "Entity",
            id: entity_id.to_string(),
        })?;

        match FanCommand::parse(service, &data)? {
            FanCommand::TurnOn(speed) => fan.turn_on(speed).await,
            FanCommand::TurnOff => fan.turn_off().await,
            FanCommand::SetSpeed(speed) => fan.set_speed(speed).await,
            FanCommand::Update => fan.update().await,
        }

        fan.to_entity()
    }

    async fn teardown(&mut self) -> Result<(), MiniHubError> {
        if let Some(handle) = self.poll_handle.take() {
            handle.abort();
            tracing::debug!("myLeviton poll task aborted");
        }
        if self.session.take().is_some() {
            match self.api.logout().await {
                Ok(()) => tracing::debug!("logged out of myLeviton"),
                Err(err) => tracing::error!(%err, "failed to log out of myLeviton"),
            }
        }
        self.fans.clear();
        tracing::info!("Decora Wi-Fi integration stopped");
        Ok(())
    }
}
