//! # minihubd — minihub daemon
//!
//! Composition root that wires the Decora Wi-Fi integration into the hub.
//!
//! ## Responsibilities
//! - Parse configuration (config file, env vars)
//! - Install the `tracing` subscriber
//! - Construct the event bus and the hub context integrations report into
//! - Run the integration lifecycle: setup, background polling, teardown
//! - Handle graceful shutdown (Ctrl-C)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing_subscriber::EnvFilter;

use minihub_adapter_decora_wifi::DecoraWifiIntegration;
use minihub_app::event_bus::InProcessEventBus;
use minihub_app::hub::HubContext;
use minihub_app::ports::{EventPublisher, Integration};
use minihub_domain::event::{Event, EventType};

use config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    // Event bus
    let event_bus = Arc::new(InProcessEventBus::new(256));
    let event_log = spawn_event_logger(&event_bus);
    let ctx = HubContext::new(Arc::clone(&event_bus));

    let Some(decora_config) = config.integrations.decora_wifi else {
        tracing::warn!(
            "no integration configured, set [integrations.decora_wifi] or \
             MINIHUB_DECORA_USERNAME and MINIHUB_DECORA_PASSWORD"
        );
        return Ok(());
    };

    // Integrations
    let mut integration = DecoraWifiIntegration::new(decora_config)?;
    match integration.setup(&ctx).await {
        Ok(()) => integration.start_background(ctx.clone()).await?,
        Err(err) => {
            tracing::warn!(integration = integration.name(), %err, "integration setup failed");
        }
    }

    tracing::info!(
        devices = ctx.devices().len(),
        entities = ctx.entities().len(),
        "minihubd running, press Ctrl-C to stop"
    );
    tokio::signal::ctrl_c().await?;

    tracing::info!("shutting down");
    event_bus
        .publish_or_log(Event::new(
            EventType::HubStopping,
            None,
            serde_json::Value::Null,
        ))
        .await;
    integration.teardown().await?;
    event_log.abort();

    Ok(())
}

/// Log every bus event at debug level.
fn spawn_event_logger(bus: &InProcessEventBus) -> JoinHandle<()> {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => tracing::debug!(
                    event_type = %event.event_type,
                    entity_id = ?event.entity_id,
                    data = %event.data,
                    "event"
                ),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "event logger lagged behind");
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}
