//! Background refresh of every registered fan.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use minihub_app::ports::IntegrationContext;

use crate::api::DecoraApi;
use crate::fan::DecoraWifiFan;

/// Periodically re-reads each fan and pushes its snapshot to the hub.
pub(crate) struct FanPoller<A, C> {
    context: C,
    fans: Vec<Arc<DecoraWifiFan<A>>>,
    interval: Duration,
}

impl<A, C> FanPoller<A, C>
where
    A: DecoraApi + 'static,
    C: IntegrationContext + Clone + 'static,
{
    pub(crate) fn start(
        context: C,
        fans: Vec<Arc<DecoraWifiFan<A>>>,
        interval: Duration,
    ) -> JoinHandle<()> {
        let poller = Self {
            context,
            fans,
            interval,
        };
        tokio::spawn(poller.run())
    }

    /// Waits first: setup has just read every switch.
    async fn run(self) {
        loop {
            tokio::time::sleep(self.interval).await;
            self.iterate().await;
        }
    }

    async fn iterate(&self) {
        for fan in &self.fans {
            fan.update().await;
            let entity = match fan.to_entity() {
                Ok(entity) => entity,
                Err(err) => {
                    tracing::warn!(%err, unique_id = %fan.unique_id(), "skipping invalid fan snapshot");
                    continue;
                }
            };
            if let Err(err) = self.context.upsert_entity(entity).await {
                tracing::warn!(%err, unique_id = %fan.unique_id(), "failed to store fan snapshot");
            }
        }
    }
}
