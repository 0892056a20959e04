//! Event bus port — publish/subscribe for domain events.

use std::future::Future;

use minihub_domain::error::MiniHubError;
use minihub_domain::event::Event;

/// Publishes domain events to interested subscribers.
pub trait EventPublisher {
    /// Publish an event to all current subscribers.
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), MiniHubError>> + Send;

    /// Publish an event, logging instead of returning a failure.
    ///
    /// For callers whose own operation already succeeded and must not be
    /// reported as failed because a notification about it was lost.
    fn publish_or_log(&self, event: Event) -> impl Future<Output = ()> + Send
    where
        Self: Sync,
    {
        async move {
            let event_type = event.event_type;
            if let Err(err) = self.publish(event).await {
                tracing::warn!(%event_type, error = %err, "failed to publish event");
            }
        }
    }
}

impl<T: EventPublisher + Send + Sync> EventPublisher for std::sync::Arc<T> {
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), MiniHubError>> + Send {
        (**self).publish(event)
    }
}
