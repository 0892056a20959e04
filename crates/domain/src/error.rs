//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`MiniHubError`] at port boundaries.

/// Top-level error crossing port boundaries.
#[derive(Debug, thiserror::Error)]
pub enum MiniHubError {
    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// An integration failed to talk to its external system.
    #[error("integration error")]
    Integration(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Domain invariant violations and rejected inputs.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("entity_id must not be empty")]
    EmptyEntityId,

    #[error("notification_id must not be empty")]
    EmptyNotificationId,

    #[error("service {service:?} is not supported")]
    UnsupportedService { service: String },

    #[error("invalid {field} for service {service:?}")]
    InvalidServiceData {
        service: String,
        field: &'static str,
    },
}

/// A lookup by identifier found nothing.
#[derive(Debug, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}
