//! Decora Wi-Fi adapter error types.

use minihub_domain::error::MiniHubError;

/// Errors specific to the Decora Wi-Fi adapter.
#[derive(Debug, thiserror::Error)]
pub enum DecoraError {
    /// myLeviton rejected the credentials.
    #[error("myLeviton rejected the credentials")]
    Authentication,

    /// A call that needs a session was made before login.
    #[error("not logged into myLeviton")]
    NotLoggedIn,

    /// HTTP transport error (connection refused, DNS, timeout, …).
    #[error("HTTP transport error")]
    Transport(#[from] reqwest::Error),

    /// The configured base URL cannot be joined with an API path.
    #[error("invalid myLeviton URL")]
    InvalidUrl(#[from] url::ParseError),

    /// myLeviton answered with a non-success status.
    #[error("myLeviton API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// A response body did not match the expected shape.
    #[error("failed to decode myLeviton response: {message}")]
    Deserialization { message: String, body: String },

    /// A domain-level error (validation, not-found, etc.).
    #[error("domain error")]
    Domain(#[source] MiniHubError),
}

impl DecoraError {
    /// Convert into a [`MiniHubError`] for propagation across port boundaries.
    #[must_use]
    pub fn into_domain(self) -> MiniHubError {
        match self {
            Self::Domain(err) => err,
            other => MiniHubError::Integration(Box::new(other)),
        }
    }
}

impl From<DecoraError> for MiniHubError {
    fn from(err: DecoraError) -> Self {
        err.into_domain()
    }
}
