//! # minihub-app
//!
//! Application layer — **port definitions** (traits) and the in-process
//! infrastructure integrations plug into.
//!
//! ## Responsibilities
//! - Define the ports adapters implement or call:
//!   - `Integration` — lifecycle and service calls of a device integration
//!   - `IntegrationContext` — how an integration registers devices, entities
//!     and persistent notifications with the hub
//!   - `EventPublisher` — publish domain events
//! - Provide **in-process infrastructure** that doesn't need IO:
//!   - `InProcessEventBus` — broadcast channel for events
//!   - `HubContext` — in-memory registry implementing `IntegrationContext`
//!
//! ## Dependency rule
//! Depends on `minihub-domain` only (plus `tokio::sync` for channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod event_bus;
pub mod hub;
pub mod ports;
