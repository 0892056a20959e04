//! # minihub-domain
//!
//! Pure domain model for the minihub home automation system.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Entities** (state holders with identity: fans, lights, switches, …)
//! - Define **Devices** (physical things that expose one or more entities)
//! - Define **Events** (state-change and lifecycle records)
//! - Define **Persistent notifications** (user-visible messages raised by integrations)
//! - Contain all invariant enforcement and domain logic
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod device;
pub mod entity;
pub mod event;
pub mod notification;
