// SPDX-FileCopyrightText: 2026 Remindr Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the remindr appointment-reminder engine.
//!
//! This crate provides the error type, domain types, and the traits at every
//! collaborator seam: delivery provider, calendar, and the two stores.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::RemindrError;
pub use types::{AdapterType, HealthStatus};

pub use traits::{
    AppointmentSource, CalendarProvider, DeliveryCacheStore, DeliveryProvider, PluginAdapter,
    ReminderStore,
};
