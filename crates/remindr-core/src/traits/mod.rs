// SPDX-FileCopyrightText: 2026 Remindr Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for remindr collaborators.
//!
//! External collaborators (delivery provider, calendar) extend the
//! [`PluginAdapter`] base trait. Stores are plain async traits so the engine
//! can hold them behind `Arc<dyn ...>`.

pub mod adapter;
pub mod calendar;
pub mod delivery;
pub mod store;

pub use adapter::PluginAdapter;
pub use calendar::{AppointmentSource, CalendarProvider};
pub use delivery::DeliveryProvider;
pub use store::{DeliveryCacheStore, ReminderStore};
