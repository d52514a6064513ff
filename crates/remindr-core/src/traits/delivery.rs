// SPDX-FileCopyrightText: 2026 Remindr Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Delivery provider trait: the opaque transport that places a message.

use async_trait::async_trait;

use crate::error::RemindrError;
use crate::traits::adapter::PluginAdapter;
use crate::types::ProviderReceipt;

/// Adapter for the messaging provider.
///
/// Failures are reported as [`RemindrError::Delivery`] carrying the
/// provider-specific error code when the provider supplied one. Callers
/// classify the code; the adapter itself never interprets it.
#[async_trait]
pub trait DeliveryProvider: PluginAdapter {
    /// Asks the provider whether `phone` can receive messages, without sending one.
    async fn check_capability(&self, phone: &str) -> Result<ProviderReceipt, RemindrError>;

    /// Sends `message` to `phone`.
    async fn send_message(&self, phone: &str, message: &str)
    -> Result<ProviderReceipt, RemindrError>;
}
