// SPDX-FileCopyrightText: 2026 Remindr Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock delivery provider for deterministic testing.
//!
//! Answers are taken, in order, from a per-phone override, then from the
//! FIFO queue of the call kind, then default to success.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use remindr_core::types::{AdapterType, HealthStatus, ProviderReceipt};
use remindr_core::{DeliveryProvider, PluginAdapter, RemindrError};

/// One scripted provider answer.
#[derive(Debug, Clone)]
pub enum ScriptedResponse {
    Ok,
    Error {
        code: Option<String>,
        message: String,
    },
    /// Never answers; exercises caller timeouts.
    Hang,
}

impl ScriptedResponse {
    pub fn error_code(code: &str, message: &str) -> Self {
        ScriptedResponse::Error {
            code: Some(code.to_string()),
            message: message.to_string(),
        }
    }

    pub fn error(message: &str) -> Self {
        ScriptedResponse::Error {
            code: None,
            message: message.to_string(),
        }
    }
}

#[derive(Default)]
struct State {
    probes: VecDeque<ScriptedResponse>,
    sends: VecDeque<ScriptedResponse>,
    per_phone: HashMap<String, ScriptedResponse>,
    probe_calls: Vec<String>,
    send_calls: Vec<(String, String)>,
}

/// A delivery provider returning scripted answers and recording every call.
#[derive(Default)]
pub struct MockDeliveryProvider {
    state: Mutex<State>,
}

impl MockDeliveryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the answer for the next capability probe.
    pub fn push_probe(&self, response: ScriptedResponse) {
        self.lock().probes.push_back(response);
    }

    /// Queue the answer for the next send.
    pub fn push_send(&self, response: ScriptedResponse) {
        self.lock().sends.push_back(response);
    }

    /// Answer every probe and send to `phone` with `response`.
    pub fn respond_to(&self, phone: &str, response: ScriptedResponse) {
        self.lock().per_phone.insert(phone.to_string(), response);
    }

    /// Every send call as `(phone, message)`, in call order.
    pub fn sent(&self) -> Vec<(String, String)> {
        self.lock().send_calls.clone()
    }

    /// Sends addressed to `phone`.
    pub fn sent_to(&self, phone: &str) -> Vec<String> {
        self.lock()
            .send_calls
            .iter()
            .filter(|(p, _)| p == phone)
            .map(|(_, m)| m.clone())
            .collect()
    }

    pub fn probe_count(&self) -> usize {
        self.lock().probe_calls.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn answer(response: ScriptedResponse) -> Result<ProviderReceipt, RemindrError> {
        match response {
            ScriptedResponse::Ok => Ok(ProviderReceipt {
                id: Some("mock-msg".to_string()),
                status: Some("delivered".to_string()),
                raw: r#"{"id":"mock-msg","status":"delivered"}"#.to_string(),
            }),
            ScriptedResponse::Error { code, message } => {
                let message = match &code {
                    Some(code) => format!("provider error {code}: {message}"),
                    None => message,
                };
                Err(RemindrError::Delivery {
                    message,
                    code,
                    source: None,
                })
            }
            ScriptedResponse::Hang => std::future::pending().await,
        }
    }
}

#[async_trait]
impl PluginAdapter for MockDeliveryProvider {
    fn name(&self) -> &str {
        "mock-delivery"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Delivery
    }

    async fn health_check(&self) -> Result<HealthStatus, RemindrError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), RemindrError> {
        Ok(())
    }
}

#[async_trait]
impl DeliveryProvider for MockDeliveryProvider {
    async fn check_capability(&self, phone: &str) -> Result<ProviderReceipt, RemindrError> {
        let response = {
            let mut state = self.lock();
            state.probe_calls.push(phone.to_string());
            match state.per_phone.get(phone) {
                Some(r) => r.clone(),
                None => state.probes.pop_front().unwrap_or(ScriptedResponse::Ok),
            }
        };
        Self::answer(response).await
    }

    async fn send_message(
        &self,
        phone: &str,
        message: &str,
    ) -> Result<ProviderReceipt, RemindrError> {
        let response = {
            let mut state = self.lock();
            state
                .send_calls
                .push((phone.to_string(), message.to_string()));
            match state.per_phone.get(phone) {
                Some(r) => r.clone(),
                None => state.sends.pop_front().unwrap_or(ScriptedResponse::Ok),
            }
        };
        Self::answer(response).await
    }
}
