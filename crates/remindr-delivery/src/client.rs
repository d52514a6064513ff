// SPDX-FileCopyrightText: 2026 Remindr Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the messaging provider.
//!
//! [`HttpDeliveryProvider`] handles request construction, bearer
//! authentication, one retry on rate-limit and overload answers, and parsing
//! of the provider's structured error body into [`RemindrError::Delivery`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use remindr_config::model::DeliveryConfig;
use remindr_core::types::{AdapterType, HealthStatus, ProviderReceipt};
use remindr_core::{DeliveryProvider, PluginAdapter, RemindrError};
use remindr_phone::mask;

#[derive(Debug, Serialize)]
struct CapabilityRequest<'a> {
    phone: &'a str,
}

#[derive(Debug, Serialize)]
struct MessageRequest<'a> {
    phone: &'a str,
    message: &'a str,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<ErrorCode>,
    #[serde(default)]
    message: Option<String>,
}

/// Providers send error codes as strings or as numbers.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorCode {
    Text(String),
    Number(i64),
}

impl ErrorCode {
    fn into_string(self) -> String {
        match self {
            ErrorCode::Text(s) => s,
            ErrorCode::Number(n) => n.to_string(),
        }
    }
}

/// Messaging provider reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpDeliveryProvider {
    client: reqwest::Client,
    base_url: String,
    max_retries: u32,
    retry_delay: Duration,
}

impl HttpDeliveryProvider {
    /// Builds a client for `base_url` authenticating with `api_token`.
    pub fn new(base_url: &str, api_token: &str) -> Result<Self, RemindrError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {api_token}")).map_err(|e| {
                RemindrError::Config(format!("invalid delivery API token header value: {e}"))
            })?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| RemindrError::Delivery {
                message: format!("failed to build HTTP client: {e}"),
                code: None,
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_retries: 1,
            retry_delay: Duration::from_secs(1),
        })
    }

    /// Builds the client from the `[delivery]` section.
    ///
    /// A missing base URL or token is a configuration error.
    pub fn from_config(config: &DeliveryConfig) -> Result<Self, RemindrError> {
        let base_url = config
            .base_url
            .as_deref()
            .ok_or_else(|| RemindrError::Config("delivery.base_url is not set".into()))?;
        let token = config
            .api_token
            .as_deref()
            .ok_or_else(|| RemindrError::Config("delivery.api_token is not set".into()))?;
        Self::new(base_url, token)
    }

    /// Overrides the pause before retrying a transient answer.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    async fn post_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
        phone: &str,
    ) -> Result<ProviderReceipt, RemindrError> {
        let url = format!("{}{path}", self.base_url);
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, phone = %mask(phone), "retrying delivery call after transient error");
                tokio::time::sleep(self.retry_delay).await;
            }

            let response = self
                .client
                .post(&url)
                .json(body)
                .send()
                .await
                .map_err(|e| RemindrError::Delivery {
                    message: format!("HTTP request failed: {e}"),
                    code: None,
                    source: Some(Box::new(e)),
                })?;

            let status = response.status();
            debug!(%status, attempt, path, "delivery response received");

            let raw = response.text().await.unwrap_or_default();
            if status.is_success() {
                let mut receipt: ProviderReceipt = serde_json::from_str(&raw).unwrap_or_default();
                receipt.raw = raw;
                return Ok(receipt);
            }

            let error = parse_error(status, &raw);
            if is_transient_error(status) && attempt < self.max_retries {
                warn!(%status, "transient delivery error, will retry");
                last_error = Some(error);
                continue;
            }
            return Err(error);
        }

        Err(last_error.unwrap_or_else(|| RemindrError::delivery("delivery call failed after retries")))
    }
}

/// Turns a non-2xx answer into a delivery error carrying the provider code.
fn parse_error(status: reqwest::StatusCode, body: &str) -> RemindrError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => {
            let code = envelope.error.code.map(ErrorCode::into_string);
            let detail = envelope
                .error
                .message
                .unwrap_or_else(|| format!("provider returned {status}"));
            let message = match &code {
                Some(code) => format!("provider error {code}: {detail}"),
                None => detail,
            };
            RemindrError::Delivery {
                message,
                code,
                source: None,
            }
        }
        Err(_) => RemindrError::delivery(format!("provider returned {status}: {body}")),
    }
}

/// HTTP statuses worth one more try: rate limit and overload, where the
/// provider did not accept the message. Other 5xx answers are not retried
/// since the message may already be queued.
fn is_transient_error(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 503)
}

#[async_trait]
impl PluginAdapter for HttpDeliveryProvider {
    fn name(&self) -> &str {
        "http-delivery"
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
impl DeliveryProvider for HttpDeliveryProvider {
    async fn check_capability(&self, phone: &str) -> Result<ProviderReceipt, RemindrError> {
        self.post_json("/v1/capability", &CapabilityRequest { phone }, phone)
            .await
    }

    async fn send_message(
        &self,
        phone: &str,
        message: &str,
    ) -> Result<ProviderReceipt, RemindrError> {
        self.post_json("/v1/messages", &MessageRequest { phone, message }, phone)
            .await
    }
}
