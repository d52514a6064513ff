// SPDX-FileCopyrightText: 2026 Remindr Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP calendar client.
//!
//! [`HttpCalendar`] implements [`AppointmentSource`] for discovery and
//! [`CalendarProvider`] for the title migration job. Every request carries
//! the configured timeout.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::{Deserialize, Serialize};
use tracing::debug;

use remindr_config::model::CalendarConfig;
use remindr_core::types::{AdapterType, CalendarEvent, EventPage, HealthStatus};
use remindr_core::{AppointmentSource, CalendarProvider, PluginAdapter, RemindrError};

#[derive(Debug, Deserialize)]
struct EventList {
    events: Vec<CalendarEvent>,
    #[serde(default)]
    has_more: bool,
}

#[derive(Debug, Serialize)]
struct TitlePatch<'a> {
    title: &'a str,
}

#[derive(Debug, Clone)]
pub struct HttpCalendar {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCalendar {
    pub fn new(base_url: &str, api_token: Option<&str>, timeout: Duration) -> Result<Self, RemindrError> {
        let mut headers = HeaderMap::new();
        if let Some(token) = api_token {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {token}")).map_err(|e| {
                    RemindrError::Config(format!("invalid calendar API token header value: {e}"))
                })?,
            );
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| calendar_error("failed to build HTTP client", e))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Builds the client from the `[calendar]` section; the base URL is required.
    pub fn from_config(config: &CalendarConfig) -> Result<Self, RemindrError> {
        let base_url = config
            .base_url
            .as_deref()
            .ok_or_else(|| RemindrError::Config("calendar.base_url is not set".into()))?;
        Self::new(
            base_url,
            config.api_token.as_deref(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// `GET /v1/events?{query}`; `query` holds only dates and integers.
    async fn get_events(&self, query: &str) -> Result<EventList, RemindrError> {
        let url = format!("{}/v1/events?{query}", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| calendar_error("event listing failed", e))?;
        let status = response.status();
        debug!(%status, "calendar listing response received");
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RemindrError::Calendar {
                message: format!("calendar returned {status}: {body}"),
                source: None,
            });
        }
        response
            .json::<EventList>()
            .await
            .map_err(|e| calendar_error("malformed event listing", e))
    }
}

fn calendar_error(context: &str, e: reqwest::Error) -> RemindrError {
    if e.is_timeout() {
        return RemindrError::Calendar {
            message: format!("{context}: request timed out"),
            source: Some(Box::new(e)),
        };
    }
    RemindrError::Calendar {
        message: format!("{context}: {e}"),
        source: Some(Box::new(e)),
    }
}

#[async_trait]
impl PluginAdapter for HttpCalendar {
    fn name(&self) -> &str {
        "http-calendar"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Calendar
    }

    async fn health_check(&self) -> Result<HealthStatus, RemindrError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), RemindrError> {
        Ok(())
    }
}

#[async_trait]
impl AppointmentSource for HttpCalendar {
    async fn appointments_on(&self, date: NaiveDate) -> Result<Vec<CalendarEvent>, RemindrError> {
        let list = self
            .get_events(&format!("date={}", date.format("%Y-%m-%d")))
            .await?;
        Ok(list.events)
    }
}

#[async_trait]
impl CalendarProvider for HttpCalendar {
    async fn list_events(&self, offset: usize, limit: usize) -> Result<EventPage, RemindrError> {
        let list = self
            .get_events(&format!("offset={offset}&limit={limit}"))
            .await?;
        Ok(EventPage {
            events: list.events,
            has_more: list.has_more,
        })
    }

    async fn update_title(&self, event_id: &str, title: &str) -> Result<(), RemindrError> {
        let url = format!("{}/v1/events/{event_id}", self.base_url);
        let response = self
            .client
            .patch(&url)
            .json(&TitlePatch { title })
            .send()
            .await
            .map_err(|e| calendar_error("title update failed", e))?;
        let status = response.status();
        if status.as_u16() == 404 {
            return Err(RemindrError::NotFound {
                entity: "event",
                id: event_id.to_string(),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RemindrError::Calendar {
                message: format!("title update returned {status}: {body}"),
                source: None,
            });
        }
        Ok(())
    }
}
