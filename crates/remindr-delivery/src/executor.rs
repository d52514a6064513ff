// SPDX-FileCopyrightText: 2026 Remindr Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Delivery attempt executor.
//!
//! Wraps every provider call in a hard timeout and classifies the result:
//!
//! | Provider answer                          | delivered | capability      | cache           |
//! |------------------------------------------|-----------|-----------------|-----------------|
//! | success                                  | send only | `Capable`       | `true`          |
//! | error with the undeliverable code        | no        | `Incapable`     | `false` + code  |
//! | any other error, or timeout              | no        | `Indeterminate` | untouched       |
//!
//! Only the undeliverable code may ever write a negative cache entry.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use remindr_config::model::DeliveryConfig;
use remindr_core::types::{AttemptOutcome, Capability, ProviderReceipt};
use remindr_core::{DeliveryProvider, RemindrError};
use remindr_phone::mask;
use remindr_prometheus::recording::record_attempt;

use crate::cache::{CacheLookup, VerificationCache};

/// Text recorded when a fresh negative cache entry blocks a send.
pub const CACHED_INCAPABLE: &str = "destination cannot receive messages (cached)";

/// Per-call options.
#[derive(Debug, Clone, Copy)]
pub struct AttemptOptions {
    /// Read and write the capability cache.
    pub use_cache: bool,
}

impl Default for AttemptOptions {
    fn default() -> Self {
        Self { use_cache: true }
    }
}

/// Where a verification answer came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationSource {
    Cache,
    Probe,
}

/// Answer to "can this destination receive messages".
#[derive(Debug, Clone, PartialEq)]
pub struct Verification {
    pub capability: Capability,
    pub source: VerificationSource,
    pub detail: String,
}

#[derive(Clone)]
pub struct Executor {
    provider: Arc<dyn DeliveryProvider>,
    cache: VerificationCache,
    timeout: Duration,
    undeliverable_code: String,
}

impl Executor {
    pub fn new(
        provider: Arc<dyn DeliveryProvider>,
        cache: VerificationCache,
        timeout: Duration,
        undeliverable_code: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            cache,
            timeout,
            undeliverable_code: undeliverable_code.into(),
        }
    }

    pub fn from_config(
        provider: Arc<dyn DeliveryProvider>,
        cache: VerificationCache,
        config: &DeliveryConfig,
    ) -> Self {
        Self::new(
            provider,
            cache,
            Duration::from_secs(config.timeout_secs),
            config.undeliverable_code.clone(),
        )
    }

    /// Resolves the capability of `phone`, from the cache when allowed and
    /// fresh, otherwise with a probe call.
    pub async fn verify(&self, phone: &str, options: AttemptOptions) -> Verification {
        if options.use_cache
            && let CacheLookup::Fresh(entry) = self.cache.get(phone).await
        {
            debug!(phone = %mask(phone), has_capability = entry.has_capability, "capability from cache");
            let (capability, detail) = if entry.has_capability {
                (Capability::Capable, "capable (cached)".to_string())
            } else {
                (Capability::Incapable, CACHED_INCAPABLE.to_string())
            };
            return Verification {
                capability,
                source: VerificationSource::Cache,
                detail,
            };
        }

        let started = Instant::now();
        let result = self.timed(self.provider.check_capability(phone)).await;
        let (capability, detail) = self.classify(phone, &result, options).await;
        record_attempt("probe", capability_label(capability), started.elapsed());
        Verification {
            capability,
            source: VerificationSource::Probe,
            detail,
        }
    }

    /// One send through the provider. Never fails: every error is folded
    /// into the returned outcome.
    pub async fn attempt(&self, phone: &str, message: &str, options: AttemptOptions) -> AttemptOutcome {
        let started = Instant::now();
        let result = self.timed(self.provider.send_message(phone, message)).await;
        let delivered = result.is_ok();
        let (capability, provider_response) = self.classify(phone, &result, options).await;

        let label = if delivered { "delivered" } else { capability_label(capability) };
        record_attempt("send", label, started.elapsed());
        if delivered {
            info!(phone = %mask(phone), "message delivered");
        } else {
            warn!(phone = %mask(phone), ?capability, response = %provider_response, "message not delivered");
        }

        AttemptOutcome {
            delivered,
            capability,
            provider_response,
        }
    }

    /// Verify, then send unless the destination is known to be incapable.
    pub async fn deliver(&self, phone: &str, message: &str, options: AttemptOptions) -> AttemptOutcome {
        let verification = self.verify(phone, options).await;
        if verification.capability == Capability::Incapable {
            return AttemptOutcome {
                delivered: false,
                capability: Capability::Incapable,
                provider_response: verification.detail,
            };
        }
        self.attempt(phone, message, options).await
    }

    async fn timed<F>(&self, call: F) -> Result<ProviderReceipt, RemindrError>
    where
        F: std::future::Future<Output = Result<ProviderReceipt, RemindrError>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(RemindrError::Timeout {
                duration: self.timeout,
            }),
        }
    }

    /// Classifies one provider answer and applies the matching cache write.
    async fn classify(
        &self,
        phone: &str,
        result: &Result<ProviderReceipt, RemindrError>,
        options: AttemptOptions,
    ) -> (Capability, String) {
        match result {
            Ok(receipt) => {
                if options.use_cache {
                    self.cache.upsert(phone, true, None).await;
                }
                (Capability::Capable, receipt.raw.clone())
            }
            Err(e) if e.provider_code() == Some(self.undeliverable_code.as_str()) => {
                if options.use_cache {
                    self.cache.upsert(phone, false, e.provider_code()).await;
                }
                (Capability::Incapable, e.to_string())
            }
            Err(e) => (Capability::Indeterminate, e.to_string()),
        }
    }
}

fn capability_label(capability: Capability) -> &'static str {
    match capability {
        Capability::Capable => "capable",
        Capability::Incapable => "incapable",
        Capability::Indeterminate => "indeterminate",
    }
}
