// SPDX-FileCopyrightText: 2026 Remindr Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Delivery verification cache.
//!
//! Policy over a [`DeliveryCacheStore`]: entries older than the freshness
//! window read as a miss, read failures read as a miss, and write failures
//! are reported as [`CacheWrite::Unavailable`] instead of an error.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::warn;

use remindr_core::types::DeliveryStatusEntry;
use remindr_core::DeliveryCacheStore;
use remindr_phone::mask;
use remindr_prometheus::recording::{record_cache_lookup, record_cache_write};

/// Result of a cache lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheLookup {
    Fresh(DeliveryStatusEntry),
    /// Absent, stale or unreadable.
    Miss,
}

/// Result of a cache write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheWrite {
    Cached,
    /// The store rejected the write; the message is the store error.
    Unavailable(String),
}

#[derive(Clone)]
pub struct VerificationCache {
    store: Arc<dyn DeliveryCacheStore>,
    freshness: chrono::Duration,
}

impl VerificationCache {
    pub fn new(store: Arc<dyn DeliveryCacheStore>, freshness_days: u32) -> Self {
        Self {
            store,
            freshness: chrono::Duration::days(i64::from(freshness_days)),
        }
    }

    pub async fn get(&self, phone: &str) -> CacheLookup {
        self.get_at(phone, Utc::now()).await
    }

    /// Lookup evaluated against an explicit clock.
    pub async fn get_at(&self, phone: &str, now: DateTime<Utc>) -> CacheLookup {
        match self.store.get_entry(phone).await {
            Ok(Some(entry)) if entry.is_fresh(now, self.freshness) => {
                record_cache_lookup("hit");
                CacheLookup::Fresh(entry)
            }
            Ok(Some(_)) => {
                record_cache_lookup("stale");
                CacheLookup::Miss
            }
            Ok(None) => {
                record_cache_lookup("miss");
                CacheLookup::Miss
            }
            Err(e) => {
                warn!(phone = %mask(phone), error = %e, "cache read failed, treating as miss");
                record_cache_lookup("error");
                CacheLookup::Miss
            }
        }
    }

    /// Records the capability of `phone`, last write wins.
    pub async fn upsert(
        &self,
        phone: &str,
        has_capability: bool,
        error_code: Option<&str>,
    ) -> CacheWrite {
        let entry = DeliveryStatusEntry {
            phone_number: phone.to_string(),
            has_capability,
            last_checked: Utc::now(),
            last_error_code: error_code.map(str::to_string),
        };
        match self.store.upsert_entry(&entry).await {
            Ok(()) => {
                record_cache_write("cached");
                CacheWrite::Cached
            }
            Err(e) => {
                warn!(phone = %mask(phone), error = %e, "cache write failed");
                record_cache_write("unavailable");
                CacheWrite::Unavailable(e.to_string())
            }
        }
    }
}
