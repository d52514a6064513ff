// SPDX-FileCopyrightText: 2026 Remindr Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory [`DeliveryCacheStore`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use remindr_core::types::DeliveryStatusEntry;
use remindr_core::{DeliveryCacheStore, RemindrError};

/// Delivery cache kept in a map. `set_failing(true)` makes every call fail
/// with a storage error.
#[derive(Default)]
pub struct MemoryCacheStore {
    entries: Mutex<HashMap<String, DeliveryStatusEntry>>,
    failing: AtomicBool,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Stored entry for `phone`, ignoring freshness.
    pub fn entry(&self, phone: &str) -> Option<DeliveryStatusEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(phone)
            .cloned()
    }

    /// Writes an entry directly, bypassing the failure switch.
    pub fn insert(&self, entry: DeliveryStatusEntry) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(entry.phone_number.clone(), entry);
    }

    fn check(&self) -> Result<(), RemindrError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(RemindrError::Storage {
                source: "memory cache unavailable".into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl DeliveryCacheStore for MemoryCacheStore {
    async fn get_entry(&self, phone: &str) -> Result<Option<DeliveryStatusEntry>, RemindrError> {
        self.check()?;
        Ok(self.entry(phone))
    }

    async fn upsert_entry(&self, entry: &DeliveryStatusEntry) -> Result<(), RemindrError> {
        self.check()?;
        self.insert(entry.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn entry(phone: &str, has_capability: bool) -> DeliveryStatusEntry {
        DeliveryStatusEntry {
            phone_number: phone.into(),
            has_capability,
            last_checked: Utc::now(),
            last_error_code: None,
        }
    }

    #[tokio::test]
    async fn upsert_overwrites_by_phone() {
        let store = MemoryCacheStore::new();
        store.upsert_entry(&entry("+33600000001", true)).await.unwrap();
        store.upsert_entry(&entry("+33600000001", false)).await.unwrap();
        let got = store.get_entry("+33600000001").await.unwrap().unwrap();
        assert!(!got.has_capability);
    }

    #[tokio::test]
    async fn failing_switch_rejects_calls() {
        let store = MemoryCacheStore::new();
        store.insert(entry("+33600000001", true));
        store.set_failing(true);
        assert!(store.get_entry("+33600000001").await.is_err());
        assert!(store.upsert_entry(&entry("+33600000002", true)).await.is_err());
        store.set_failing(false);
        assert!(store.get_entry("+33600000001").await.unwrap().is_some());
    }
}
