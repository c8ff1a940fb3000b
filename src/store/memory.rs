//! In-process key-value store with per-entry expiry.

use super::KeyValueStore;
use anyhow::Result;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Upper bound on an entry's lifetime, used when `now + ttl` overflows
const MAX_TTL: Duration = Duration::from_secs(60 * 60 * 24 * 365);

#[derive(Clone, Debug)]
struct Entry {
    value: String,
    expires_at: Instant,
}

impl Entry {
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

fn expiry_from_now(ttl: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(ttl)
        .or_else(|| now.checked_add(MAX_TTL))
        .unwrap_or(now)
}

/// Session store backed by a concurrent map.
///
/// Expired entries read as absent and are dropped lazily on access;
/// [`run_expiry_cleanup`] sweeps the rest.
#[derive(Default)]
pub struct MemoryStore {
    entries: DashMap<String, Entry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove every expired entry
    pub fn purge_expired(&self) {
        self.entries.retain(|_, entry| !entry.is_expired());
    }

    /// Number of stored entries, expired ones included until purged
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let expired = match self.entries.get(key) {
            Some(entry) if !entry.is_expired() => return Ok(Some(entry.value.clone())),
            Some(_) => true,
            None => false,
        };

        if expired {
            self.entries.remove_if(key, |_, entry| entry.is_expired());
        }
        Ok(None)
    }

    async fn set_with_expiry(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        self.entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: expiry_from_now(ttl),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }

    async fn take(&self, key: &str) -> Result<Option<String>> {
        // Atomic: at most one caller receives the value
        Ok(self
            .entries
            .remove(key)
            .filter(|(_, entry)| !entry.is_expired())
            .map(|(_, entry)| entry.value))
    }
}

/// Background task to periodically drop expired entries
pub async fn run_expiry_cleanup(store: Arc<MemoryStore>, interval_seconds: u64) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_seconds));

    loop {
        interval.tick().await;
        store.purge_expired();
        tracing::debug!("Session store cleanup complete, {} entries remaining", store.len());
    }
}
