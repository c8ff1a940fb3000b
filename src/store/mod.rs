//! Short-lived session storage.
//!
//! The OAuth handshake keeps three kinds of entries, all namespaced by
//! `(org_id, user_id)` and written with an expiry:
//!
//! ```text
//! hubspot_state:{org}:{user}        state JSON (anti-CSRF nonce)
//! hubspot_verifier:{org}:{user}     PKCE code verifier
//! hubspot_credentials:{org}:{user}  token response, read once
//! ```
//!
//! Backends: [`MemoryStore`] for single-process deployments and tests,
//! [`RedisStore`] when several processes share sessions.

mod memory;
mod redis;

pub use self::memory::{run_expiry_cleanup, MemoryStore};
pub use self::redis::RedisStore;

use crate::config::{StoreBackend, StoreConfig};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// How often the in-memory backend sweeps expired entries
const MEMORY_CLEANUP_INTERVAL_SECONDS: u64 = 60;

/// Get/set/delete with expiry.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns `None` for missing or expired keys.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set_with_expiry(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;

    /// Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Read and remove in one step.
    async fn take(&self, key: &str) -> Result<Option<String>> {
        let value = self.get(key).await?;
        if value.is_some() {
            self.delete(key).await?;
        }
        Ok(value)
    }
}

pub fn state_key(org_id: &str, user_id: &str) -> String {
    format!("hubspot_state:{}:{}", org_id, user_id)
}

pub fn verifier_key(org_id: &str, user_id: &str) -> String {
    format!("hubspot_verifier:{}:{}", org_id, user_id)
}

pub fn credentials_key(org_id: &str, user_id: &str) -> String {
    format!("hubspot_credentials:{}:{}", org_id, user_id)
}

/// Build the configured backend.
///
/// The in-memory backend gets a background sweeper, so this must run inside a
/// Tokio runtime.
pub async fn build_store(config: &StoreConfig) -> Result<Arc<dyn KeyValueStore>> {
    match config.backend {
        StoreBackend::Memory => {
            let store = Arc::new(MemoryStore::new());
            tokio::spawn(run_expiry_cleanup(
                Arc::clone(&store),
                MEMORY_CLEANUP_INTERVAL_SECONDS,
            ));
            info!("Using in-memory session store");
            Ok(store)
        }
        StoreBackend::Redis => {
            let store = RedisStore::connect(&config.redis_url)
                .await
                .context("Failed to initialize Redis session store")?;
            info!("Using Redis session store");
            Ok(Arc::new(store))
        }
    }
}
