//! Redis-backed key-value store.

use super::KeyValueStore;
use anyhow::{Context, Result};
use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, Client};
use std::time::Duration;
use tracing::{debug, info};

/// Session store on a shared Redis instance.
///
/// Expiry is delegated to Redis (`SET key value EX ttl`).
#[derive(Clone)]
pub struct RedisStore {
    connection_manager: ConnectionManager,
}

impl RedisStore {
    /// Connect to `redis://[:password@]host:port/db`.
    pub async fn connect(url: &str) -> Result<Self> {
        let client = Client::open(url).context("Failed to create Redis client")?;
        let connection_manager = ConnectionManager::new(client)
            .await
            .context("Failed to connect to Redis")?;

        info!("Redis connection established");

        Ok(Self { connection_manager })
    }
}

/// Seconds for `SET ... EX`; Redis rejects 0
fn expiry_seconds(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.connection_manager.clone();
        let value: Option<String> = conn
            .get(key)
            .await
            .with_context(|| format!("Redis GET failed for {}", key))?;
        Ok(value)
    }

    async fn set_with_expiry(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        debug!(key = %key, ttl_seconds = ttl.as_secs(), "Redis SET EX");

        let mut conn = self.connection_manager.clone();
        conn.set_ex::<_, _, ()>(key, value, expiry_seconds(ttl))
            .await
            .with_context(|| format!("Redis SET failed for {}", key))?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.connection_manager.clone();
        conn.del::<_, ()>(key)
            .await
            .with_context(|| format!("Redis DEL failed for {}", key))?;
        Ok(())
    }

    async fn take(&self, key: &str) -> Result<Option<String>> {
        // GETDEL: only one of several concurrent readers sees the value
        let mut conn = self.connection_manager.clone();
        let value: Option<String> = conn
            .get_del(key)
            .await
            .with_context(|| format!("Redis GETDEL failed for {}", key))?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry_seconds() {
        assert_eq!(expiry_seconds(Duration::from_secs(600)), 600);
        assert_eq!(expiry_seconds(Duration::from_millis(1500)), 1);
        assert_eq!(expiry_seconds(Duration::ZERO), 1);
    }

    fn redis_url() -> String {
        std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string())
    }

    #[tokio::test]
    #[ignore = "requires Redis instance"]
    async fn test_redis_round_trip_and_expiry() {
        let store = RedisStore::connect(&redis_url()).await.unwrap();
        let key = "hubspot_state:test-org:test-user";

        store
            .set_with_expiry(key, "value", Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(store.get(key).await.unwrap().as_deref(), Some("value"));

        tokio::time::sleep(Duration::from_millis(2100)).await;
        assert_eq!(store.get(key).await.unwrap(), None);

        // Deleting a missing key is fine
        store.delete(key).await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires Redis instance"]
    async fn test_redis_take_hands_out_value_once() {
        let store = RedisStore::connect(&redis_url()).await.unwrap();
        let key = "hubspot_credentials:test-org:test-user";
        store
            .set_with_expiry(key, r#"{"access_token":"at"}"#, Duration::from_secs(60))
            .await
            .unwrap();

        let (first, second) = tokio::join!(store.take(key), store.take(key));
        let winners = [first.unwrap(), second.unwrap()]
            .into_iter()
            .flatten()
            .count();

        assert_eq!(winners, 1);
        assert_eq!(store.get(key).await.unwrap(), None);
    }
}
