//! Redis session store implementation

use ::redis::AsyncCommands;
use async_trait::async_trait;
use tessera_auth_core::{RemoteSessionStore, StoreError};

use crate::pool::RedisPool;

/// Session store reading context records from Redis
#[derive(Clone)]
pub struct RedisSessionStore {
    pool: RedisPool,
}

impl RedisSessionStore {
    /// Create a new Redis session store
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }

    /// Underlying pool
    pub fn pool(&self) -> &RedisPool {
        &self.pool
    }

    async fn connection(&self) -> Result<deadpool_redis::Connection, StoreError> {
        self.pool.get().await.map_err(|e| {
            tracing::warn!(error = %e, "failed to get redis connection");
            StoreError::Unavailable(e.to_string())
        })
    }
}

impl std::fmt::Debug for RedisSessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = self.pool.status();
        f.debug_struct("RedisSessionStore")
            .field("max_size", &status.max_size)
            .field("size", &status.size)
            .field("available", &status.available)
            .finish()
    }
}

#[async_trait]
impl RemoteSessionStore for RedisSessionStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.connection().await?;
        conn.get::<_, Option<String>>(key).await.map_err(|e| {
            tracing::warn!(key = %key, error = %e, "redis GET error");
            StoreError::Unavailable(e.to_string())
        })
    }

    async fn multi_get(&self, keys: &[String]) -> Result<Vec<Option<String>>, StoreError> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.connection().await?;
        let values: Vec<Option<String>> = ::redis::cmd("MGET")
            .arg(keys)
            .query_async(&mut conn)
            .await
            .map_err(|e| {
                tracing::warn!(keys = keys.len(), error = %e, "redis MGET error");
                StoreError::Unavailable(e.to_string())
            })?;

        if values.len() != keys.len() {
            return Err(StoreError::Protocol(format!(
                "MGET returned {} values for {} keys",
                values.len(),
                keys.len()
            )));
        }
        Ok(values)
    }
}
