//! Redis connection pool

use std::time::Duration;

use deadpool_redis::{Config, Pool, Runtime};

use crate::error::PoolError;

/// Redis connection pool type alias
pub type RedisPool = Pool;

/// Create a new Redis connection pool
///
/// Connections are opened lazily; an unreachable server surfaces on first use.
/// `timeout` bounds waiting for, creating and recycling a connection.
pub fn create_pool(url: &str, max_size: usize, timeout: Duration) -> Result<RedisPool, PoolError> {
    let mut config = Config::from_url(url);
    if let Some(ref mut pool_config) = config.pool {
        pool_config.max_size = max_size.max(1);
        pool_config.timeouts.wait = Some(timeout);
        pool_config.timeouts.create = Some(timeout);
        pool_config.timeouts.recycle = Some(timeout);
    }

    Ok(config.create_pool(Some(Runtime::Tokio1))?)
}

/// Round-trip a PING through the pool
pub async fn ping(pool: &RedisPool) -> Result<(), PoolError> {
    let mut conn = pool.get().await?;
    let _: String = ::redis::cmd("PING").query_async(&mut conn).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_pool_is_lazy() {
        let pool = create_pool("redis://127.0.0.1:1", 4, Duration::from_millis(200));
        assert!(pool.is_ok());
        assert_eq!(pool.unwrap().status().max_size, 4);
    }

    #[test]
    fn test_create_pool_rejects_bad_url() {
        assert!(matches!(
            create_pool("not a url", 4, Duration::from_millis(200)),
            Err(PoolError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_ping_unreachable() {
        let pool = create_pool("redis://127.0.0.1:1", 1, Duration::from_millis(200)).unwrap();
        assert!(ping(&pool).await.is_err());
    }
}
