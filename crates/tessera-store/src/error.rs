//! Store setup errors

use thiserror::Error;

/// Errors building or checking the connection pool
#[derive(Error, Debug)]
pub enum PoolError {
    /// URL or pool settings rejected
    #[error("invalid redis pool config: {0}")]
    Config(#[from] deadpool_redis::CreatePoolError),

    /// No connection could be checked out
    #[error("redis connection unavailable: {0}")]
    Connection(#[from] deadpool_redis::PoolError),

    /// Command failed on a live connection
    #[error("redis error: {0}")]
    Redis(#[from] ::redis::RedisError),
}
