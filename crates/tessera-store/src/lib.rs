//! Tessera Store - Remote session store backends
//!
//! Redis-backed implementation of the session store the token service reads.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use tessera_store::{create_pool, RedisSessionStore};
//!
//! let pool = create_pool("redis://localhost:6379", 16, Duration::from_secs(2))?;
//! let store = RedisSessionStore::new(pool);
//!
//! let record = store.get("user:sso:context:42").await?;
//! ```

pub mod error;
pub mod pool;
pub mod redis;

pub use error::PoolError;
pub use pool::{create_pool, ping, RedisPool};
pub use redis::RedisSessionStore;
