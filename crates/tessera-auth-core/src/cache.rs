//! Local in-process caches
//!
//! Two bounded caches sit in front of the remote session store:
//!
//! - [`LocalTokenCache`]: token string to user id, evicted after a period
//!   without access. Decoding is deterministic so a stale entry is never wrong.
//! - [`LocalContextCache`]: user id to context, evicted a fixed time after
//!   the last write. Kept honest by the reconciliation worker.
//!
//! Both are cheap to clone; clones share the same storage.

use moka::future::Cache;
use tessera_types::{UserContext, UserId};

use crate::config::TokenServiceConfig;
use crate::metrics::{record_cache_lookup, CacheKind};

/// Token to user id cache with idle expiry.
#[derive(Clone)]
pub struct LocalTokenCache {
    inner: Cache<String, UserId>,
}

impl LocalTokenCache {
    /// Build from the service config.
    pub fn new(config: &TokenServiceConfig) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(config.token_cache_capacity)
                .time_to_idle(config.token_cache_idle)
                .build(),
        }
    }

    /// Look up a token. Refreshes the idle timer on hit.
    pub async fn get(&self, token: &str) -> Option<UserId> {
        let hit = self.inner.get(token).await;
        record_cache_lookup(CacheKind::Token, hit.is_some());
        hit
    }

    /// Associate a token with a user id.
    pub async fn put(&self, token: &str, user_id: UserId) {
        self.inner.insert(token.to_owned(), user_id).await;
    }

    pub async fn invalidate(&self, token: &str) {
        self.inner.invalidate(token).await;
    }

    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }

    /// Approximate entry count; pending maintenance may lag.
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }

    /// Apply pending evictions now.
    pub async fn run_pending_tasks(&self) {
        self.inner.run_pending_tasks().await;
    }
}

impl std::fmt::Debug for LocalTokenCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalTokenCache")
            .field("entries", &self.inner.entry_count())
            .finish()
    }
}

/// User id to context cache with write expiry.
#[derive(Clone)]
pub struct LocalContextCache {
    inner: Cache<UserId, UserContext>,
}

impl LocalContextCache {
    /// Build from the service config.
    pub fn new(config: &TokenServiceConfig) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(config.context_cache_capacity)
                .time_to_live(config.context_cache_ttl)
                .build(),
        }
    }

    pub async fn get(&self, user_id: UserId) -> Option<UserContext> {
        let hit = self.inner.get(&user_id).await;
        record_cache_lookup(CacheKind::Context, hit.is_some());
        hit
    }

    /// Insert or replace; restarts the entry's time to live.
    pub async fn put(&self, user_id: UserId, context: UserContext) {
        self.inner.insert(user_id, context).await;
    }

    pub async fn invalidate(&self, user_id: UserId) {
        self.inner.invalidate(&user_id).await;
    }

    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }

    /// Approximate entry count; pending maintenance may lag.
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }

    /// Apply pending evictions now.
    pub async fn run_pending_tasks(&self) {
        self.inner.run_pending_tasks().await;
    }
}

impl std::fmt::Debug for LocalContextCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalContextCache")
            .field("entries", &self.inner.entry_count())
            .finish()
    }
}
