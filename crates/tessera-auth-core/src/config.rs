//! Configuration types for the token service

use std::time::Duration;

/// Token service configuration
///
/// Defaults match the production sizing; tests shrink the durations.
#[derive(Debug, Clone)]
pub struct TokenServiceConfig {
    /// Maximum number of cached token to user id entries.
    /// Default: 5,000
    pub token_cache_capacity: u64,

    /// Token entries are evicted after this long without a read or write.
    /// Default: 10 minutes
    pub token_cache_idle: Duration,

    /// Maximum number of cached user contexts.
    /// Default: 5,000
    pub context_cache_capacity: u64,

    /// Context entries are evicted this long after their last write.
    /// Default: 5 minutes
    pub context_cache_ttl: Duration,

    /// Capacity of the pending verification queue.
    /// Default: 100,000
    pub queue_capacity: usize,

    /// How long an offer may wait for room in a full queue.
    /// Default: 30 seconds
    pub offer_timeout: Duration,

    /// Period of the reconciliation schedule.
    /// Default: 30 seconds
    pub reconcile_interval: Duration,

    /// Maximum tokens drained per reconciliation cycle.
    /// Default: 50
    pub reconcile_batch_size: usize,
}

impl Default for TokenServiceConfig {
    fn default() -> Self {
        Self {
            token_cache_capacity: 5_000,
            token_cache_idle: Duration::from_secs(10 * 60),
            context_cache_capacity: 5_000,
            context_cache_ttl: Duration::from_secs(5 * 60),
            queue_capacity: 100_000,
            offer_timeout: Duration::from_secs(30),
            reconcile_interval: Duration::from_secs(30),
            reconcile_batch_size: 50,
        }
    }
}

impl TokenServiceConfig {
    /// Create a new config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the token cache capacity.
    #[must_use]
    pub fn with_token_cache_capacity(mut self, capacity: u64) -> Self {
        self.token_cache_capacity = capacity;
        self
    }

    /// Set the token cache idle timeout.
    #[must_use]
    pub fn with_token_cache_idle(mut self, idle: Duration) -> Self {
        self.token_cache_idle = idle;
        self
    }

    /// Set the context cache capacity.
    #[must_use]
    pub fn with_context_cache_capacity(mut self, capacity: u64) -> Self {
        self.context_cache_capacity = capacity;
        self
    }

    /// Set the context cache time to live.
    #[must_use]
    pub fn with_context_cache_ttl(mut self, ttl: Duration) -> Self {
        self.context_cache_ttl = ttl;
        self
    }

    /// Set the queue capacity.
    #[must_use]
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Set the queue offer timeout.
    #[must_use]
    pub fn with_offer_timeout(mut self, timeout: Duration) -> Self {
        self.offer_timeout = timeout;
        self
    }

    /// Set the reconciliation period.
    #[must_use]
    pub fn with_reconcile_interval(mut self, interval: Duration) -> Self {
        self.reconcile_interval = interval;
        self
    }

    /// Set the reconciliation batch size.
    #[must_use]
    pub fn with_reconcile_batch_size(mut self, batch: usize) -> Self {
        self.reconcile_batch_size = batch;
        self
    }
}
