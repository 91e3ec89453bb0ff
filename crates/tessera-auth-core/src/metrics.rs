//! Token service metrics
//!
//! Recorded through the `metrics` facade; nothing is exported unless the
//! host process installs a recorder (the gateway installs the Prometheus one).
//!
//! # Metrics
//!
//! - `tessera_cache_hits_total{cache}` - Local cache hits
//! - `tessera_cache_misses_total{cache}` - Local cache misses
//! - `tessera_decode_failures_total` - Tokens that failed to decode
//! - `tessera_queue_dropped_total` - Tokens dropped because the verification queue stayed full
//! - `tessera_reconcile_invalidated_total` - Context entries invalidated by reconciliation
//! - `tessera_reconcile_refreshed_total` - Context entries refreshed by reconciliation
//! - `tessera_reconcile_cycle_seconds` - Duration of reconciliation cycles

use metrics::{counter, histogram};

/// Metric name for local cache hits.
pub const CACHE_HITS_TOTAL: &str = "tessera_cache_hits_total";

/// Metric name for local cache misses.
pub const CACHE_MISSES_TOTAL: &str = "tessera_cache_misses_total";

/// Metric name for decode failures.
pub const DECODE_FAILURES_TOTAL: &str = "tessera_decode_failures_total";

/// Metric name for dropped queue offers.
pub const QUEUE_DROPPED_TOTAL: &str = "tessera_queue_dropped_total";

/// Metric name for reconciliation invalidations.
pub const RECONCILE_INVALIDATED_TOTAL: &str = "tessera_reconcile_invalidated_total";

/// Metric name for reconciliation refreshes.
pub const RECONCILE_REFRESHED_TOTAL: &str = "tessera_reconcile_refreshed_total";

/// Metric name for reconciliation cycle duration.
pub const RECONCILE_CYCLE_SECONDS: &str = "tessera_reconcile_cycle_seconds";

/// Local cache names for metric labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheKind {
    Token,
    Context,
}

impl CacheKind {
    /// Get the cache name as a string for metrics labels.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Token => "token",
            Self::Context => "context",
        }
    }
}

pub(crate) fn record_cache_lookup(kind: CacheKind, hit: bool) {
    let name = if hit { CACHE_HITS_TOTAL } else { CACHE_MISSES_TOTAL };
    counter!(name, "cache" => kind.as_str()).increment(1);
}

pub(crate) fn record_decode_failure() {
    counter!(DECODE_FAILURES_TOTAL).increment(1);
}

pub(crate) fn record_queue_dropped() {
    counter!(QUEUE_DROPPED_TOTAL).increment(1);
}

pub(crate) fn record_reconcile_cycle(refreshed: usize, invalidated: usize, seconds: f64) {
    counter!(RECONCILE_REFRESHED_TOTAL).increment(refreshed as u64);
    counter!(RECONCILE_INVALIDATED_TOTAL).increment(invalidated as u64);
    histogram!(RECONCILE_CYCLE_SECONDS).record(seconds);
}

/// Describe all metrics for registration with a recorder.
///
/// Call this during application startup, after installing the recorder.
pub fn describe_metrics() {
    use metrics::{describe_counter, describe_histogram, Unit};

    describe_counter!(CACHE_HITS_TOTAL, Unit::Count, "Local cache hits by cache");
    describe_counter!(CACHE_MISSES_TOTAL, Unit::Count, "Local cache misses by cache");
    describe_counter!(
        DECODE_FAILURES_TOTAL,
        Unit::Count,
        "Tokens that failed to decode"
    );
    describe_counter!(
        QUEUE_DROPPED_TOTAL,
        Unit::Count,
        "Tokens dropped because the verification queue stayed full"
    );
    describe_counter!(
        RECONCILE_INVALIDATED_TOTAL,
        Unit::Count,
        "Context cache entries invalidated by reconciliation"
    );
    describe_counter!(
        RECONCILE_REFRESHED_TOTAL,
        Unit::Count,
        "Context cache entries refreshed by reconciliation"
    );
    describe_histogram!(
        RECONCILE_CYCLE_SECONDS,
        Unit::Seconds,
        "Duration of reconciliation cycles in seconds"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_kind_names() {
        assert_eq!(CacheKind::Token.as_str(), "token");
        assert_eq!(CacheKind::Context.as_str(), "context");
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        describe_metrics();
        record_cache_lookup(CacheKind::Token, true);
        record_decode_failure();
        record_queue_dropped();
        record_reconcile_cycle(1, 2, 0.01);
    }
}
