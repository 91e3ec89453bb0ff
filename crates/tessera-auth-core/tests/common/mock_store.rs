//! In-memory session store for testing

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tessera_auth_core::keys::user_context_key;
use tessera_auth_core::{RemoteSessionStore, StoreError};
use tessera_types::{UserContext, UserId};

/// Session store backed by a map, counting every read
#[derive(Default, Clone)]
pub struct MockSessionStore {
    records: Arc<DashMap<String, String>>,
    reads: Arc<AtomicUsize>,
    batch_reads: Arc<AtomicUsize>,
    down: Arc<AtomicBool>,
    batch_delay_ms: Arc<AtomicU64>,
    batches_in_flight: Arc<AtomicUsize>,
    peak_batches_in_flight: Arc<AtomicUsize>,
}

#[allow(dead_code)]
impl MockSessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a context under its user's key
    pub fn insert_context(&self, context: &UserContext) {
        let user_id = context.user_id.expect("context needs a user id");
        self.records.insert(
            user_context_key(user_id),
            serde_json::to_string(context).expect("context serializes"),
        );
    }

    /// Store raw text under a user's key
    pub fn insert_raw(&self, user_id: UserId, raw: &str) {
        self.records.insert(user_context_key(user_id), raw.to_string());
    }

    /// Simulate sign-out
    pub fn remove(&self, user_id: UserId) {
        self.records.remove(&user_context_key(user_id));
    }

    /// Make every call fail until turned back on
    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    /// Single-key reads served so far
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Multi-get calls served so far
    pub fn batch_reads(&self) -> usize {
        self.batch_reads.load(Ordering::SeqCst)
    }

    /// Hold every multi-get open for `delay` before answering
    pub fn set_batch_delay(&self, delay: Duration) {
        self.batch_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    /// Most multi-get calls ever observed running at the same time
    pub fn peak_batches_in_flight(&self) -> usize {
        self.peak_batches_in_flight.load(Ordering::SeqCst)
    }

    fn check_up(&self) -> Result<(), StoreError> {
        if self.down.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteSessionStore for MockSessionStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.check_up()?;
        Ok(self.records.get(key).map(|r| r.value().clone()))
    }

    async fn multi_get(&self, keys: &[String]) -> Result<Vec<Option<String>>, StoreError> {
        self.batch_reads.fetch_add(1, Ordering::SeqCst);
        let in_flight = self.batches_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_batches_in_flight
            .fetch_max(in_flight, Ordering::SeqCst);

        let delay = self.batch_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        self.batches_in_flight.fetch_sub(1, Ordering::SeqCst);

        self.check_up()?;
        Ok(keys
            .iter()
            .map(|key| self.records.get(key).map(|r| r.value().clone()))
            .collect())
    }
}
