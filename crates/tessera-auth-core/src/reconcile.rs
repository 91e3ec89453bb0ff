//! Background reconciliation of cached contexts against the session store
//!
//! Every period the worker drains a batch of recently seen tokens, resolves
//! them to distinct user ids and re-reads those users' records with a single
//! multi-get. Present records refresh the context cache; missing ones
//! invalidate it, which is how a sign-out on another node reaches this one.
//!
//! A failed or entirely empty multi-get invalidates every user in the batch.
//! A store outage therefore forces those users back through the store on
//! their next request instead of leaving stale identities cached.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tessera_types::UserId;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use crate::cache::LocalContextCache;
use crate::keys::user_context_key;
use crate::metrics::record_reconcile_cycle;
use crate::queue::PendingVerificationQueue;
use crate::resolver::TokenResolver;
use crate::store::{ContextCodec, RemoteSessionStore};

/// Outcome of one reconciliation cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Tokens taken off the queue
    pub drained: usize,
    /// Distinct user ids those tokens resolved to
    pub users: usize,
    /// Context entries replaced with fresh records
    pub refreshed: usize,
    /// Context entries removed
    pub invalidated: usize,
    /// The multi-get errored or returned a misaligned result
    pub store_failed: bool,
}

/// Periodic reconciler.
///
/// Clones share the cycle lock, so cycles never overlap no matter how many
/// handles call [`run_cycle`](Self::run_cycle).
pub struct ReconciliationWorker<S, C> {
    resolver: TokenResolver,
    contexts: LocalContextCache,
    queue: PendingVerificationQueue,
    store: Arc<S>,
    codec: Arc<C>,
    interval: Duration,
    batch_size: usize,
    cycle_lock: Arc<Mutex<()>>,
}

impl<S, C> Clone for ReconciliationWorker<S, C> {
    fn clone(&self) -> Self {
        Self {
            resolver: self.resolver.clone(),
            contexts: self.contexts.clone(),
            queue: self.queue.clone(),
            store: Arc::clone(&self.store),
            codec: Arc::clone(&self.codec),
            interval: self.interval,
            batch_size: self.batch_size,
            cycle_lock: Arc::clone(&self.cycle_lock),
        }
    }
}

impl<S, C> std::fmt::Debug for ReconciliationWorker<S, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReconciliationWorker")
            .field("interval", &self.interval)
            .field("batch_size", &self.batch_size)
            .finish_non_exhaustive()
    }
}

impl<S, C> ReconciliationWorker<S, C>
where
    S: RemoteSessionStore + 'static,
    C: ContextCodec + 'static,
{
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        resolver: TokenResolver,
        contexts: LocalContextCache,
        queue: PendingVerificationQueue,
        store: Arc<S>,
        codec: Arc<C>,
        interval: Duration,
        batch_size: usize,
        cycle_lock: Arc<Mutex<()>>,
    ) -> Self {
        Self {
            resolver,
            contexts,
            queue,
            store,
            codec,
            interval,
            batch_size,
            cycle_lock,
        }
    }

    /// Run one cycle now, waiting for any cycle already in progress.
    #[instrument(skip(self), level = "debug")]
    pub async fn run_cycle(&self) -> CycleReport {
        let _guard = self.cycle_lock.lock().await;
        let started = Instant::now();

        let tokens = self.queue.drain(self.batch_size).await;
        let mut report = CycleReport {
            drained: tokens.len(),
            ..CycleReport::default()
        };
        if tokens.is_empty() {
            return report;
        }

        let mut user_ids: Vec<UserId> = Vec::with_capacity(tokens.len());
        for token in &tokens {
            if let Some(user_id) = self.resolver.resolve(token).await {
                if !user_ids.contains(&user_id) {
                    user_ids.push(user_id);
                }
            }
        }
        report.users = user_ids.len();

        if !user_ids.is_empty() {
            self.reconcile(&user_ids, &mut report).await;
        }

        record_reconcile_cycle(
            report.refreshed,
            report.invalidated,
            started.elapsed().as_secs_f64(),
        );
        tracing::debug!(
            drained = report.drained,
            users = report.users,
            refreshed = report.refreshed,
            invalidated = report.invalidated,
            store_failed = report.store_failed,
            "reconciliation cycle finished"
        );
        report
    }

    async fn reconcile(&self, user_ids: &[UserId], report: &mut CycleReport) {
        let keys: Vec<String> = user_ids.iter().copied().map(user_context_key).collect();

        let records = match self.store.multi_get(&keys).await {
            Ok(records) if records.len() == keys.len() => Some(records),
            Ok(records) => {
                tracing::error!(
                    expected = keys.len(),
                    received = records.len(),
                    "session store returned misaligned batch"
                );
                None
            }
            Err(err) => {
                tracing::error!(error = %err, users = keys.len(), "session store batch read failed");
                None
            }
        };
        report.store_failed = records.is_none();

        let records = records.filter(|records| records.iter().any(|r| is_present(r.as_deref())));
        let Some(records) = records else {
            if !report.store_failed {
                tracing::info!(users = keys.len(), "no session records found for batch");
            }
            for user_id in user_ids {
                self.contexts.invalidate(*user_id).await;
            }
            report.invalidated = user_ids.len();
            return;
        };

        for (user_id, record) in user_ids.iter().copied().zip(records) {
            let parsed = match record.as_deref() {
                Some(raw) if is_present(Some(raw)) => match self.codec.decode(raw) {
                    Ok(context) => Some(context),
                    Err(err) => {
                        tracing::warn!(user_id = %user_id, error = %err, "unparseable session record");
                        None
                    }
                },
                _ => None,
            };

            match parsed {
                Some(context) => {
                    self.contexts.put(user_id, context).await;
                    report.refreshed += 1;
                }
                None => {
                    tracing::debug!(user_id = %user_id, "session gone, invalidating context");
                    self.contexts.invalidate(user_id).await;
                    report.invalidated += 1;
                }
            }
        }
    }

    /// Run cycles on the configured period until `shutdown` is cancelled.
    ///
    /// The first cycle runs immediately. Ticks missed while a slow cycle was
    /// running are skipped rather than replayed.
    pub async fn run(self, shutdown: CancellationToken) {
        let period = self.interval.max(Duration::from_millis(1));
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::info!(
            interval_ms = period.as_millis() as u64,
            batch_size = self.batch_size,
            "reconciliation worker started"
        );

        loop {
            tokio::select! {
                biased;
                () = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    self.run_cycle().await;
                }
            }
        }

        tracing::info!("reconciliation worker stopped");
    }

    /// Spawn [`run`](Self::run) onto the current runtime.
    pub fn spawn(self, shutdown: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }
}

fn is_present(record: Option<&str>) -> bool {
    record.is_some_and(|raw| !raw.trim().is_empty())
}
