//! Pending verification queue
//!
//! Tokens seen on the request path are offered here; the reconciliation
//! worker drains them in batches. Multi-producer, single logical consumer.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::error::{SendTimeoutError, TryRecvError};
use tokio::sync::{mpsc, Mutex};

use crate::error::AuthError;
use crate::metrics::record_queue_dropped;

/// Bounded FIFO of tokens awaiting reconciliation.
///
/// Clones share the same channel.
#[derive(Clone)]
pub struct PendingVerificationQueue {
    tx: mpsc::Sender<String>,
    rx: Arc<Mutex<mpsc::Receiver<String>>>,
    offer_timeout: Duration,
}

impl PendingVerificationQueue {
    /// Create a queue holding at most `capacity` tokens (minimum 1).
    pub fn new(capacity: usize, offer_timeout: Duration) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        Self {
            tx,
            rx: Arc::new(Mutex::new(rx)),
            offer_timeout,
        }
    }

    /// Enqueue a token, waiting up to the offer timeout for room.
    ///
    /// Returns `false` when the token was dropped. Dropping never surfaces
    /// as an error to request handling; the drop is logged and counted.
    pub async fn offer(&self, token: &str) -> bool {
        if token.trim().is_empty() {
            return false;
        }

        match self.try_offer(token).await {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    timeout_ms = self.offer_timeout.as_millis() as u64,
                    "dropping token"
                );
                record_queue_dropped();
                false
            }
        }
    }

    /// Enqueue a token, reporting a drop instead of recording it.
    ///
    /// # Errors
    /// `QueueSaturated` when no room opened within the offer timeout.
    pub async fn try_offer(&self, token: &str) -> Result<(), AuthError> {
        self.tx
            .send_timeout(token.to_owned(), self.offer_timeout)
            .await
            .map_err(|err| {
                if let SendTimeoutError::Closed(_) = err {
                    tracing::debug!("verification queue closed");
                }
                AuthError::QueueSaturated
            })
    }

    /// Remove up to `max` tokens in FIFO order without waiting.
    pub async fn drain(&self, max: usize) -> Vec<String> {
        let mut rx = self.rx.lock().await;
        let mut batch = Vec::with_capacity(max.min(rx.len()));
        while batch.len() < max {
            match rx.try_recv() {
                Ok(token) => batch.push(token),
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        batch
    }

    /// Tokens currently waiting.
    pub fn len(&self) -> usize {
        self.tx.max_capacity() - self.tx.capacity()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for PendingVerificationQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingVerificationQueue")
            .field("len", &self.len())
            .field("capacity", &self.tx.max_capacity())
            .field("offer_timeout", &self.offer_timeout)
            .finish()
    }
}
