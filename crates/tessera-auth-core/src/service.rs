//! Token service - ties together the codec, local caches, queue and session store

use std::sync::Arc;

use tessera_types::{IssuedToken, UserContext, UserId, UserType};
use tokio::sync::Mutex;
use tracing::instrument;

use crate::{
    cache::{LocalContextCache, LocalTokenCache},
    codec::TokenCodec,
    config::TokenServiceConfig,
    identity::RawIdentity,
    keys::user_context_key,
    queue::PendingVerificationQueue,
    reconcile::ReconciliationWorker,
    resolver::TokenResolver,
    store::{ContextCodec, JsonContextCodec, RemoteSessionStore},
    AuthError,
};

/// Token service
///
/// Answers "who is this token" for request handling:
/// - Token to user id through the token cache, falling back to decoding
/// - User id to context through the context cache, falling back to one store read
/// - Every context lookup queues the token for background re-checking
///
/// Owns the caches and the queue; [`worker`](Self::worker) hands out a
/// reconciler sharing them.
pub struct TokenService<S: RemoteSessionStore, C: ContextCodec = JsonContextCodec> {
    config: TokenServiceConfig,
    codec: TokenCodec,
    resolver: TokenResolver,
    contexts: LocalContextCache,
    queue: PendingVerificationQueue,
    store: Arc<S>,
    context_codec: Arc<C>,
    cycle_lock: Arc<Mutex<()>>,
}

impl<S: RemoteSessionStore + 'static> TokenService<S, JsonContextCodec> {
    /// Create a service storing contexts as JSON
    pub fn new(config: TokenServiceConfig, store: Arc<S>) -> Self {
        Self::with_codec(config, store, Arc::new(JsonContextCodec))
    }
}

impl<S: RemoteSessionStore + 'static, C: ContextCodec + 'static> TokenService<S, C> {
    /// Create a service with a custom context record format
    pub fn with_codec(config: TokenServiceConfig, store: Arc<S>, context_codec: Arc<C>) -> Self {
        let codec = TokenCodec::new();
        Self {
            resolver: TokenResolver::new(codec, LocalTokenCache::new(&config)),
            contexts: LocalContextCache::new(&config),
            queue: PendingVerificationQueue::new(config.queue_capacity, config.offer_timeout),
            codec,
            store,
            context_codec,
            cycle_lock: Arc::new(Mutex::new(())),
            config,
        }
    }

    /// Reconciliation worker sharing this service's caches and queue
    pub fn worker(&self) -> ReconciliationWorker<S, C> {
        ReconciliationWorker::new(
            self.resolver.clone(),
            self.contexts.clone(),
            self.queue.clone(),
            Arc::clone(&self.store),
            Arc::clone(&self.context_codec),
            self.config.reconcile_interval,
            self.config.reconcile_batch_size,
            Arc::clone(&self.cycle_lock),
        )
    }

    // =========================================================================
    // Issuance
    // =========================================================================

    /// Issue a token and seed the token cache with it
    ///
    /// # Errors
    /// `InvalidInput` for a non-positive user id or a host that is not IPv4.
    #[instrument(skip(self), level = "debug")]
    pub async fn issue_token(
        &self,
        user_id: UserId,
        user_type: UserType,
        host_ip: &str,
    ) -> Result<IssuedToken, AuthError> {
        let token = self.codec.encode(user_id, user_type, host_ip)?;
        self.resolver.tokens().put(token.as_str(), user_id).await;
        tracing::debug!(user_id = %user_id, user_type = %user_type, "issued token");
        Ok(token)
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    /// User id behind a token without consulting the session store
    ///
    /// When `enqueue` is set the token is also queued for reconciliation,
    /// cache hit or not.
    #[instrument(skip(self, token), level = "debug")]
    pub async fn get_user_id_directly(&self, token: &str, enqueue: bool) -> Option<UserId> {
        if token.trim().is_empty() {
            return None;
        }

        if enqueue {
            self.queue.offer(token).await;
        }
        self.resolver.resolve(token).await
    }

    /// Authoritative context for a token
    ///
    /// Served from the context cache when possible; otherwise one store read.
    /// A missing record yields `None` but does not invalidate anything: bulk
    /// invalidation belongs to the reconciliation worker. Store and parse
    /// failures are logged and treated as a miss.
    #[instrument(skip(self, token), level = "debug")]
    pub async fn get_user_context(&self, token: &str) -> Option<UserContext> {
        if token.trim().is_empty() {
            return None;
        }

        self.queue.offer(token).await;
        let user_id = self.get_user_id_directly(token, false).await?;

        if let Some(context) = self.contexts.get(user_id).await {
            return Some(context);
        }

        let raw = match self.store.get(&user_context_key(user_id)).await {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!(user_id = %user_id, error = %err, "session store read failed");
                return None;
            }
        };
        let Some(raw) = raw.filter(|raw| !raw.trim().is_empty()) else {
            tracing::debug!(user_id = %user_id, "no session record");
            return None;
        };

        let context = match self.context_codec.decode(&raw) {
            Ok(context) => context,
            Err(err) => {
                tracing::warn!(user_id = %user_id, error = %err, "unparseable session record");
                return None;
            }
        };
        self.contexts.put(user_id, context.clone()).await;
        Some(context)
    }

    /// Decoded identity of a token, for diagnostics and legacy callers
    pub async fn get_serializable_token(
        &self,
        token: &str,
        send_to_queue: bool,
    ) -> Option<RawIdentity> {
        if token.trim().is_empty() {
            return None;
        }
        if send_to_queue {
            self.queue.offer(token).await;
        }
        self.resolver.decode(token)
    }

    /// Context attached to an incoming request
    ///
    /// Never fails. Without a token the caller is anonymous. A token that
    /// decodes but has no session record yields a degraded context flagged
    /// `token_expired`, which identifies the caller for logging but does not
    /// authenticate them.
    #[instrument(skip(self, token), level = "debug")]
    pub async fn resolve_request_context(
        &self,
        token: Option<&str>,
        host: Option<String>,
    ) -> UserContext {
        let Some(token) = token.filter(|t| !t.trim().is_empty()) else {
            return UserContext::anonymous().with_host(host);
        };

        if let Some(context) = self.get_user_context(token).await {
            return context.with_host(host);
        }

        match self.get_serializable_token(token, false).await {
            Some(identity) => {
                UserContext::expired(identity.user_id(), identity.user_type(), token).with_host(host)
            }
            None => UserContext::anonymous().with_host(host),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn config(&self) -> &TokenServiceConfig {
        &self.config
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    pub fn token_cache(&self) -> &LocalTokenCache {
        self.resolver.tokens()
    }

    pub fn context_cache(&self) -> &LocalContextCache {
        &self.contexts
    }

    pub fn queue(&self) -> &PendingVerificationQueue {
        &self.queue
    }
}

impl<S: RemoteSessionStore, C: ContextCodec> std::fmt::Debug for TokenService<S, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("config", &self.config)
            .field("token_cache", self.resolver.tokens())
            .field("context_cache", &self.contexts)
            .field("queue", &self.queue)
            .finish_non_exhaustive()
    }
}
