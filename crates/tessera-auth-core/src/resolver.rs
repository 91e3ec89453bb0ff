//! Token to user id resolution shared by the request path and the worker

use tessera_types::UserId;

use crate::cache::LocalTokenCache;
use crate::codec::TokenCodec;
use crate::identity::RawIdentity;
use crate::metrics::record_decode_failure;

/// Cache-first token resolution.
#[derive(Debug, Clone)]
pub struct TokenResolver {
    codec: TokenCodec,
    tokens: LocalTokenCache,
}

impl TokenResolver {
    pub fn new(codec: TokenCodec, tokens: LocalTokenCache) -> Self {
        Self { codec, tokens }
    }

    /// Decode without touching the cache. Failures are logged and counted.
    pub fn decode(&self, token: &str) -> Option<RawIdentity> {
        match self.codec.decode(token) {
            Ok(identity) => Some(identity),
            Err(err) => {
                tracing::warn!(error = %err, "failed to decode token");
                record_decode_failure();
                None
            }
        }
    }

    /// User id behind a token, consulting the token cache first.
    ///
    /// Only positive ids are cached or returned.
    pub async fn resolve(&self, token: &str) -> Option<UserId> {
        if token.trim().is_empty() {
            return None;
        }

        if let Some(user_id) = self.tokens.get(token).await {
            return Some(user_id);
        }

        let user_id = self.decode(token)?.user_id().filter(|id| id.is_valid())?;
        self.tokens.put(token, user_id).await;
        Some(user_id)
    }

    pub fn tokens(&self) -> &LocalTokenCache {
        &self.tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TokenServiceConfig;
    use tessera_types::UserType;

    fn resolver() -> TokenResolver {
        TokenResolver::new(
            TokenCodec::new(),
            LocalTokenCache::new(&TokenServiceConfig::default()),
        )
    }

    #[tokio::test]
    async fn test_resolve_caches_decoded_id() {
        let resolver = resolver();
        let token = TokenCodec::new()
            .encode(UserId(42), UserType::Member, "10.0.0.5")
            .unwrap();

        assert_eq!(resolver.resolve(token.as_str()).await, Some(UserId(42)));
        assert_eq!(resolver.tokens().get(token.as_str()).await, Some(UserId(42)));
    }

    #[tokio::test]
    async fn test_resolve_prefers_cache() {
        let resolver = resolver();
        resolver.tokens().put("opaque", UserId(5)).await;
        assert_eq!(resolver.resolve("opaque").await, Some(UserId(5)));
    }

    #[tokio::test]
    async fn test_resolve_rejects_garbage() {
        let resolver = resolver();
        assert_eq!(resolver.resolve("").await, None);
        assert_eq!(resolver.resolve("garbage").await, None);
        assert_eq!(resolver.tokens().get("garbage").await, None);
    }

    #[tokio::test]
    async fn test_resolve_skips_non_positive_ids() {
        let resolver = resolver();
        let token = TokenCodec::new().encode_identity(&RawIdentity::new(Some(-3), Some(1), None, 0, 9));
        assert_eq!(resolver.resolve(token.as_str()).await, None);
        assert_eq!(resolver.tokens().get(token.as_str()).await, None);
    }
}
