//! Configuration for the gateway service.

use std::time::Duration;

use tessera_auth_core::TokenServiceConfig;
use tessera_utils::{env_parse, env_var, InvalidEnv};

/// Gateway configuration
#[derive(Clone)]
pub struct Config {
    /// HTTP server port
    pub http_port: u16,

    /// Redis URL of the session store (may embed credentials)
    pub redis_url: String,

    /// Maximum pooled Redis connections
    pub redis_pool_size: usize,

    /// Bound on waiting for, creating and recycling a Redis connection
    pub redis_timeout: Duration,

    /// Token service configuration
    pub tokens: TokenServiceConfig,

    /// Request timeout for identity routes
    pub request_timeout: Duration,

    /// Metrics enabled
    pub metrics_enabled: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Session store
        let redis_url = env_var("REDIS_URL").ok_or(ConfigError::Missing("REDIS_URL"))?;
        let redis_pool_size: usize = env_parse("REDIS_POOL_SIZE", 16)?;
        let redis_timeout_ms: u64 = env_parse("REDIS_TIMEOUT_MS", 2_000)?;
        if redis_pool_size == 0 {
            return Err(ConfigError::Invalid("REDIS_POOL_SIZE"));
        }

        // Server
        let http_port = env_parse("HTTP_PORT", 8080)?;
        let request_timeout_secs: u64 = env_parse("REQUEST_TIMEOUT_SECS", 30)?;

        // Token service, defaults from TokenServiceConfig
        let defaults = TokenServiceConfig::default();
        let token_cache_capacity = env_parse("TOKEN_CACHE_CAPACITY", defaults.token_cache_capacity)?;
        let context_cache_ttl_secs =
            env_parse("CONTEXT_CACHE_TTL_SECS", defaults.context_cache_ttl.as_secs())?;
        let reconcile_interval_secs =
            env_parse("RECONCILE_INTERVAL_SECS", defaults.reconcile_interval.as_secs())?;
        let reconcile_batch_size =
            env_parse("RECONCILE_BATCH_SIZE", defaults.reconcile_batch_size)?;
        if reconcile_interval_secs == 0 {
            return Err(ConfigError::Invalid("RECONCILE_INTERVAL_SECS"));
        }

        // Metrics
        let metrics_enabled = env_parse("METRICS_ENABLED", true)?;

        let tokens = defaults
            .with_token_cache_capacity(token_cache_capacity)
            .with_context_cache_ttl(Duration::from_secs(context_cache_ttl_secs))
            .with_reconcile_interval(Duration::from_secs(reconcile_interval_secs))
            .with_reconcile_batch_size(reconcile_batch_size);

        Ok(Self {
            http_port,
            redis_url,
            redis_pool_size,
            redis_timeout: Duration::from_millis(redis_timeout_ms),
            tokens,
            request_timeout: Duration::from_secs(request_timeout_secs),
            metrics_enabled,
        })
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("http_port", &self.http_port)
            .field("redis_url", &"[REDACTED]")
            .field("redis_pool_size", &self.redis_pool_size)
            .field("redis_timeout", &self.redis_timeout)
            .field("tokens", &self.tokens)
            .field("request_timeout", &self.request_timeout)
            .field("metrics_enabled", &self.metrics_enabled)
            .finish()
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}

impl From<InvalidEnv> for ConfigError {
    fn from(err: InvalidEnv) -> Self {
        Self::Invalid(err.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single test so no other test races on the process environment.
    #[test]
    fn test_from_env() {
        std::env::remove_var("REDIS_URL");
        assert!(matches!(Config::from_env(), Err(ConfigError::Missing("REDIS_URL"))));

        std::env::set_var("REDIS_URL", "redis://:hunter2@localhost:6379");
        std::env::set_var("RECONCILE_BATCH_SIZE", "20");
        let config = Config::from_env().unwrap();
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.redis_pool_size, 16);
        assert_eq!(config.tokens.reconcile_batch_size, 20);
        assert_eq!(config.tokens.reconcile_interval, Duration::from_secs(30));
        assert!(config.metrics_enabled);
        assert!(!format!("{config:?}").contains("hunter2"));

        std::env::set_var("HTTP_PORT", "not-a-port");
        assert!(matches!(Config::from_env(), Err(ConfigError::Invalid("HTTP_PORT"))));
        std::env::remove_var("HTTP_PORT");

        std::env::set_var("RECONCILE_INTERVAL_SECS", "0");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Invalid("RECONCILE_INTERVAL_SECS"))
        ));
        std::env::remove_var("RECONCILE_INTERVAL_SECS");
        std::env::remove_var("RECONCILE_BATCH_SIZE");
    }
}
