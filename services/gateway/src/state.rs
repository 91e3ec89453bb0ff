//! Application state

use std::sync::Arc;

use tessera_auth_core::TokenService;
use tessera_store::{RedisPool, RedisSessionStore};

use crate::config::Config;

/// Token service backed by the Redis session store
pub type GatewayTokenService = TokenService<RedisSessionStore>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub tokens: Arc<GatewayTokenService>,
    pub pool: RedisPool,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(tokens: Arc<GatewayTokenService>, pool: RedisPool, config: Config) -> Self {
        Self {
            tokens,
            pool,
            config: Arc::new(config),
        }
    }
}
