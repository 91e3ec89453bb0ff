//! Remote session store seam
//!
//! The store is the authority on whether a user is signed in. It maps
//! `user:sso:context:{id}` keys to serialized context records and is written
//! by the sign-in and sign-out flows elsewhere; this crate only reads it.

use async_trait::async_trait;
use tessera_types::UserContext;

use crate::{ContextCodecError, StoreError};

/// Read access to the remote session store.
#[async_trait]
pub trait RemoteSessionStore: Send + Sync {
    /// Fetch one record. `Ok(None)` means the user is signed out.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Fetch several records in one round trip.
    ///
    /// The result is positionally aligned with `keys`.
    async fn multi_get(&self, keys: &[String]) -> Result<Vec<Option<String>>, StoreError>;
}

/// Conversion between a context record and its stored text.
pub trait ContextCodec: Send + Sync {
    fn encode(&self, context: &UserContext) -> Result<String, ContextCodecError>;

    fn decode(&self, raw: &str) -> Result<UserContext, ContextCodecError>;
}

/// JSON records with camelCase keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonContextCodec;

impl ContextCodec for JsonContextCodec {
    fn encode(&self, context: &UserContext) -> Result<String, ContextCodecError> {
        Ok(serde_json::to_string(context)?)
    }

    fn decode(&self, raw: &str) -> Result<UserContext, ContextCodecError> {
        Ok(serde_json::from_str(raw)?)
    }
}
