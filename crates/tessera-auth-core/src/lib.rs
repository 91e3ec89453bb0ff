//! Tessera Auth Core - Token authentication business logic
//!
//! Opaque token issuance and decoding, the local token and context caches,
//! and the background worker that reconciles those caches with the remote
//! session store.

pub mod cache;
pub mod codec;
pub mod config;
pub mod error;
pub mod host;
pub mod identity;
pub mod keys;
pub mod metrics;
pub mod queue;
pub mod reconcile;
pub mod resolver;
pub mod service;
pub mod store;

pub use cache::*;
pub use codec::*;
pub use config::*;
pub use error::*;
pub use identity::*;
pub use queue::*;
pub use reconcile::*;
pub use resolver::*;
pub use service::*;
pub use store::*;
