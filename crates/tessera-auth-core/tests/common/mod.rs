//! Common test utilities for tessera-auth-core integration tests

pub mod mock_store;

#[allow(unused_imports)]
pub use mock_store::MockSessionStore;
