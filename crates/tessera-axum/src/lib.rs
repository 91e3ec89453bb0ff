//! Tessera Axum Integration
//!
//! Axum middleware and extractors for opaque token authentication.
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use tessera_axum::{RequireAuth, TesseraLayer};
//! use axum::{Router, routing::get};
//!
//! async fn me(auth: RequireAuth) -> String {
//!     format!("Hello, user {:?}!", auth.user_id)
//! }
//!
//! let app = Router::new()
//!     .route("/me", get(me))
//!     .layer(TesseraLayer::new(Arc::clone(&token_service)));
//! ```
//!
//! The layer resolves every request's [`UserContext`](tessera_types::UserContext)
//! from the `token` header and the client address, then stores it in the
//! request extensions.
//!
//! # Extractors
//!
//! - [`RequireAuth`] - Requires a signed-in user (401 otherwise)
//! - [`MaybeAuth`] - Signed-in user or `None`
//! - [`RequestContext`] - Whatever context the layer resolved, possibly anonymous

pub mod client_ip;
pub mod context;
pub mod error;
pub mod extractors;
pub mod layer;

// Re-export primary types
pub use client_ip::client_ip;
pub use context::{AuthPolicy, UserContextExt, TOKEN_HEADER};
pub use error::AuthRejection;
pub use extractors::{MaybeAuth, RequestContext, RequireAuth};
pub use layer::{TesseraConfig, TesseraLayer, TesseraService};
