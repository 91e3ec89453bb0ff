//! Axum extractors for authentication.
//!
//! These extractors read the context stored by [`TesseraLayer`](crate::TesseraLayer).
//!
//! # Usage
//!
//! ```ignore
//! use tessera_axum::{MaybeAuth, RequireAuth};
//!
//! // Requires a signed-in user (401 otherwise)
//! async fn protected(auth: RequireAuth) -> String {
//!     format!("Hello, {:?}!", auth.user_name)
//! }
//!
//! // Optional authentication
//! async fn maybe_auth(auth: MaybeAuth) -> String {
//!     match auth.0 {
//!         Some(ctx) => format!("Hello, {:?}!", ctx.user_id),
//!         None => "Hello, guest!".to_string(),
//!     }
//! }
//! ```

use std::convert::Infallible;
use std::ops::Deref;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tessera_types::UserContext;

use crate::context::UserContextExt;
use crate::error::AuthRejection;

fn stored_context(parts: &Parts) -> Option<UserContext> {
    parts
        .extensions
        .get::<UserContextExt>()
        .map(|ext| ext.0.clone())
}

/// Extractor that requires an authenticated user.
///
/// Rejects with `TOKEN_EXPIRED` when the token decodes but its session is
/// gone, and `UNAUTHENTICATED` otherwise.
#[derive(Debug, Clone)]
pub struct RequireAuth(pub UserContext);

impl Deref for RequireAuth {
    type Target = UserContext;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let context = stored_context(parts).ok_or(AuthRejection::Unauthenticated)?;
        if context.is_authenticated() {
            Ok(Self(context))
        } else {
            Err(AuthRejection::for_context(&context))
        }
    }
}

/// Extractor for optional authentication.
///
/// `None` unless the request carries an authenticated context.
#[derive(Debug, Clone)]
pub struct MaybeAuth(pub Option<UserContext>);

impl Deref for MaybeAuth {
    type Target = Option<UserContext>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for MaybeAuth
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(
            stored_context(parts).filter(UserContext::is_authenticated),
        ))
    }
}

/// Extractor for the raw resolved context, anonymous if the layer is absent.
#[derive(Debug, Clone)]
pub struct RequestContext(pub UserContext);

impl Deref for RequestContext {
    type Target = UserContext;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(stored_context(parts).unwrap_or_default()))
    }
}
