//! Identity handlers
//!
//! Thin views over the context the auth layer resolved for the request.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Serialize;
use tessera_auth_core::AuthError;
use tessera_axum::{RequestContext, RequireAuth, TOKEN_HEADER};
use tessera_types::{UserContext, UserId, UserType};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// GET /me - the caller's session record; 401 without a live session
pub async fn me(RequireAuth(context): RequireAuth) -> Json<UserContext> {
    Json(context)
}

/// GET /context - whatever context the request resolved to, anonymous included
pub async fn context(RequestContext(context): RequestContext) -> Json<UserContext> {
    Json(context)
}

/// Fields carried inside a token
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfo {
    pub user_id: Option<UserId>,
    pub user_type: Option<UserType>,
    pub host: Option<String>,
    pub issued_at: Option<String>,
}

/// GET /token - decode the presented token without touching the session store
pub async fn token_info(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<TokenInfo>> {
    let token = headers
        .get(TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.trim().is_empty())
        .ok_or(ApiError::MissingToken)?;

    let identity = state
        .tokens
        .codec()
        .decode(token)
        .map_err(AuthError::from)?;

    Ok(Json(TokenInfo {
        user_id: identity.user_id(),
        user_type: identity.user_type(),
        host: identity.host_ip().map(|ip| ip.to_string()),
        issued_at: identity.issued_at().map(|at| at.to_rfc3339()),
    }))
}
