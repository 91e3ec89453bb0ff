//! Health check handlers

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use std::time::Instant;
use tessera_auth_core::{AuthError, StoreError};

use crate::error::ApiResult;
use crate::state::AppState;

const SERVICE: &str = "gateway";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub checks: ReadyChecks,
}

#[derive(Debug, Serialize)]
pub struct ReadyChecks {
    pub session_store: CheckResult,
}

#[derive(Debug, Serialize)]
pub struct CheckResult {
    pub status: &'static str,
    pub latency_ms: u64,
}

/// GET /health - Liveness probe (fast, no dependencies)
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: SERVICE,
    })
}

/// GET /ready - Readiness probe (pings the session store)
pub async fn ready(State(state): State<AppState>) -> ApiResult<Json<ReadyResponse>> {
    let start = Instant::now();
    let result = tessera_store::ping(&state.pool).await;
    let latency_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(()) => Ok(Json(ReadyResponse {
            status: "ready",
            service: SERVICE,
            checks: ReadyChecks {
                session_store: CheckResult {
                    status: "ok",
                    latency_ms,
                },
            },
        })),
        Err(err) => {
            tracing::warn!(error = %err, latency_ms, "session store not ready");
            Err(AuthError::from(StoreError::Unavailable(err.to_string())).into())
        }
    }
}
