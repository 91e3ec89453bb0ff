//! Rejections produced by the middleware and extractors.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tessera_types::UserContext;

/// Authentication rejections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthRejection {
    /// No usable token was presented.
    #[error("authentication required")]
    Unauthenticated,

    /// The token decodes but its session is gone.
    #[error("token expired")]
    TokenExpired,
}

#[derive(Debug, Serialize)]
struct RejectionBody {
    error: RejectionDetail,
}

#[derive(Debug, Serialize)]
struct RejectionDetail {
    code: &'static str,
    message: String,
}

impl AuthRejection {
    /// Rejection for a context that failed authentication.
    #[must_use]
    pub fn for_context(context: &UserContext) -> Self {
        if context.token_expired {
            Self::TokenExpired
        } else {
            Self::Unauthenticated
        }
    }

    /// Get error code for API responses
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::TokenExpired => "TOKEN_EXPIRED",
        }
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let body = RejectionBody {
            error: RejectionDetail {
                code: self.error_code(),
                message: self.to_string(),
            },
        };
        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_types::{UserId, UserType};

    #[test]
    fn test_error_display() {
        assert_eq!(AuthRejection::Unauthenticated.to_string(), "authentication required");
        assert_eq!(AuthRejection::TokenExpired.error_code(), "TOKEN_EXPIRED");
    }

    #[test]
    fn test_for_context() {
        assert_eq!(
            AuthRejection::for_context(&UserContext::anonymous()),
            AuthRejection::Unauthenticated
        );
        let expired = UserContext::expired(Some(UserId(1)), Some(UserType::Member), "tok");
        assert_eq!(AuthRejection::for_context(&expired), AuthRejection::TokenExpired);
    }

    #[test]
    fn test_status_code() {
        let response = AuthRejection::TokenExpired.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
