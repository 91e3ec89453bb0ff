//! Auth errors

use thiserror::Error;

/// Authentication errors
#[derive(Error, Debug)]
pub enum AuthError {
    /// Issuance called without a usable identity
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Token could not be decoded
    #[error("invalid token: {0}")]
    Decode(#[from] DecodeError),

    /// Remote session store could not be read
    #[error("session store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),

    /// Verification queue stayed full for the whole offer timeout
    #[error("verification queue saturated")]
    QueueSaturated,
}

impl AuthError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidInput(_) => 400,
            Self::Decode(_) => 401,
            Self::StoreUnavailable(_) | Self::QueueSaturated => 503,
        }
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::Decode(_) => "INVALID_TOKEN",
            Self::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            Self::QueueSaturated => "QUEUE_SATURATED",
        }
    }
}

/// Reasons a token string fails to decode
///
/// Always recoverable: the caller is treated as unauthenticated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Empty or whitespace-only token
    #[error("token is blank")]
    Blank,

    /// Fewer than two characters
    #[error("token is too short")]
    TooShort,

    /// Leading check digit does not match the payload
    #[error("checksum mismatch")]
    ChecksumMismatch,

    /// Payload is not valid url-safe base64
    #[error("malformed base64 payload: {0}")]
    Base64(String),

    /// Payload bytes are not a valid identity record
    #[error("malformed identity payload: {0}")]
    Payload(String),

    /// A field every issued token carries is absent
    #[error("missing field: {0}")]
    MissingField(&'static str),
}

impl From<base64::DecodeError> for DecodeError {
    fn from(err: base64::DecodeError) -> Self {
        Self::Base64(err.to_string())
    }
}

impl From<prost::DecodeError> for DecodeError {
    fn from(err: prost::DecodeError) -> Self {
        Self::Payload(err.to_string())
    }
}

/// Remote session store failures
#[derive(Error, Debug, Clone)]
pub enum StoreError {
    /// Store could not be reached or the command failed
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Store answered with something that breaks the contract
    #[error("unexpected store response: {0}")]
    Protocol(String),
}

/// Errors converting between a context record and its stored form
#[derive(Error, Debug)]
pub enum ContextCodecError {
    /// JSON (de)serialization failed
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AuthError::InvalidInput("x".into()).status_code(), 400);
        assert_eq!(AuthError::Decode(DecodeError::ChecksumMismatch).status_code(), 401);
        assert_eq!(
            AuthError::StoreUnavailable(StoreError::Unavailable("down".into())).status_code(),
            503
        );
        assert_eq!(AuthError::QueueSaturated.status_code(), 503);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(AuthError::Decode(DecodeError::Blank).error_code(), "INVALID_TOKEN");
        assert_eq!(AuthError::InvalidInput("x".into()).error_code(), "INVALID_INPUT");
        assert_eq!(
            AuthError::from(StoreError::Protocol("short".into())).error_code(),
            "STORE_UNAVAILABLE"
        );
        assert_eq!(AuthError::QueueSaturated.error_code(), "QUEUE_SATURATED");
    }

    #[test]
    fn test_decode_error_conversion() {
        let err: AuthError = DecodeError::TooShort.into();
        assert!(matches!(err, AuthError::Decode(DecodeError::TooShort)));
        assert_eq!(err.to_string(), "invalid token: token is too short");
    }
}
