//! Common error types

use thiserror::Error;

/// Errors raised while validating identity fields at the boundary
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypeError {
    /// User type code is not one of the known variants
    #[error("unknown user type code: {0}")]
    UnknownUserType(i32),

    /// User type name is not one of the known variants
    #[error("unknown user type name: {0}")]
    UnknownUserTypeName(String),
}
