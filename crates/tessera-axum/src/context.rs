//! Request context types.

use tessera_types::UserContext;

/// Header carrying the opaque token.
pub const TOKEN_HEADER: &str = "token";

/// Whether a route needs a signed-in user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthPolicy {
    /// Reject requests without an authenticated context.
    Required,
    /// Let every request through; handlers decide.
    #[default]
    Ignored,
}

/// Extension key for storing the resolved context in request extensions.
#[derive(Debug, Clone)]
pub struct UserContextExt(pub UserContext);
