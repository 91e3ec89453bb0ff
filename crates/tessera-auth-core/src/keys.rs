//! Remote store key layout
//!
//! Keys are colon separated and always lowercase, e.g. `user:sso:context:42`.

use tessera_types::UserId;

const SEPARATOR: char = ':';

/// Prefix of the authoritative user context records
pub const USER_CONTEXT_PREFIX: &str = "user:sso:context";

/// Build a store key from a prefix and an identifier.
pub fn cache_key(prefix: &str, id: impl std::fmt::Display) -> String {
    format!("{}{SEPARATOR}{}", prefix.trim(), id.to_string().trim()).to_lowercase()
}

/// Key of the context record for a user.
pub fn user_context_key(user_id: UserId) -> String {
    cache_key(USER_CONTEXT_PREFIX, user_id)
}
