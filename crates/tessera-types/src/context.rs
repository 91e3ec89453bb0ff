//! Authoritative user context record

use serde::{Deserialize, Serialize};

use crate::{UserId, UserType};

/// Identity record of a signed-in user
///
/// Owned by the remote session store; services only read and cache it.
/// The serialized form uses camelCase keys so records written by other
/// services in the same store stay readable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserContext {
    /// Address of the host the request came from
    #[serde(default)]
    pub host: Option<String>,
    /// Signed-in user
    #[serde(default)]
    pub user_id: Option<UserId>,
    /// Real name, nickname, mobile or login name
    #[serde(default)]
    pub user_name: Option<String>,
    /// Kind of account
    #[serde(default)]
    pub user_type: Option<UserType>,
    /// Mobile number
    #[serde(default)]
    pub mobile: Option<String>,
    /// Token presented at sign-in
    #[serde(default)]
    pub token: Option<String>,
    /// Set when the token decodes but no authoritative record backs it
    #[serde(default)]
    pub token_expired: bool,
}

impl UserContext {
    /// Context for a request without usable credentials
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Degraded identity recovered from the token alone
    ///
    /// Good enough for logging, never for authorization.
    pub fn expired(
        user_id: Option<UserId>,
        user_type: Option<UserType>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            user_type,
            token: Some(token.into()),
            token_expired: true,
            ..Self::default()
        }
    }

    /// Set the requesting host
    #[must_use]
    pub fn with_host(mut self, host: Option<String>) -> Self {
        self.host = host;
        self
    }

    /// Whether the context may be used for authorization decisions
    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some_and(UserId::is_valid) && self.user_type.is_some() && !self.token_expired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signed_in() -> UserContext {
        UserContext {
            host: Some("10.0.0.5".to_string()),
            user_id: Some(UserId(42)),
            user_name: Some("alice".to_string()),
            user_type: Some(UserType::Member),
            mobile: Some("13912345678".to_string()),
            token: Some("tok".to_string()),
            token_expired: false,
        }
    }

    #[test]
    fn test_is_authenticated() {
        assert!(signed_in().is_authenticated());
        assert!(!UserContext::anonymous().is_authenticated());

        let expired = UserContext::expired(Some(UserId(42)), Some(UserType::Member), "tok");
        assert!(!expired.is_authenticated());

        let no_type = UserContext {
            user_type: None,
            ..signed_in()
        };
        assert!(!no_type.is_authenticated());

        let bad_id = UserContext {
            user_id: Some(UserId(0)),
            ..signed_in()
        };
        assert!(!bad_id.is_authenticated());
    }

    #[test]
    fn test_camel_case_json() {
        let json = serde_json::to_value(signed_in()).unwrap();
        assert_eq!(json["userId"], 42);
        assert_eq!(json["userType"], 1);
        assert_eq!(json["tokenExpired"], false);
        assert_eq!(json["userName"], "alice");
    }

    #[test]
    fn test_lenient_json() {
        let ctx: UserContext =
            serde_json::from_str(r#"{"userId":7,"userType":3,"extra":"ignored"}"#).unwrap();
        assert_eq!(ctx.user_id, Some(UserId(7)));
        assert_eq!(ctx.user_type, Some(UserType::Maker));
        assert!(!ctx.token_expired);
        assert!(ctx.host.is_none());
    }
}
