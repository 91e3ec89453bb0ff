//! Issued token types

/// Opaque bearer token handed to clients
///
/// The text is a credential: `Debug` only shows its length.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct IssuedToken(String);

impl IssuedToken {
    /// Wrap an encoded token string
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Borrow the token text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Take the token text
    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for IssuedToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for IssuedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::fmt::Debug for IssuedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuedToken")
            .field("len", &self.0.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_hides_token() {
        let token = IssuedToken::new("s3cr3t-token");
        let debug = format!("{token:?}");
        assert!(!debug.contains("s3cr3t"));
        assert!(debug.contains("12"));
        assert_eq!(token.to_string(), "s3cr3t-token");
    }
}
