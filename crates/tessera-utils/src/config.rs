//! Configuration utilities

use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

/// An environment variable is set but does not parse
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid value for environment variable {name}")]
pub struct InvalidEnv {
    pub name: &'static str,
}

/// Load variables from a `.env` file if one exists
///
/// Variables already present in the environment win.
pub fn load_env() -> Option<PathBuf> {
    match dotenvy::dotenv() {
        Ok(path) => {
            tracing::debug!(path = %path.display(), "loaded .env file");
            Some(path)
        }
        Err(_) => None,
    }
}

/// Read a variable, treating blank values as unset
pub fn env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Parse a variable, falling back to `default` when unset
pub fn env_parse<T: FromStr>(name: &'static str, default: T) -> Result<T, InvalidEnv> {
    match env_var(name) {
        Some(value) => value.parse().map_err(|_| InvalidEnv { name }),
        None => Ok(default),
    }
}
