//! Tessera Utils - Shared service helpers

pub mod config;

pub use config::{env_parse, env_var, load_env, InvalidEnv};
