//! Tessera Types - Shared domain types
//!
//! This crate contains the identity types used across tessera services:
//! - User ids and user types
//! - The authoritative user context record
//! - Issued bearer tokens

pub mod context;
pub mod error;
pub mod token;
pub mod user;

pub use context::*;
pub use error::*;
pub use token::*;
pub use user::*;
