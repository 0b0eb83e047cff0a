//! # Database Authentication Token Library
//!
//! Obtains short-lived database passwords from the cloud issuance service,
//! decrypts and verifies them, caches them per identity and renews them in the
//! background before they expire. When the service is unreachable, an expired
//! cached token or a locally escrowed password keeps callers working.
//!
//! Modules:
//! - `auth`: `DbAuth` entry point and the per-identity signer
//! - `cache`: token value, cache and fallback file reader
//! - `scheduler`: per-key renewal timers
//! - `parser`: token decryption and verification
//! - `sources`: the issuance service client
//! - `errorcode`: user-actionable vs transient classification

pub mod auth;
pub mod cache;
pub mod config;
pub mod error;
pub mod errorcode;
pub mod helpers;
pub mod model;
pub mod observability;
pub mod parser;
pub mod resilience;
pub mod scheduler;
pub mod sources;
pub mod utils;

#[cfg(test)]
mod tests;

pub use crate::auth::{identity_key, DbAuth};
pub use crate::cache::token::Token;
pub use crate::error::{Error, RemoteError, Result};
pub use crate::model::{ClientProfile, Credential, GenerateTokenRequest};
pub use crate::sources::{HttpTokenIssuer, IssuanceResponse, IssuedCredentials, TokenIssuer};
