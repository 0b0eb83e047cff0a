//! The remote service that mints encrypted tokens.

use async_trait::async_trait;

use crate::error::Result;
use crate::model::GenerateTokenRequest;

pub mod http;

pub use self::http::{HttpTokenIssuer, RequestSigner, SignableRequest};

/// Encrypted token and the server's view of its lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedCredentials {
    pub token: Option<String>,
    /// Server clock when the token was issued, epoch millis.
    pub current_time: Option<i64>,
    /// When the server will rotate the token, epoch millis.
    pub next_rotation_time: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuanceResponse {
    pub request_id: String,
    pub credentials: Option<IssuedCredentials>,
}

/// Calls the issuance service once. Retries are the caller's business.
#[async_trait]
pub trait TokenIssuer: Send + Sync {
    async fn issue(&self, request: &GenerateTokenRequest) -> Result<IssuanceResponse>;
}
