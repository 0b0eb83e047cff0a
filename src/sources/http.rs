use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use http::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, RemoteError, Result};
use crate::model::{ClientProfile, Credential, GenerateTokenRequest};
use crate::sources::{IssuanceResponse, IssuedCredentials, TokenIssuer};

pub const ACTION: &str = "BuildDataFlowAuthToken";
pub const API_VERSION: &str = "2019-01-16";

/// What a [`RequestSigner`] gets to see of an outgoing call.
#[derive(Debug, Clone)]
pub struct SignableRequest<'a> {
    pub host: &'a str,
    pub action: &'a str,
    pub version: &'a str,
    pub region: &'a str,
    pub timestamp: i64,
    pub payload: &'a [u8],
}

/// Adds authentication headers derived from the caller's cloud credential.
pub trait RequestSigner: Send + Sync {
    fn sign(&self, credential: &Credential, request: &SignableRequest<'_>, headers: &mut HeaderMap) -> Result<()>;
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct BuildTokenBody<'a> {
    resource_id: &'a str,
    resource_region: &'a str,
    resource_account: &'a str,
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "Response")]
    response: Option<ResponseBody>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ResponseBody {
    #[serde(default)]
    request_id: String,
    error: Option<ErrorBody>,
    credentials: Option<CredentialsBody>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CredentialsBody {
    token: Option<String>,
    current_time: Option<i64>,
    next_rotation_time: Option<i64>,
}

/// [`TokenIssuer`] speaking the cloud API JSON protocol over HTTPS.
///
/// Endpoint and timeout come from the request's [`ClientProfile`], or from the
/// issuer's default profile when the request has none.
#[derive(Clone)]
pub struct HttpTokenIssuer {
    client: Client,
    default_profile: ClientProfile,
    signer: Option<Arc<dyn RequestSigner>>,
}

impl HttpTokenIssuer {
    pub fn new(default_profile: ClientProfile) -> Self {
        Self {
            client: Client::new(),
            default_profile,
            signer: None,
        }
    }

    pub fn with_signer(mut self, signer: Arc<dyn RequestSigner>) -> Self {
        self.signer = Some(signer);
        self
    }

    /// Without a signer, calls go out unauthenticated and the cloud API rejects them.
    pub fn is_signed(&self) -> bool {
        self.signer.is_some()
    }
}

impl Default for HttpTokenIssuer {
    fn default() -> Self {
        Self::new(ClientProfile::default())
    }
}

#[async_trait]
impl TokenIssuer for HttpTokenIssuer {
    async fn issue(&self, request: &GenerateTokenRequest) -> Result<IssuanceResponse> {
        let profile = request.client_profile().unwrap_or(&self.default_profile);
        let (url, host) = endpoint_url(&profile.endpoint);

        let payload = serde_json::to_vec(&BuildTokenBody {
            resource_id: request.instance_id(),
            resource_region: request.region(),
            resource_account: request.user_name(),
        })
        .map_err(|e| Error::internal(format!("failed to encode request: {e}"), ""))?;

        let timestamp = Utc::now().timestamp();
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert("x-tc-action", HeaderValue::from_static(ACTION));
        headers.insert("x-tc-version", HeaderValue::from_static(API_VERSION));
        headers.insert("x-tc-timestamp", HeaderValue::from(timestamp));
        headers.insert(
            "x-tc-region",
            HeaderValue::from_str(request.region())
                .map_err(|e| Error::internal(format!("invalid region header: {e}"), ""))?,
        );

        if let Some(signer) = &self.signer {
            let signable = SignableRequest {
                host: &host,
                action: ACTION,
                version: API_VERSION,
                region: request.region(),
                timestamp,
                payload: &payload,
            };
            signer.sign(request.credential(), &signable, &mut headers)?;
        }

        debug!("requesting auth token from {}", url);
        let response = self
            .client
            .post(&url)
            .timeout(profile.timeout)
            .headers(headers)
            .body(payload)
            .send()
            .await
            .map_err(|e| Error::Transport(format!("request to {url} failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Transport(format!("failed to read response body: {e}")))?;

        let envelope = match serde_json::from_str::<Envelope>(&body) {
            Ok(Envelope { response: Some(envelope) }) => envelope,
            Ok(Envelope { response: None }) if status.is_success() => {
                return Err(Error::Transport("response has no 'Response' object".to_owned()));
            }
            Err(e) if status.is_success() => {
                return Err(Error::Transport(format!("undecodable response: {e}")));
            }
            _ => return Err(Error::Transport(format!("HTTP request failed: {status}"))),
        };

        if let Some(error) = envelope.error {
            return Err(RemoteError::new(error.code, error.message, envelope.request_id).into());
        }

        Ok(IssuanceResponse {
            request_id: envelope.request_id,
            credentials: envelope.credentials.map(|c| IssuedCredentials {
                token: c.token,
                current_time: c.current_time,
                next_rotation_time: c.next_rotation_time,
            }),
        })
    }
}

/// `(url, host)` for an endpoint given either as a bare host or as a full URL.
fn endpoint_url(endpoint: &str) -> (String, String) {
    let trimmed = endpoint.trim_end_matches('/');
    match trimmed.split_once("://") {
        Some((_, rest)) => (format!("{trimmed}/"), rest.to_owned()),
        None => (format!("https://{trimmed}/"), trimmed.to_owned()),
    }
}
