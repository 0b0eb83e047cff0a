// tests/common/mod.rs
pub use axum::Router;
pub use tokio::task::JoinHandle;

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::auth::DbAuth;
use crate::cache::token_cache::TokenCache;
use crate::error::{Error, RemoteError, Result};
use crate::helpers::time::now_millis;
use crate::model::{Credential, GenerateTokenRequest};
use crate::parser::auth_token::fixture::encrypt_token;
use crate::sources::{IssuanceResponse, IssuedCredentials, TokenIssuer};
use crate::utils::constants::FALLBACK_INPUT_DIR;

pub const REGION: &str = "ap-guangzhou";
pub const INSTANCE_ID: &str = "cdb-123456";
pub const USER_NAME: &str = "camtest";
pub const SECRET_ID: &str = "AKIDexample";

/// Spawn an Axum router on an ephemeral port and return (JoinHandle, SocketAddr)
pub async fn spawn_axum(router: Router) -> (JoinHandle<()>, SocketAddr) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("server failed");
    });
    (handle, addr)
}

pub fn request() -> GenerateTokenRequest {
    request_with_secret(SECRET_ID)
}

pub fn request_with_secret(secret_id: &str) -> GenerateTokenRequest {
    GenerateTokenRequest::new(REGION, INSTANCE_ID, USER_NAME, Credential::new(secret_id, "secret-key"), None)
        .expect("valid request")
}

/// A successful issuance whose token decrypts to `password` and rotates in `lifetime_ms`.
pub fn issued(password: &str, lifetime_ms: i64) -> IssuanceResponse {
    let now = now_millis();
    IssuanceResponse {
        request_id: "req-ok".to_owned(),
        credentials: Some(IssuedCredentials {
            token: Some(encrypt_token(INSTANCE_ID, REGION, USER_NAME, password)),
            current_time: Some(now),
            next_rotation_time: Some(now + lifetime_ms),
        }),
    }
}

pub fn remote_error(code: &str) -> Error {
    RemoteError::new(code, "scripted failure", "req-err").into()
}

pub const AUTH_FAILURE: &str = "AuthFailure.SignatureFailure";
pub const TRANSIENT: &str = "InternalError";

type Script = dyn Fn(usize) -> Result<IssuanceResponse> + Send + Sync;

/// Issuer answering each call from a script keyed by the call index (0-based).
pub struct ScriptedIssuer {
    script: Box<Script>,
    calls: AtomicUsize,
}

impl ScriptedIssuer {
    pub fn new(script: impl Fn(usize) -> Result<IssuanceResponse> + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            script: Box::new(script),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenIssuer for ScriptedIssuer {
    async fn issue(&self, _request: &GenerateTokenRequest) -> Result<IssuanceResponse> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        (self.script)(n)
    }
}

pub fn db_auth(issuer: Arc<ScriptedIssuer>, base_dir: &Path) -> DbAuth {
    DbAuth::with_cache(issuer, TokenCache::with_base_dir(base_dir)).expect("db auth")
}

pub fn fallback_file(base_dir: &Path) -> PathBuf {
    base_dir
        .join(FALLBACK_INPUT_DIR)
        .join(format!("{REGION}_{INSTANCE_ID}_{USER_NAME}.pwd"))
}

pub fn write_fallback(base_dir: &Path, content: &[u8]) {
    let file = fallback_file(base_dir);
    std::fs::create_dir_all(file.parent().expect("fallback dir")).expect("create fallback dir");
    std::fs::write(file, content).expect("write fallback file");
}
