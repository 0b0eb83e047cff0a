use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::{debug, error, info};

use crate::auth::Shared;
use crate::cache::token::Token;
use crate::error::{Error, Result};
use crate::helpers::time::{format_millis, now_millis};
use crate::model::GenerateTokenRequest;
use crate::observability::metrics::{
    OUTCOME_EVICTED, OUTCOME_RETRY, OUTCOME_SUCCESS, REASON_TRANSIENT, REASON_USER_ACTIONABLE,
};
use crate::parser::parse_auth_token;
use crate::sources::IssuanceResponse;
use crate::utils::constants::{DELIMITER, TOKEN_UPDATE_INTERVAL_MS};

type RenewalTask = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Cache key for a request: region, instance, user and secret id, base64 encoded.
pub fn identity_key(request: &GenerateTokenRequest) -> String {
    let raw = [
        request.region(),
        request.instance_id(),
        request.user_name(),
        request.credential().secret_id.as_str(),
    ]
    .join(DELIMITER);
    STANDARD.encode(raw)
}

/// Builds and renews the token of one identity.
pub(crate) struct Signer {
    auth_key: String,
    request: Arc<GenerateTokenRequest>,
    shared: Arc<Shared>,
}

impl Signer {
    pub(crate) fn new(request: Arc<GenerateTokenRequest>, shared: Arc<Shared>) -> Arc<Self> {
        Arc::new(Self {
            auth_key: identity_key(&request),
            request,
            shared,
        })
    }

    pub(crate) async fn cached_token(&self) -> Option<Token> {
        self.shared.cache.get(&self.auth_key).await
    }

    /// Fetch a fresh token, or the fallback one on a transient failure, cache it
    /// and arm the next renewal.
    pub(crate) async fn build_auth_token(self: &Arc<Self>) -> Result<Token> {
        debug!("building authentication token");
        let metrics = &self.shared.metrics;
        let started = Instant::now();

        let err = match self.issue_token().await {
            Ok(token) => {
                metrics.issue_duration.with_label_values(&["ok"]).observe(started.elapsed().as_secs_f64());
                debug!(
                    "obtained authentication token, expiry: {}",
                    format_millis(token.expires_at_millis())
                );
                self.set_token_and_update_task(token.clone()).await;
                return Ok(token);
            }
            Err(err) => err,
        };
        metrics.issue_duration.with_label_values(&["error"]).observe(started.elapsed().as_secs_f64());

        if err.is_user_actionable() {
            metrics.issue_failures.with_label_values(&[REASON_USER_ACTIONABLE]).inc();
            return Err(err);
        }
        metrics.issue_failures.with_label_values(&[REASON_TRANSIENT]).inc();

        match self.shared.cache.fallback(&self.request).await {
            Some(token) => {
                info!("using the fallback token");
                metrics.fallback_tokens.inc();
                self.set_token_and_update_task(token.clone()).await;
                Ok(token)
            }
            None => Err(err),
        }
    }

    async fn set_token_and_update_task(self: &Arc<Self>, token: Token) {
        let expires_at = token.expires_at_millis();
        self.shared.cache.set(&self.auth_key, token).await;
        self.update_auth_token_task(expires_at);
    }

    /// Arm the next renewal: before `expires_at`, and never later than one update interval.
    fn update_auth_token_task(self: &Arc<Self>, expires_at: i64) {
        let delay = (expires_at - now_millis()).min(TOKEN_UPDATE_INTERVAL_MS);
        debug!("scheduling next token update in {} ms", delay);
        self.shared
            .scheduler
            .schedule(&self.auth_key, delay, self.renewal());
    }

    /// The pending renewal keeps only a weak handle on the service, so dropping
    /// the last `DbAuth` ends the cycle.
    fn renewal(&self) -> RenewalTask {
        let request = Arc::clone(&self.request);
        let shared = Arc::downgrade(&self.shared);
        Box::pin(async move {
            let Some(shared) = shared.upgrade() else {
                debug!("token service dropped, skipping renewal");
                return;
            };
            let signer = Signer::new(request, shared);
            let metrics = &signer.shared.metrics;
            match signer.build_auth_token().await {
                Ok(_) => {
                    metrics.renewals.with_label_values(&[OUTCOME_SUCCESS]).inc();
                }
                Err(err) if err.is_user_actionable() => {
                    error!("failed to update the authentication token, evicting it: {}", err);
                    metrics.renewals.with_label_values(&[OUTCOME_EVICTED]).inc();
                    signer.shared.cache.remove(&signer.auth_key).await;
                }
                Err(err) => {
                    error!("failed to update the authentication token, will retry: {}", err);
                    metrics.renewals.with_label_values(&[OUTCOME_RETRY]).inc();
                    signer.update_auth_token_task(now_millis() + TOKEN_UPDATE_INTERVAL_MS);
                }
            }
        })
    }

    async fn issue_token(&self) -> Result<Token> {
        let IssuanceResponse { request_id, credentials } = self.request_auth_token().await?;

        let Some(credentials) = credentials else {
            return Err(log_internal(
                format!("failed to request AuthToken, requestId: {request_id}, credentials are missing"),
                request_id,
            ));
        };
        let Some(encrypted) = credentials.token else {
            return Err(log_internal(
                format!("failed to request AuthToken, requestId: {request_id}, token is missing"),
                request_id,
            ));
        };

        let password = match parse_auth_token(
            self.request.instance_id(),
            self.request.region(),
            self.request.user_name(),
            &encrypted,
        ) {
            Ok(info) if !info.password.is_empty() => info.password,
            Ok(_) => {
                return Err(log_internal(
                    format!("failed to decrypt AuthToken, requestId: {request_id}, password is empty"),
                    request_id,
                ))
            }
            Err(err) => {
                return Err(log_internal(
                    format!("failed to decrypt AuthToken, requestId: {request_id}, error: {err}"),
                    request_id,
                ))
            }
        };

        let (Some(current_time), Some(next_rotation_time)) =
            (credentials.current_time, credentials.next_rotation_time)
        else {
            return Err(log_internal(
                format!("failed to request AuthToken, requestId: {request_id}, rotation times are missing"),
                request_id,
            ));
        };

        Ok(Token::new(password, calculate_expiry(current_time, next_rotation_time)))
    }

    async fn request_auth_token(&self) -> Result<IssuanceResponse> {
        let shared = &self.shared;
        shared
            .retry
            .run_with_retry(
                || {
                    shared.metrics.issue_requests.inc();
                    shared.issuer.issue(&self.request)
                },
                Error::is_user_actionable,
            )
            .await
    }
}

/// Local expiry from the server's rotation window, so clock offset between the
/// two hosts does not matter.
pub(crate) fn calculate_expiry(server_time: i64, next_rotation_time: i64) -> i64 {
    if next_rotation_time < server_time {
        return now_millis() + TOKEN_UPDATE_INTERVAL_MS;
    }
    now_millis() + (next_rotation_time - server_time)
}

fn log_internal(message: String, request_id: String) -> Error {
    error!("{}", message);
    Error::internal(message, request_id)
}
