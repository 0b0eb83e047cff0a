//! Public entry point: cached tokens first, then the issuance service, then
//! whatever still-usable token is left.

use std::sync::Arc;

use tracing::{error, warn};

use crate::cache::token_cache::TokenCache;
use crate::error::{Error, Result};
use crate::model::GenerateTokenRequest;
use crate::observability::metrics::Metrics;
use crate::resilience::retry::RetrySettings;
use crate::scheduler::RenewalScheduler;
use crate::sources::TokenIssuer;
use crate::utils::constants::ISSUE_ATTEMPTS;

pub mod signer;

pub use signer::identity_key;
use signer::Signer;

/// State shared by every signer of one `DbAuth`.
pub(crate) struct Shared {
    pub(crate) cache: TokenCache,
    pub(crate) scheduler: RenewalScheduler,
    pub(crate) issuer: Arc<dyn TokenIssuer>,
    pub(crate) metrics: Metrics,
    pub(crate) retry: RetrySettings,
}

impl Drop for Shared {
    fn drop(&mut self) {
        self.scheduler.cancel_all();
    }
}

/// Token service. Create one per process and share it; clones are cheap and
/// see the same cache and renewal timers.
///
/// Must be used from within a tokio runtime, which runs the background renewals.
#[derive(Clone)]
pub struct DbAuth {
    shared: Arc<Shared>,
}

impl DbAuth {
    pub fn new(issuer: Arc<dyn TokenIssuer>) -> Result<Self> {
        Self::with_cache(issuer, TokenCache::new())
    }

    pub fn with_cache(issuer: Arc<dyn TokenIssuer>, cache: TokenCache) -> Result<Self> {
        let metrics = Metrics::new().map_err(|e| Error::internal(format!("failed to set up metrics: {e}"), ""))?;
        Ok(Self {
            shared: Arc::new(Shared {
                cache,
                scheduler: RenewalScheduler::new(),
                issuer,
                metrics,
                retry: RetrySettings::immediate(ISSUE_ATTEMPTS),
            }),
        })
    }

    pub fn cache(&self) -> &TokenCache {
        &self.shared.cache
    }

    pub fn scheduler(&self) -> &RenewalScheduler {
        &self.shared.scheduler
    }

    pub fn metrics(&self) -> &Metrics {
        &self.shared.metrics
    }

    /// Return a usable token for `request`.
    ///
    /// An unexpired cached token is returned without any remote call. Otherwise a
    /// new token is built. If that fails with a transient error while an expired
    /// token is still cached, the expired token is returned instead of the error.
    pub async fn generate_token(&self, request: &GenerateTokenRequest) -> Result<String> {
        let signer = Signer::new(Arc::new(request.clone()), Arc::clone(&self.shared));

        let cached = signer.cached_token().await;
        if let Some(token) = cached.as_ref().filter(|token| !token.is_expired()) {
            self.shared.metrics.cache_hits.inc();
            return Ok(token.auth_token().to_owned());
        }

        match signer.build_auth_token().await {
            Ok(token) => Ok(token.auth_token().to_owned()),
            Err(err) => {
                error!("error occurred while generating authentication token: {}", err);
                match cached {
                    Some(token) if !err.is_user_actionable() => {
                        warn!("serving the expired cached token");
                        self.shared.metrics.stale_tokens_served.inc();
                        Ok(token.auth_token().to_owned())
                    }
                    _ => Err(err),
                }
            }
        }
    }
}
