use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry};

pub const OUTCOME_SUCCESS: &str = "success";
pub const OUTCOME_RETRY: &str = "retry";
pub const OUTCOME_EVICTED: &str = "evicted";

pub const REASON_USER_ACTIONABLE: &str = "user_actionable";
pub const REASON_TRANSIENT: &str = "transient";

/// Counters for one `DbAuth` instance, registered in its own registry.
#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Issuance
    pub issue_requests: IntCounter,
    pub issue_failures: IntCounterVec,
    pub issue_duration: HistogramVec,

    // Cache
    pub cache_hits: IntCounter,
    pub fallback_tokens: IntCounter,
    pub stale_tokens_served: IntCounter,

    // Renewal
    pub renewals: IntCounterVec,
}

impl Metrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new_custom(Some("dbauth".into()), None)?;

        let metrics = Self {
            issue_requests: IntCounter::new("issue_requests_total", "Calls to the issuance service")?,
            issue_failures: IntCounterVec::new(Opts::new("issue_failures_total", "Failed token builds by reason"), &["reason"])?,
            issue_duration: HistogramVec::new(
                HistogramOpts::new("issue_duration_seconds", "Token build duration seconds")
                    .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 30.0]),
                &["result"],
            )?,

            cache_hits: IntCounter::new("cache_hits_total", "Tokens served from cache without a remote call")?,
            fallback_tokens: IntCounter::new("fallback_tokens_total", "Tokens loaded from the fallback file")?,
            stale_tokens_served: IntCounter::new("stale_tokens_served_total", "Expired cached tokens served after a transient failure")?,

            renewals: IntCounterVec::new(Opts::new("renewals_total", "Background renewals by outcome"), &["outcome"])?,

            registry,
        };

        let reg = &metrics.registry;
        reg.register(Box::new(metrics.issue_requests.clone()))?;
        reg.register(Box::new(metrics.issue_failures.clone()))?;
        reg.register(Box::new(metrics.issue_duration.clone()))?;
        reg.register(Box::new(metrics.cache_hits.clone()))?;
        reg.register(Box::new(metrics.fallback_tokens.clone()))?;
        reg.register(Box::new(metrics.stale_tokens_served.clone()))?;
        reg.register(Box::new(metrics.renewals.clone()))?;

        Ok(metrics)
    }
}
