use std::time::Duration;

use serde::Deserialize;

use crate::utils::constants::{CAM_ENDPOINT, DEFAULT_REQUEST_TIMEOUT_SECS};

/// Network settings for the issuance service client.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientProfile {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_timeout", rename = "timeout_secs", with = "duration_secs")]
    pub timeout: Duration,
}

impl ClientProfile {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout,
        }
    }
}

impl Default for ClientProfile {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout: default_timeout(),
        }
    }
}

fn default_endpoint() -> String {
    CAM_ENDPOINT.to_owned()
}

fn default_timeout() -> Duration {
    Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
