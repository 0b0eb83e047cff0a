use serde::Deserialize;

use crate::model::ClientProfile;

/// ================================
/// Settings file (every section optional)
/// ================================
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Settings {
    pub logging: Option<LoggingConfig>,
    pub profile: Option<ClientProfile>,
    pub request: Option<RequestSettings>,
}

/// Identity and credentials of the database account a token is generated for.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct RequestSettings {
    pub region: Option<String>,
    pub instance_id: Option<String>,
    pub user_name: Option<String>,
    pub secret_id: Option<String>,
    pub secret_key: Option<String>,
}

/// ================================
/// Logging
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String, // allowed: trace, debug, info, warn, error
    #[serde(default)]
    pub format: LogFormat,
}

impl LoggingConfig {
    pub fn new(level: String, format: LogFormat) -> Self {
        Self { level, format }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::new(default_level(), LogFormat::Compact)
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    #[default]
    Compact,
}

fn default_level() -> String {
    "info".to_owned()
}
