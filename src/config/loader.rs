use std::path::Path;

use anyhow::{Context, Result};
use regex::{Captures, Regex};
use tracing::error;

use crate::config::settings::Settings;

/// Load settings from a YAML file, expanding `${VAR}` / `${VAR:default}` first.
pub async fn file_to_settings(path: &Path) -> Result<Settings> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read settings file '{}'", path.display()))?;

    parse_settings(&expand_env_vars(&content)?)
}

pub fn parse_settings(content: &str) -> Result<Settings> {
    if content.trim().is_empty() {
        return Ok(Settings::default());
    }
    serde_yaml::from_str(content)
        .inspect_err(|e| error!("parse settings error: {}", e))
        .context("invalid settings format")
}

fn expand_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{(\w+)(?::([^\}]+))?\}")?;
    Ok(re
        .replace_all(input, |caps: &Captures| {
            let var = &caps[1];
            let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            std::env::var(var).unwrap_or_else(|_| default.to_string())
        })
        .to_string())
}
