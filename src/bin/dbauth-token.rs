use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use dbauth_token::config::loader::file_to_settings;
use dbauth_token::config::settings::Settings;
use dbauth_token::utils::logging::{self, LogLevel};
use dbauth_token::{ClientProfile, Credential, DbAuth, GenerateTokenRequest, HttpTokenIssuer};
use tracing::{info, warn};

const UNSIGNED_NOTE: &str = "Generate a database authentication token.\n\n\
Requests are sent unsigned: this binary ships no request signer, so the public cloud \
endpoint rejects them. Point --endpoint at a signing proxy, or embed the library and \
pass a RequestSigner to HttpTokenIssuer::with_signer.";

#[derive(Parser)]
#[command(author, version, about, long_about = UNSIGNED_NOTE)]
struct Args {
    #[arg(short, long, env = "DBAUTH_CONFIG")]
    config: Option<PathBuf>,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    log_level: Option<LogLevel>,
    #[arg(long)]
    region: Option<String>,
    #[arg(long)]
    instance_id: Option<String>,
    #[arg(long)]
    user_name: Option<String>,
    #[arg(long, env = "AK", hide_env_values = true)]
    secret_id: Option<String>,
    #[arg(long, env = "SK", hide_env_values = true)]
    secret_key: Option<String>,
    #[arg(long)]
    endpoint: Option<String>,
    #[arg(long)]
    timeout_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Load settings, CLI flags override the file
    // -------------------------------

    let args = Args::parse();
    let settings = match &args.config {
        Some(path) => file_to_settings(path).await?,
        None => Settings::default(),
    };
    logging::run(&settings, args.log_level);

    // -------------------------------
    // 2. Build the request
    // -------------------------------

    let file_request = settings.request.clone().unwrap_or_default();
    let credential = Credential::new(
        args.secret_id.or(file_request.secret_id).unwrap_or_default(),
        args.secret_key.or(file_request.secret_key).unwrap_or_default(),
    );

    let mut profile = settings.profile.clone().unwrap_or_default();
    if let Some(endpoint) = args.endpoint {
        profile.endpoint = endpoint;
    }
    if let Some(timeout) = args.timeout_secs {
        profile.timeout = Duration::from_secs(timeout);
    }

    let request = GenerateTokenRequest::new(
        args.region.or(file_request.region).unwrap_or_default(),
        args.instance_id.or(file_request.instance_id).unwrap_or_default(),
        args.user_name.or(file_request.user_name).unwrap_or_default(),
        credential,
        Some(profile),
    )
    .context("failed to create GenerateTokenRequest")?;

    // -------------------------------
    // 3. Generate the token
    // -------------------------------

    let issuer = HttpTokenIssuer::new(ClientProfile::default());
    if !issuer.is_signed() {
        warn!("no request signer configured, the issuance call is sent unsigned");
    }
    let issuer = Arc::new(issuer);
    let db_auth = DbAuth::new(issuer)?;
    let token = db_auth
        .generate_token(&request)
        .await
        .context("failed to generate authentication token")?;

    info!("generated authentication token for {}@{}", request.user_name(), request.instance_id());
    println!("{token}");
    Ok(())
}
