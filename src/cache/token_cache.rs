use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::fs::File;
use tokio::io::AsyncReadExt;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::cache::token::Token;
use crate::helpers::time::now_millis;
use crate::model::GenerateTokenRequest;
use crate::utils::constants::{
    DELIMITER, FALLBACK_FILE_EXTENSION, FALLBACK_INPUT_DIR, MAX_DELAY_MS, MAX_FALLBACK_FILE_SIZE,
};

/// Identity key -> token. Entries leave only through [`TokenCache::remove`];
/// callers judge staleness themselves.
#[derive(Debug, Clone, Default)]
pub struct TokenCache {
    inner: Arc<RwLock<HashMap<String, Token>>>,
    /// Root for fallback files; the working directory when `None`.
    base_dir: Option<PathBuf>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache that looks up fallback files under `base_dir` instead of the working directory.
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            inner: Arc::default(),
            base_dir: Some(base_dir.into()),
        }
    }

    pub async fn get(&self, key: &str) -> Option<Token> {
        self.inner.read().await.get(key).cloned()
    }

    pub async fn set(&self, key: &str, token: Token) {
        if key.is_empty() {
            return;
        }
        self.inner.write().await.insert(key.to_owned(), token);
    }

    pub async fn remove(&self, key: &str) {
        self.inner.write().await.remove(key);
    }

    /// Load the escrowed password for `request`, if one has been provisioned.
    ///
    /// Missing, empty, oversized, non UTF-8 or multi-line files all count as absent.
    pub async fn fallback(&self, request: &GenerateTokenRequest) -> Option<Token> {
        let path = self.fallback_path(request)?;

        let bytes = read_bounded(&path, MAX_FALLBACK_FILE_SIZE)
            .await
            .inspect_err(|err| {
                if err.kind() != ErrorKind::NotFound {
                    error!("failed to read fallback file {}: {}", path.display(), err);
                }
            })
            .ok()?;
        info!("fallback file: {}, size: {}", path.display(), bytes.len());
        if bytes.is_empty() {
            return None;
        }
        if bytes.len() as u64 > MAX_FALLBACK_FILE_SIZE {
            error!(
                "fallback file is larger than {} bytes, skipping: {}",
                MAX_FALLBACK_FILE_SIZE,
                path.display()
            );
            return None;
        }

        let content = String::from_utf8(bytes)
            .inspect_err(|err| error!("fallback file {} is not UTF-8: {}", path.display(), err))
            .ok()?;

        let lines: Vec<&str> = content.lines().collect();
        if lines.len() != 1 {
            warn!(
                "fallback file contains {} lines, expected exactly one, skipping: {}",
                lines.len(),
                path.display()
            );
            return None;
        }

        info!("reading the fallback password from {}", path.display());
        Some(Token::new(lines[0].to_owned(), now_millis() + MAX_DELAY_MS))
    }

    fn fallback_path(&self, request: &GenerateTokenRequest) -> Option<PathBuf> {
        let base_dir = match &self.base_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir()
                .inspect_err(|err| error!("failed to get working directory: {}", err))
                .ok()?,
        };
        let file_name = format!(
            "{}{DELIMITER}{}{DELIMITER}{}.{FALLBACK_FILE_EXTENSION}",
            request.region(),
            request.instance_id(),
            request.user_name(),
        );
        Some(base_dir.join(FALLBACK_INPUT_DIR).join(file_name))
    }
}

/// Read at most `limit + 1` bytes, enough to tell an oversized file apart.
pub(crate) async fn read_bounded(path: &Path, limit: u64) -> std::io::Result<Vec<u8>> {
    let file = File::open(path).await?;
    let mut bytes = Vec::new();
    file.take(limit + 1).read_to_end(&mut bytes).await?;
    Ok(bytes)
}
