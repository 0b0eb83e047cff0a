use std::future::Future;

use tracing::{error, warn};

#[derive(Debug, Clone)]
pub struct RetrySettings {
    pub attempts: u32,
}

impl RetrySettings {
    /// Re-issue immediately, no backoff.
    pub fn immediate(attempts: u32) -> Self {
        Self { attempts }
    }

    /// Run `operation` until it succeeds, `is_final` accepts its error, or attempts run out.
    /// The error of the last attempt made is returned.
    pub async fn run_with_retry<F, Fut, T, E, P>(&self, mut operation: F, is_final: P) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
        P: Fn(&E) -> bool,
    {
        let attempts = self.attempts.max(1);
        let mut attempt = 1;

        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if is_final(&e) => {
                    error!("attempt {attempt}/{attempts} failed, not retrying: {e}");
                    return Err(e);
                }
                Err(e) if attempt < attempts => {
                    warn!("attempt {attempt}/{attempts} failed, retrying: {e}");
                }
                Err(e) => {
                    error!("all {attempt} attempts failed: {e}");
                    return Err(e);
                }
            }
            attempt += 1;
        }
    }
}
