#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tokio::time::Instant;

    use crate::resilience::retry::RetrySettings;

    #[tokio::test(start_paused = true)]
    async fn attempts_run_back_to_back() {
        let calls = AtomicUsize::new(0);
        let started = Instant::now();

        let result: Result<(), String> = RetrySettings::immediate(3)
            .run_with_retry(
                || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async { Err("down".to_owned()) }
                },
                |_| false,
            )
            .await;

        assert_eq!(result.unwrap_err(), "down");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(started.elapsed().as_millis(), 0);
    }

    #[tokio::test]
    async fn final_error_stops_early() {
        let calls = AtomicUsize::new(0);

        let result: Result<(), String> = RetrySettings::immediate(3)
            .run_with_retry(
                || {
                    let n = calls.fetch_add(1, Ordering::SeqCst);
                    async move { Err(format!("fail-{n}")) }
                },
                |e: &String| e == "fail-1",
            )
            .await;

        assert_eq!(result.unwrap_err(), "fail-1");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn zero_attempts_still_tries_once() {
        let calls = AtomicUsize::new(0);

        let result = RetrySettings::immediate(0)
            .run_with_retry(
                || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async { Ok::<_, String>(7) }
                },
                |_| false,
            )
            .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
