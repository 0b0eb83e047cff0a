use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::utils::constants::MAX_DELAY_MS;

#[derive(Debug)]
struct Timer {
    id: u64,
    handle: JoinHandle<()>,
}

/// One delayed task per key. Arming a key again cancels whatever was pending for it.
#[derive(Debug, Clone, Default)]
pub struct RenewalScheduler {
    timers: Arc<Mutex<HashMap<String, Timer>>>,
    next_id: Arc<AtomicU64>,
}

impl RenewalScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `task` once, no earlier than `delay_ms` from now, on the current tokio runtime.
    ///
    /// Returns false and drops `task` when the key is empty, the delay is outside
    /// `(0, MAX_DELAY_MS]`, or there is no runtime to run it on.
    pub fn schedule<F>(&self, key: &str, delay_ms: i64, task: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if key.is_empty() || delay_ms <= 0 || delay_ms > MAX_DELAY_MS {
            debug!("renewal for '{}' rejected, delay {} ms", key, delay_ms);
            return false;
        }
        let Ok(runtime) = Handle::try_current() else {
            warn!("no async runtime available, renewal not scheduled");
            return false;
        };

        let mut guard = self.timers.lock();
        self.arm(&mut guard, &runtime, key, delay_ms, task);
        true
    }

    /// Abort every pending task.
    pub fn cancel_all(&self) {
        let mut guard = self.timers.lock();
        for (_, timer) in guard.drain() {
            timer.handle.abort();
        }
    }

    /// Replace whatever is pending for `key`. The caller holds the timer lock.
    fn arm<F>(&self, timers: &mut HashMap<String, Timer>, runtime: &Handle, key: &str, delay_ms: i64, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let shared_timers = self.timers.clone();
        let owned_key = key.to_owned();

        if let Some(previous) = timers.remove(key) {
            previous.handle.abort();
        }
        // The spawned task needs the lock to deregister, so it cannot get
        // past that point before its own entry is inserted below.
        let handle = runtime.spawn(async move {
            tokio::time::sleep(Duration::from_millis(delay_ms as u64)).await;
            {
                let mut guard = shared_timers.lock();
                if !guard.get(&owned_key).is_some_and(|timer| timer.id == id) {
                    // replaced while waiting for the lock
                    return;
                }
                guard.remove(&owned_key);
            }
            task.await;
        });
        timers.insert(key.to_owned(), Timer { id, handle });
    }

    /// Hold the timer lock for `stall`, then arm `key` without releasing it.
    #[cfg(test)]
    pub(crate) fn schedule_after_stall<F>(&self, stall: Duration, key: &str, delay_ms: i64, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let runtime = Handle::current();
        let mut guard = self.timers.lock();
        std::thread::sleep(stall);
        self.arm(&mut guard, &runtime, key, delay_ms, task);
    }

    /// Whether a task is currently waiting to fire for `key`.
    pub fn pending(&self, key: &str) -> bool {
        self.timers
            .lock()
            .get(key)
            .is_some_and(|timer| !timer.handle.is_finished())
    }
}
