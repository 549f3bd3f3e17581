//! Scheduler backed by tokio tasks.

use super::{RepeatingCallback, Scheduler, TimerCallback, TimerHandle, MIN_REPEAT_INTERVAL};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use tracing::{debug, warn};

/// Runs timers as tokio tasks sleeping on `tokio::time`.
///
/// Each timer is one spawned task; cancelling aborts it. A one-shot task
/// removes its own entry before running the callback, so a timer either fires
/// or is cancelled, never both.
#[derive(Clone)]
pub struct TokioScheduler {
    runtime: Handle,
    next_id: Arc<AtomicU64>,
    tasks: Arc<Mutex<HashMap<u64, AbortHandle>>>,
    /// Counts live clones of this scheduler; spawned tasks do not hold it.
    owners: Arc<()>,
}

impl TokioScheduler {
    /// Creates a scheduler on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    #[must_use]
    pub fn new() -> Self {
        Self::with_handle(Handle::current())
    }

    /// Creates a scheduler spawning onto `runtime`.
    #[must_use]
    pub fn with_handle(runtime: Handle) -> Self {
        Self {
            runtime,
            next_id: Arc::new(AtomicU64::new(1)),
            tasks: Arc::new(Mutex::new(HashMap::new())),
            owners: Arc::new(()),
        }
    }

    /// Number of timers that have not fired or been cancelled.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.tasks.lock().len()
    }
}

impl Default for TokioScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, callback: TimerCallback) -> TimerHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let tasks = self.tasks.clone();

        // Hold the map while spawning so the task cannot look itself up
        // before it has been registered.
        let mut registry = self.tasks.lock();
        let join = self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            let still_pending = tasks.lock().remove(&id).is_some();
            if still_pending {
                callback();
            }
        });
        registry.insert(id, join.abort_handle());
        drop(registry);

        debug!(timer = id, delay_ms = delay.as_millis() as u64, "Timer scheduled");
        TimerHandle::from_raw(id)
    }

    fn schedule_repeating(&self, interval: Duration, callback: RepeatingCallback) -> TimerHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let interval = interval.max(MIN_REPEAT_INTERVAL);
        let tasks = self.tasks.clone();

        let mut registry = self.tasks.lock();
        let join = self.runtime.spawn(async move {
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if !tasks.lock().contains_key(&id) {
                    break;
                }
                callback();
            }
        });
        registry.insert(id, join.abort_handle());
        drop(registry);

        debug!(timer = id, interval_ms = interval.as_millis() as u64, "Repeating timer scheduled");
        TimerHandle::from_raw(id)
    }

    fn cancel(&self, handle: TimerHandle) -> bool {
        match self.tasks.lock().remove(&handle.as_raw()) {
            Some(task) => {
                task.abort();
                true
            }
            None => false,
        }
    }

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        // Only the last clone tears the timers down.
        if Arc::strong_count(&self.owners) == 1 {
            let tasks: Vec<_> = self.tasks.lock().drain().collect();
            if !tasks.is_empty() {
                warn!(pending = tasks.len(), "Scheduler dropped with pending timers");
            }
            for (_, task) in tasks {
                task.abort();
            }
        }
    }
}

impl std::fmt::Debug for TokioScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokioScheduler")
            .field("pending", &self.pending_count())
            .finish()
    }
}
