//! Virtual-clock scheduler for deterministic tests and headless rendering.

use super::{RepeatingCallback, Scheduler, TimerCallback, TimerHandle, MIN_REPEAT_INTERVAL};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;
use tracing::debug;

enum TimerTask {
    Once(TimerCallback),
    Repeating {
        interval: Duration,
        callback: RepeatingCallback,
    },
}

#[derive(Default)]
struct State {
    /// Virtual time elapsed since construction.
    elapsed: Duration,
    next_id: u64,
    /// Pending timers ordered by (deadline, id); ids are monotonic so timers
    /// with equal deadlines fire in scheduling order.
    queue: BTreeMap<(Duration, u64), TimerTask>,
    /// id -> deadline, for cancellation.
    deadlines: HashMap<u64, Duration>,
}

/// A scheduler whose clock only moves through [`ManualScheduler::advance`].
///
/// Callbacks scheduled while advancing are honoured if their deadline falls
/// inside the advanced window.
pub struct ManualScheduler {
    epoch: DateTime<Utc>,
    state: Mutex<State>,
}

impl ManualScheduler {
    /// Creates a scheduler whose wall clock starts at the Unix epoch.
    #[must_use]
    pub fn new() -> Self {
        Self::starting_at(DateTime::<Utc>::default())
    }

    /// Creates a scheduler whose wall clock starts at `epoch`.
    #[must_use]
    pub fn starting_at(epoch: DateTime<Utc>) -> Self {
        Self {
            epoch,
            state: Mutex::new(State::default()),
        }
    }

    /// Virtual time elapsed since construction.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.state.lock().elapsed
    }

    /// Number of timers waiting to fire.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.state.lock().queue.len()
    }

    /// Moves the clock forward by `by`, firing every timer that comes due.
    ///
    /// Returns the number of callbacks invoked.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.state.lock().elapsed + by;
        let mut fired = 0;

        loop {
            let due = {
                let mut state = self.state.lock();
                let Some((&(deadline, id), _)) = state.queue.first_key_value() else {
                    break;
                };
                if deadline > target {
                    break;
                }
                let Some(task) = state.queue.remove(&(deadline, id)) else {
                    break;
                };
                state.elapsed = deadline;

                match task {
                    TimerTask::Once(callback) => {
                        state.deadlines.remove(&id);
                        DueTask::Once(callback)
                    }
                    TimerTask::Repeating { interval, callback } => {
                        // Re-arm before running so the callback can cancel itself.
                        let next = deadline + interval;
                        state.queue.insert(
                            (next, id),
                            TimerTask::Repeating {
                                interval,
                                callback: callback.clone(),
                            },
                        );
                        state.deadlines.insert(id, next);
                        DueTask::Repeating(callback)
                    }
                }
            };

            match due {
                DueTask::Once(callback) => callback(),
                DueTask::Repeating(callback) => callback(),
            }
            fired += 1;
        }

        self.state.lock().elapsed = target;
        fired
    }

    /// Fires everything pending, one-shot timers only, regardless of deadline.
    ///
    /// Repeating timers would never drain, so they are left in place.
    pub fn run_until_idle(&self) -> usize {
        let mut fired = 0;
        loop {
            let next_once = {
                let state = self.state.lock();
                state
                    .queue
                    .iter()
                    .find(|(_, task)| matches!(task, TimerTask::Once(_)))
                    .map(|(&(deadline, _), _)| deadline)
            };
            let Some(deadline) = next_once else {
                break;
            };
            let now = self.elapsed();
            fired += self.advance(deadline.saturating_sub(now));
        }
        fired
    }

    fn insert(&self, delay: Duration, task: TimerTask) -> TimerHandle {
        let mut state = self.state.lock();
        state.next_id += 1;
        let id = state.next_id;
        let deadline = state.elapsed + delay;
        state.queue.insert((deadline, id), task);
        state.deadlines.insert(id, deadline);
        debug!(timer = id, delay_ms = delay.as_millis() as u64, "Timer scheduled");
        TimerHandle::from_raw(id)
    }
}

enum DueTask {
    Once(TimerCallback),
    Repeating(RepeatingCallback),
}

impl Default for ManualScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, callback: TimerCallback) -> TimerHandle {
        self.insert(delay, TimerTask::Once(callback))
    }

    fn schedule_repeating(&self, interval: Duration, callback: RepeatingCallback) -> TimerHandle {
        let interval = interval.max(MIN_REPEAT_INTERVAL);
        self.insert(interval, TimerTask::Repeating { interval, callback })
    }

    fn cancel(&self, handle: TimerHandle) -> bool {
        let mut state = self.state.lock();
        let id = handle.as_raw();
        match state.deadlines.remove(&id) {
            Some(deadline) => state.queue.remove(&(deadline, id)).is_some(),
            None => false,
        }
    }

    fn now(&self) -> DateTime<Utc> {
        let elapsed = chrono::Duration::from_std(self.elapsed()).unwrap_or_default();
        self.epoch + elapsed
    }
}

impl std::fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualScheduler")
            .field("epoch", &self.epoch)
            .field("elapsed", &self.elapsed())
            .field("pending", &self.pending_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::SchedulerExt;
    use chrono::TimeZone;
    use std::sync::Arc;

    fn recorder() -> (Arc<Mutex<Vec<&'static str>>>, impl Fn(&'static str) -> Box<dyn FnOnce() + Send>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let handle = log.clone();
        let make = move |label: &'static str| {
            let log = handle.clone();
            Box::new(move || log.lock().push(label)) as Box<dyn FnOnce() + Send>
        };
        (log, make)
    }

    #[test]
    fn test_fires_only_when_due() {
        let scheduler = ManualScheduler::new();
        let (log, make) = recorder();
        scheduler.schedule(Duration::from_millis(100), make("a"));

        assert_eq!(scheduler.advance(Duration::from_millis(99)), 0);
        assert!(log.lock().is_empty());

        assert_eq!(scheduler.advance(Duration::from_millis(1)), 1);
        assert_eq!(*log.lock(), vec!["a"]);
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[test]
    fn test_fires_in_deadline_then_schedule_order() {
        let scheduler = ManualScheduler::new();
        let (log, make) = recorder();
        scheduler.schedule(Duration::from_millis(20), make("late"));
        scheduler.schedule(Duration::from_millis(10), make("first"));
        scheduler.schedule(Duration::from_millis(10), make("second"));

        scheduler.advance(Duration::from_millis(50));
        assert_eq!(*log.lock(), vec!["first", "second", "late"]);
        assert_eq!(scheduler.elapsed(), Duration::from_millis(50));
    }

    #[test]
    fn test_cancel() {
        let scheduler = ManualScheduler::new();
        let (log, make) = recorder();
        let handle = scheduler.schedule(Duration::from_millis(10), make("never"));

        assert!(scheduler.cancel(handle));
        assert!(!scheduler.cancel(handle));
        scheduler.advance(Duration::from_millis(10));
        assert!(log.lock().is_empty());
    }

    #[test]
    fn test_callback_can_schedule_within_window() {
        let scheduler = Arc::new(ManualScheduler::new());
        let log = Arc::new(Mutex::new(Vec::new()));

        let inner_scheduler = scheduler.clone();
        let inner_log = log.clone();
        scheduler.schedule_fn(Duration::from_millis(10), move || {
            inner_log.lock().push(10);
            let log = inner_log.clone();
            inner_scheduler.schedule_fn(Duration::from_millis(10), move || log.lock().push(20));
        });

        scheduler.advance(Duration::from_millis(25));
        assert_eq!(*log.lock(), vec![10, 20]);
    }

    #[test]
    fn test_repeating_and_self_cancel() {
        let scheduler = Arc::new(ManualScheduler::new());
        let ticks = Arc::new(Mutex::new(0u32));
        let handle_slot: Arc<Mutex<Option<TimerHandle>>> = Arc::new(Mutex::new(None));

        let counter = ticks.clone();
        let slot = handle_slot.clone();
        let canceller = scheduler.clone();
        let handle = scheduler.every(Duration::from_secs(1), move || {
            let mut ticks = counter.lock();
            *ticks += 1;
            if *ticks == 3 {
                if let Some(handle) = *slot.lock() {
                    canceller.cancel(handle);
                }
            }
        });
        *handle_slot.lock() = Some(handle);

        scheduler.advance(Duration::from_secs(10));
        assert_eq!(*ticks.lock(), 3);
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[test]
    fn test_now_follows_virtual_clock() {
        let epoch = Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap();
        let scheduler = ManualScheduler::starting_at(epoch);
        scheduler.advance(Duration::from_secs(90));
        assert_eq!(scheduler.now(), Utc.with_ymd_and_hms(2026, 10, 19, 9, 1, 30).unwrap());
    }

    #[test]
    fn test_run_until_idle_skips_repeating() {
        let scheduler = ManualScheduler::new();
        let (log, make) = recorder();
        scheduler.every(Duration::from_millis(5), || {});
        scheduler.schedule(Duration::from_secs(3), make("done"));

        scheduler.run_until_idle();
        assert_eq!(*log.lock(), vec!["done"]);
        assert_eq!(scheduler.pending_count(), 1);
    }
}
